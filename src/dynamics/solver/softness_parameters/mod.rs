//! Soft constraints are spring-like constraints that dampen constraint responses
//! using intuitive tuning parameters: a frequency in Hertz, a damping ratio,
//! and the mass the spring acts on.
//!
//! The parameters are turned into a stiffness `k` and a damping `c` with the
//! harmonic oscillator formulas
//!
//! ```text
//! ω = 2π f
//! k = m ω²
//! c = 2 m ζ ω
//! ```
//!
//! and from there into the two coefficients used by the velocity solver:
//!
//! ```text
//! β = Δt k / (c + Δt k)      (position correction factor)
//! γ = 1 / (Δt (c + Δt k))    (softness, added to the inverse effective mass)
//! ```
//!
//! With these, a constraint with position error `C` solves
//!
//! ```text
//! λ = -(J v + β / Δt C + γ λ_acc) / (J M⁻¹ Jᵀ + γ)
//! ```

use crate::{PhysicsConfig, Scalar, TAU};

/// Soft constraint tuning parameters used for dampening
/// constraint response and controlling stiffness.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftnessParameters {
    /// The frequency in Hertz. Zero or negative makes the constraint rigid.
    pub frequency: Scalar,

    /// The damping ratio (zeta ζ). Controls the amount of oscillation.
    pub damping_ratio: Scalar,

    /// The mass the spring acts on. When `None` or non-positive,
    /// the mass of the constrained body is used.
    pub joint_mass: Option<Scalar>,
}

impl Default for SoftnessParameters {
    fn default() -> Self {
        Self::RIGID
    }
}

impl SoftnessParameters {
    /// A constraint without any softness.
    pub const RIGID: Self = Self {
        frequency: 0.0,
        damping_ratio: 0.0,
        joint_mass: None,
    };

    /// Creates new [`SoftnessParameters`] from a frequency in Hertz and a damping ratio.
    #[inline]
    pub fn new(frequency: Scalar, damping_ratio: Scalar) -> Self {
        Self {
            frequency,
            damping_ratio,
            joint_mass: None,
        }
    }

    /// Sets the mass the spring acts on.
    #[inline]
    pub fn with_joint_mass(mut self, mass: Scalar) -> Self {
        self.joint_mass = Some(mass);
        self
    }

    #[inline]
    pub fn is_rigid(&self) -> bool {
        self.frequency <= 0.0
    }

    /// Returns the angular frequency, `2π f`.
    #[inline]
    pub fn angular_frequency(&self) -> Scalar {
        TAU * self.frequency
    }

    /// Computes [`SoftnessCoefficients`] for the time step.
    ///
    /// `fallback_mass` is used when no positive joint mass is set. Rigid
    /// parameters yield the configured Baumgarte factor and no softness.
    pub fn compute_coefficients(
        &self,
        delta_secs: Scalar,
        fallback_mass: Scalar,
        config: &PhysicsConfig,
    ) -> SoftnessCoefficients {
        if self.is_rigid() {
            return SoftnessCoefficients::rigid(config);
        }

        let mass = match self.joint_mass {
            Some(mass) if mass > 0.0 => mass,
            _ => fallback_mass,
        };
        if !(mass.is_finite() && mass > 0.0) {
            return SoftnessCoefficients::rigid(config);
        }

        let omega = self.angular_frequency();
        let stiffness = mass * omega * omega;
        let damping = 2.0 * mass * self.damping_ratio * omega;
        let denominator = damping + delta_secs * stiffness;
        if denominator <= 0.0 {
            return SoftnessCoefficients::rigid(config);
        }

        SoftnessCoefficients {
            beta: delta_secs * stiffness / denominator,
            gamma: 1.0 / (delta_secs * denominator),
        }
    }
}

/// Coefficients used by soft constraints.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SoftnessCoefficients {
    /// The position correction factor. The velocity bias is `beta / Δt * C`.
    pub beta: Scalar,

    /// The softness, added to the inverse effective mass and scaling the
    /// accumulated impulse in the solve.
    pub gamma: Scalar,
}

impl SoftnessCoefficients {
    /// Coefficients of a rigid constraint: Baumgarte correction, if enabled, and no softness.
    pub fn rigid(config: &PhysicsConfig) -> Self {
        Self {
            beta: if config.position_correction {
                config.position_correction_beta
            } else {
                0.0
            },
            gamma: 0.0,
        }
    }
}

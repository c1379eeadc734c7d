use crate::{PhysicsConfig, prelude::*};

pub type NormalImpulse = Scalar;

/// The normal part of a [`ContactConstraintPoint`](super::ContactConstraintPoint).
/// Aims to resolve overlap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactNormalPart {
    /// The magnitude of the contact impulse along the contact normal.
    pub impulse: NormalImpulse,

    /// The inertial properties of the bodies projected onto the contact normal,
    /// or in other words, the mass "seen" by the constraint along the normal.
    pub effective_mass: Scalar,

    /// The velocity bias: Baumgarte position correction plus restitution.
    pub bias: Scalar,
}

impl ContactNormalPart {
    /// Computes the effective mass and bias for the contact, keeping the current impulse.
    #[allow(clippy::too_many_arguments)]
    pub fn prepare(
        &mut self,
        inv_mass_sum: Scalar,
        inverse_inertia1: Scalar,
        inverse_inertia2: Scalar,
        r1: Vector,
        r2: Vector,
        normal: Vector,
        bias: Scalar,
    ) {
        // The penetration constraint is C = dot(p2 - p1, n), with the Jacobian
        //
        //      linear1  angular1   linear2 angular2
        // J = [ -n,     -(r1 x n), n,      r2 x n ]
        //
        // so the effective inverse mass is
        //
        // K = 1/m1 + 1/m2 + I1^-1 * (r1 x n)^2 + I2^-1 * (r2 x n)^2
        let r1_cross_n = cross(r1, normal);
        let r2_cross_n = cross(r2, normal);
        let k = inv_mass_sum
            + inverse_inertia1 * r1_cross_n * r1_cross_n
            + inverse_inertia2 * r2_cross_n * r2_cross_n;

        self.effective_mass = k.recip_or_zero();
        self.bias = bias;
    }

    /// Solves the non-penetration constraint, updating the total impulse in `self` and returning
    /// the incremental impulse to apply to each body.
    ///
    /// With `accumulate`, the running total is clamped to be non-negative. Otherwise each
    /// incremental impulse is clamped on its own.
    pub fn solve_impulse(&mut self, relative_velocity: Vector, normal: Vector, accumulate: bool) -> Scalar {
        let normal_speed = relative_velocity.dot(normal);
        let mut impulse = -self.effective_mass * (normal_speed + self.bias);

        if accumulate {
            let new_impulse = (self.impulse + impulse).max(0.0);
            impulse = new_impulse - self.impulse;
            self.impulse = new_impulse;
        } else {
            impulse = impulse.max(0.0);
            self.impulse += impulse;
        }

        impulse
    }
}

/// Computes the velocity bias of a contact point.
///
/// Position correction pushes by `beta / Δt * max(depth - slop, 0)`. Restitution targets
/// `-restitution * closing_speed` and only applies when the bodies approach faster than
/// the restitution slop.
pub fn normal_bias(
    depth: Scalar,
    closing_speed: Scalar,
    restitution: Scalar,
    delta_secs: Scalar,
    config: &PhysicsConfig,
) -> Scalar {
    let mut bias = 0.0;
    if config.position_correction {
        bias -= config.position_correction_beta / delta_secs
            * (depth - config.penetration_slop).max(0.0);
    }
    if closing_speed < -config.restitution_slop {
        bias += restitution * closing_speed;
    }
    bias
}

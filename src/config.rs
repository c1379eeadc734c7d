//! Tunables read by the simulation every step.

use crate::{PhysicsError, dynamics::rigid_body::CoefficientCombine, prelude::*};

/// Global configuration of a [`PhysicsWorld`](crate::PhysicsWorld).
///
/// The world owns its configuration and only reads it during a step, so changing
/// a value between steps takes effect on the next [`update`](crate::PhysicsWorld::update).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicsConfig {
    /// The fixed timestep used by [`PhysicsWorld::update`](crate::PhysicsWorld::update), in seconds.
    pub delta_secs: Scalar,

    /// Gravitational acceleration applied to every dynamic body.
    pub gravity: Vector,

    /// Multiplier for [`gravity`](Self::gravity).
    pub gravity_scale: Scalar,

    /// The number of velocity iterations run per island each step.
    pub solver_iterations: usize,

    /// Enables Baumgarte position correction for contacts.
    pub position_correction: bool,

    /// The Baumgarte coefficient, in `[0, 1]`.
    pub position_correction_beta: Scalar,

    /// Reuses the previous step's accumulated impulses as the initial guess.
    pub warm_starting: bool,

    /// Squared distance under which a new contact point is matched to an old one
    /// when warm starting.
    pub warm_starting_threshold: Scalar,

    /// Clamps the accumulated normal impulse instead of each incremental impulse.
    pub accumulate_impulses: bool,

    /// Penetration allowed without any position correction.
    pub penetration_slop: Scalar,

    /// Closing speed below which restitution is ignored.
    pub restitution_slop: Scalar,

    /// Allows islands at rest to fall asleep.
    pub sleeping: bool,

    /// Linear speed under which a body counts as resting.
    pub rest_linear_tolerance: Scalar,

    /// Angular speed under which a body counts as resting.
    pub rest_angular_tolerance: Scalar,

    /// Time every body of an island must rest before the island sleeps, in seconds.
    pub time_to_sleep: Scalar,

    /// Margin added on every side of a body's bounding box in the broad phase.
    pub aabb_margin: Scalar,

    /// Bodies falling below this height are removed from the world.
    pub dead_bottom: Scalar,

    /// How the friction coefficients of two bodies are combined.
    pub friction_combine: CoefficientCombine,

    /// How the restitution coefficients of two bodies are combined.
    pub restitution_combine: CoefficientCombine,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            delta_secs: 1.0 / 60.0,
            gravity: Vector::new(0.0, -9.81),
            gravity_scale: 1.0,
            solver_iterations: 10,
            position_correction: true,
            position_correction_beta: 0.2,
            warm_starting: true,
            warm_starting_threshold: 0.0025,
            accumulate_impulses: true,
            penetration_slop: 0.005,
            restitution_slop: 0.5,
            sleeping: true,
            rest_linear_tolerance: 0.05,
            rest_angular_tolerance: 0.05,
            time_to_sleep: 0.5,
            aabb_margin: 0.1,
            dead_bottom: -1000.0,
            friction_combine: CoefficientCombine::GeometricMean,
            restitution_combine: CoefficientCombine::Max,
        }
    }
}

impl PhysicsConfig {
    /// Returns the effective gravity, `gravity * gravity_scale`.
    #[inline]
    pub fn scaled_gravity(&self) -> Vector {
        self.gravity * self.gravity_scale
    }

    /// Checks that every value is usable by the solver.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.delta_secs.is_finite() && self.delta_secs > 0.0) {
            return Err(PhysicsError::InvalidConfig("delta_secs must be positive"));
        }
        if !self.gravity.is_finite() || !self.gravity_scale.is_finite() {
            return Err(PhysicsError::InvalidConfig("gravity must be finite"));
        }
        if !(0.0..=1.0).contains(&self.position_correction_beta) {
            return Err(PhysicsError::InvalidConfig(
                "position_correction_beta must be in [0, 1]",
            ));
        }
        if self.warm_starting_threshold < 0.0
            || self.penetration_slop < 0.0
            || self.restitution_slop < 0.0
        {
            return Err(PhysicsError::InvalidConfig("thresholds must be non-negative"));
        }
        if self.rest_linear_tolerance < 0.0
            || self.rest_angular_tolerance < 0.0
            || self.time_to_sleep < 0.0
        {
            return Err(PhysicsError::InvalidConfig(
                "sleep tolerances must be non-negative",
            ));
        }
        if !(self.aabb_margin.is_finite() && self.aabb_margin >= 0.0) {
            return Err(PhysicsError::InvalidConfig("aabb_margin must be non-negative"));
        }
        Ok(())
    }
}

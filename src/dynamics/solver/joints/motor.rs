//! [`MotorJoint`] joint.

use super::{ImpulseJoint, PointConstraintPart, validate_pair};
use crate::{
    PhysicsConfig, PhysicsError,
    dynamics::solver::softness_parameters::{SoftnessCoefficients, SoftnessParameters},
    prelude::*,
};

/// A motor joint drives the second body towards a target position and rotation relative to
/// the first body, using at most [`max_force`](Self::max_force) and
/// [`max_torque`](Self::max_torque).
///
/// Motor joints keep their island awake.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorJoint {
    pub body1: BodyId,
    pub body2: BodyId,
    /// The largest force the joint can apply to reach the linear offset.
    pub max_force: Scalar,
    /// The largest torque the joint can apply to reach the angular offset.
    pub max_torque: Scalar,
    pub softness: SoftnessParameters,
    angular_offset: Scalar,
    /// `local_anchor1` holds the linear offset in the first body's frame.
    point_constraint: PointConstraintPart,
    angular_impulse: Scalar,
    angular_mass: Scalar,
    angular_bias: Scalar,
    angular_gamma: Scalar,
    max_linear_impulse: Scalar,
    max_angular_impulse: Scalar,
}

impl MotorJoint {
    /// Creates a motor that holds the bodies in their current relative pose.
    pub fn new(body1: &RigidBody, body2: &RigidBody) -> Result<Self, PhysicsError> {
        validate_pair(body1, body2)?;
        let linear_offset = inverse_rotate(body2.position() - body1.position(), body1.rotation());
        Ok(Self {
            body1: body1.id(),
            body2: body2.id(),
            max_force: 1000.0,
            max_torque: 1000.0,
            softness: SoftnessParameters::RIGID,
            angular_offset: body2.rotation() - body1.rotation(),
            point_constraint: PointConstraintPart::new(linear_offset, Vector::ZERO),
            angular_impulse: 0.0,
            angular_mass: 0.0,
            angular_bias: 0.0,
            angular_gamma: 0.0,
            max_linear_impulse: 0.0,
            max_angular_impulse: 0.0,
        })
    }

    pub fn with_max_force(mut self, max_force: Scalar) -> Self {
        self.max_force = max_force.max(0.0);
        self
    }

    pub fn with_max_torque(mut self, max_torque: Scalar) -> Self {
        self.max_torque = max_torque.max(0.0);
        self
    }

    pub fn with_softness(mut self, softness: SoftnessParameters) -> Self {
        self.softness = softness;
        self
    }

    /// The target position of the second body in the first body's frame.
    #[inline]
    pub fn linear_offset(&self) -> Vector {
        self.point_constraint.local_anchor1
    }

    pub fn set_linear_offset(&mut self, offset: Vector) {
        self.point_constraint.local_anchor1 = offset;
    }

    /// The target value of `rotation2 - rotation1`.
    #[inline]
    pub fn angular_offset(&self) -> Scalar {
        self.angular_offset
    }

    pub fn set_angular_offset(&mut self, offset: Scalar) {
        self.angular_offset = offset;
    }

    /// The linear impulse accumulated in the last step.
    #[inline]
    pub fn linear_impulse(&self) -> Vector {
        self.point_constraint.impulse
    }

    /// The angular impulse accumulated in the last step.
    #[inline]
    pub fn angular_impulse(&self) -> Scalar {
        self.angular_impulse
    }
}

impl ImpulseJoint for MotorJoint {
    fn body1(&self) -> BodyId {
        self.body1
    }

    fn body2(&self) -> Option<BodyId> {
        Some(self.body2)
    }

    fn prepare(
        &mut self,
        body1: &mut SolverBody,
        body2: &mut SolverBody,
        delta_secs: Scalar,
        config: &PhysicsConfig,
    ) {
        self.max_linear_impulse = self.max_force * delta_secs;
        self.max_angular_impulse = self.max_torque * delta_secs;

        let reduced_mass = (body1.inv_mass + body2.inv_mass).recip_or_zero();
        let linear = self
            .softness
            .compute_coefficients(delta_secs, reduced_mass, config);
        self.point_constraint
            .prepare(body1, body2, delta_secs, linear, config.warm_starting);

        let k = body1.inv_inertia + body2.inv_inertia;
        let angular: SoftnessCoefficients =
            self.softness
                .compute_coefficients(delta_secs, k.recip_or_zero(), config);
        let angular_error = (body2.rotation - body1.rotation) - self.angular_offset;
        self.angular_mass = (k + angular.gamma).recip_or_zero();
        self.angular_bias = angular.beta / delta_secs * angular_error;
        self.angular_gamma = angular.gamma;

        if config.warm_starting {
            body1.apply_angular_impulse(-self.angular_impulse);
            body2.apply_angular_impulse(self.angular_impulse);
        } else {
            self.angular_impulse = 0.0;
        }
    }

    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        let jv = body2.angular_velocity - body1.angular_velocity;
        let lambda = -self.angular_mass
            * (jv + self.angular_bias + self.angular_gamma * self.angular_impulse);
        let old_impulse = self.angular_impulse;
        self.angular_impulse = (self.angular_impulse + lambda)
            .clamp(-self.max_angular_impulse, self.max_angular_impulse);
        let lambda = self.angular_impulse - old_impulse;
        body1.apply_angular_impulse(-lambda);
        body2.apply_angular_impulse(lambda);

        self.point_constraint
            .solve(body1, body2, Some(self.max_linear_impulse));
    }

    fn keeps_awake(&self) -> bool {
        true
    }
}

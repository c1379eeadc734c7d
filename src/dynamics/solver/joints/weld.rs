//! [`WeldJoint`] joint.

use super::{ImpulseJoint, local_anchor, validate_pair};
use crate::{
    PhysicsConfig, PhysicsError, dynamics::solver::softness_parameters::SoftnessParameters,
    prelude::*,
};

/// A weld joint glues two bodies together at an anchor, removing all relative motion.
///
/// The point and angle constraints are solved together as one 3x3 system.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct WeldJoint {
    pub body1: BodyId,
    pub body2: BodyId,
    pub local_anchor1: Vector,
    pub local_anchor2: Vector,
    /// The target value of `rotation2 - rotation1`.
    pub reference_angle: Scalar,
    pub softness: SoftnessParameters,
    /// The accumulated linear impulse in `x` and `y`, and the angular impulse in `z`.
    impulse: Vector3,
    r1: Vector,
    r2: Vector,
    effective_mass: Matrix3,
    bias: Vector3,
    gamma: Scalar,
}

impl WeldJoint {
    /// Welds the bodies at the world-space `anchor` in their current relative pose.
    pub fn new(body1: &RigidBody, body2: &RigidBody, anchor: Vector) -> Result<Self, PhysicsError> {
        validate_pair(body1, body2)?;
        Ok(Self {
            body1: body1.id(),
            body2: body2.id(),
            local_anchor1: local_anchor(body1, anchor),
            local_anchor2: local_anchor(body2, anchor),
            reference_angle: body2.rotation() - body1.rotation(),
            softness: SoftnessParameters::RIGID,
            impulse: Vector3::ZERO,
            r1: Vector::ZERO,
            r2: Vector::ZERO,
            effective_mass: Matrix3::ZERO,
            bias: Vector3::ZERO,
            gamma: 0.0,
        })
    }

    pub fn with_softness(mut self, softness: SoftnessParameters) -> Self {
        self.softness = softness;
        self
    }

    /// The linear impulse accumulated in the last step.
    #[inline]
    pub fn linear_impulse(&self) -> Vector {
        self.impulse.truncate()
    }

    /// The angular impulse accumulated in the last step.
    #[inline]
    pub fn angular_impulse(&self) -> Scalar {
        self.impulse.z
    }

    fn apply_impulse(&self, body1: &mut SolverBody, body2: &mut SolverBody, impulse: Vector3) {
        let linear = impulse.truncate();
        body1.apply_impulse(-linear, self.r1);
        body1.apply_angular_impulse(-impulse.z);
        body2.apply_impulse(linear, self.r2);
        body2.apply_angular_impulse(impulse.z);
    }
}

impl ImpulseJoint for WeldJoint {
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
        let (r1, r2) = (
            rotate(self.local_anchor1, body1.rotation),
            rotate(self.local_anchor2, body2.rotation),
        );
        self.r1 = r1;
        self.r2 = r2;

        let inv_mass_sum = body1.inv_mass + body2.inv_mass;
        let (i1, i2) = (body1.inv_inertia, body2.inv_inertia);

        let coefficients =
            self.softness
                .compute_coefficients(delta_secs, inv_mass_sum.recip_or_zero(), config);
        self.gamma = coefficients.gamma;

        // K = J M^-1 J^T for the rows [point x, point y, angle].
        let k00 = inv_mass_sum + r1.y * r1.y * i1 + r2.y * r2.y * i2 + self.gamma;
        let k01 = -r1.y * r1.x * i1 - r2.y * r2.x * i2;
        let k02 = -r1.y * i1 - r2.y * i2;
        let k11 = inv_mass_sum + r1.x * r1.x * i1 + r2.x * r2.x * i2 + self.gamma;
        let k12 = r1.x * i1 + r2.x * i2;
        let k22 = i1 + i2 + self.gamma;
        let k = Matrix3::from_cols(
            Vector3::new(k00, k01, k02),
            Vector3::new(k01, k11, k12),
            Vector3::new(k02, k12, k22),
        );
        self.effective_mass = inverse_or_zero3(k);

        let linear_error = (body2.position + r2) - (body1.position + r1);
        let angular_error = (body2.rotation - body1.rotation) - self.reference_angle;
        self.bias = coefficients.beta / delta_secs * linear_error.extend(angular_error);

        if config.warm_starting {
            self.apply_impulse(body1, body2, self.impulse);
        } else {
            self.impulse = Vector3::ZERO;
        }
    }

    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        let linear = body2.velocity_at_point(self.r2) - body1.velocity_at_point(self.r1);
        let angular = body2.angular_velocity - body1.angular_velocity;
        let jv = linear.extend(angular);

        let impulse = -(self.effective_mass * (jv + self.bias + self.gamma * self.impulse));
        self.impulse += impulse;
        self.apply_impulse(body1, body2, impulse);
    }
}

//! [`DistanceJoint`] joint.

use super::{ImpulseJoint, local_anchor, validate_pair};
use crate::{
    PhysicsConfig, PhysicsError, dynamics::solver::softness_parameters::SoftnessParameters,
    prelude::*,
};

/// A distance joint keeps the anchors of two bodies at a fixed distance from each other
/// while allowing rotation.
///
/// With [`SoftnessParameters`], the joint behaves like a damped spring. This can be useful
/// for things like ropes made of segments, suspensions and mass-spring networks.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceJoint {
    pub body1: BodyId,
    pub body2: BodyId,
    /// Attachment point on the first body, in its local frame.
    pub local_anchor1: Vector,
    /// Attachment point on the second body, in its local frame.
    pub local_anchor2: Vector,
    /// The distance the anchors are kept at.
    pub rest_length: Scalar,
    pub softness: SoftnessParameters,
    impulse: Scalar,
    r1: Vector,
    r2: Vector,
    axis: Vector,
    effective_mass: Scalar,
    bias: Scalar,
    gamma: Scalar,
}

impl DistanceJoint {
    /// Connects the world-space `anchor1` on `body1` to `anchor2` on `body2`.
    ///
    /// The rest length is the current distance between the anchors.
    pub fn new(
        body1: &RigidBody,
        body2: &RigidBody,
        anchor1: Vector,
        anchor2: Vector,
    ) -> Result<Self, PhysicsError> {
        validate_pair(body1, body2)?;
        Ok(Self {
            body1: body1.id(),
            body2: body2.id(),
            local_anchor1: local_anchor(body1, anchor1),
            local_anchor2: local_anchor(body2, anchor2),
            rest_length: anchor1.distance(anchor2),
            softness: SoftnessParameters::RIGID,
            impulse: 0.0,
            r1: Vector::ZERO,
            r2: Vector::ZERO,
            axis: Vector::ZERO,
            effective_mass: 0.0,
            bias: 0.0,
            gamma: 0.0,
        })
    }

    pub fn with_rest_length(mut self, rest_length: Scalar) -> Self {
        self.rest_length = rest_length.max(0.0);
        self
    }

    pub fn with_softness(mut self, softness: SoftnessParameters) -> Self {
        self.softness = softness;
        self
    }

    /// The impulse accumulated in the last step, positive when pushing the bodies apart.
    #[inline]
    pub fn impulse(&self) -> Scalar {
        self.impulse
    }
}

impl ImpulseJoint for DistanceJoint {
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
        self.r1 = rotate(self.local_anchor1, body1.rotation);
        self.r2 = rotate(self.local_anchor2, body2.rotation);

        let separation = (body2.position + self.r2) - (body1.position + self.r1);
        let length = separation.length();
        self.axis = separation.normalize_or_zero();

        let r1_cross_n = cross(self.r1, self.axis);
        let r2_cross_n = cross(self.r2, self.axis);
        let k = body1.inv_mass
            + body2.inv_mass
            + body1.inv_inertia * r1_cross_n * r1_cross_n
            + body2.inv_inertia * r2_cross_n * r2_cross_n;

        let coefficients =
            self.softness
                .compute_coefficients(delta_secs, k.recip_or_zero(), config);

        self.gamma = coefficients.gamma;
        self.effective_mass = (k + self.gamma).recip_or_zero();
        self.bias = coefficients.beta / delta_secs * (length - self.rest_length);

        if config.warm_starting {
            let impulse = self.impulse * self.axis;
            body1.apply_impulse(-impulse, self.r1);
            body2.apply_impulse(impulse, self.r2);
        } else {
            self.impulse = 0.0;
        }
    }

    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        let relative_velocity =
            body2.velocity_at_point(self.r2) - body1.velocity_at_point(self.r1);
        let jv = relative_velocity.dot(self.axis);
        let lambda = -self.effective_mass * (jv + self.bias + self.gamma * self.impulse);
        self.impulse += lambda;

        let impulse = lambda * self.axis;
        body1.apply_impulse(-impulse, self.r1);
        body2.apply_impulse(impulse, self.r2);
    }
}

//! [`AngleJoint`] joint.

use super::{ImpulseJoint, validate_pair};
use crate::{
    PhysicsConfig, PhysicsError, dynamics::solver::softness_parameters::SoftnessParameters,
    prelude::*,
};

/// An angle joint keeps the relative rotation of two bodies fixed, leaving their positions free.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct AngleJoint {
    pub body1: BodyId,
    pub body2: BodyId,
    /// The target value of `rotation2 - rotation1`.
    pub reference_angle: Scalar,
    pub softness: SoftnessParameters,
    impulse: Scalar,
    effective_mass: Scalar,
    bias: Scalar,
    gamma: Scalar,
}

impl AngleJoint {
    /// Locks the current relative rotation of the bodies.
    pub fn new(body1: &RigidBody, body2: &RigidBody) -> Result<Self, PhysicsError> {
        validate_pair(body1, body2)?;
        Ok(Self {
            body1: body1.id(),
            body2: body2.id(),
            reference_angle: body2.rotation() - body1.rotation(),
            softness: SoftnessParameters::RIGID,
            impulse: 0.0,
            effective_mass: 0.0,
            bias: 0.0,
            gamma: 0.0,
        })
    }

    pub fn with_reference_angle(mut self, angle: Scalar) -> Self {
        self.reference_angle = angle;
        self
    }

    pub fn with_softness(mut self, softness: SoftnessParameters) -> Self {
        self.softness = softness;
        self
    }

    /// The angular impulse accumulated in the last step.
    #[inline]
    pub fn impulse(&self) -> Scalar {
        self.impulse
    }

    pub(crate) fn prepare_angle(
        &mut self,
        body1: &mut SolverBody,
        body2: &mut SolverBody,
        delta_secs: Scalar,
        config: &PhysicsConfig,
    ) {
        let k = body1.inv_inertia + body2.inv_inertia;
        let coefficients =
            self.softness
                .compute_coefficients(delta_secs, k.recip_or_zero(), config);

        let error = (body2.rotation - body1.rotation) - self.reference_angle;
        self.gamma = coefficients.gamma;
        self.effective_mass = (k + self.gamma).recip_or_zero();
        self.bias = coefficients.beta / delta_secs * error;

        if config.warm_starting {
            body1.apply_angular_impulse(-self.impulse);
            body2.apply_angular_impulse(self.impulse);
        } else {
            self.impulse = 0.0;
        }
    }

    pub(crate) fn solve_angle(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        let jv = body2.angular_velocity - body1.angular_velocity;
        let lambda = -self.effective_mass * (jv + self.bias + self.gamma * self.impulse);
        self.impulse += lambda;

        body1.apply_angular_impulse(-lambda);
        body2.apply_angular_impulse(lambda);
    }
}

impl ImpulseJoint for AngleJoint {
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
        self.prepare_angle(body1, body2, delta_secs, config);
    }

    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        self.solve_angle(body1, body2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pinned_wheel(world: &mut PhysicsWorld) -> (BodyId, BodyId) {
        world.config_mut().gravity = Vector::ZERO;
        let ground = world.register_body(RigidBody::rectangle(1.0, 1.0).unwrap().into_static());
        let wheel = world.register_body(
            RigidBody::circle(0.5)
                .unwrap()
                .with_position(Vector::new(3.0, 0.0)),
        );
        (ground, wheel)
    }

    #[test]
    fn reaches_reference_angle() {
        let mut world = PhysicsWorld::default();
        let (ground, wheel) = pinned_wheel(&mut world);
        let joint = AngleJoint::new(world.body(ground).unwrap(), world.body(wheel).unwrap())
            .unwrap()
            .with_reference_angle(0.7);
        world.register_joint(joint, false).unwrap();

        for _ in 0..240 {
            world.update();
        }

        let wheel = world.body(wheel).unwrap();
        assert_relative_eq!(wheel.rotation(), 0.7, epsilon = 1e-2);
        // Position is left alone.
        assert_eq!(wheel.position(), Vector::new(3.0, 0.0));
    }

    #[test]
    fn spinning_bodies_share_rotation() {
        let mut world = PhysicsWorld::default();
        world.config_mut().gravity = Vector::ZERO;
        let a = world.register_body(RigidBody::circle(0.5).unwrap());
        let b = world.register_body(
            RigidBody::circle(0.5)
                .unwrap()
                .with_position(Vector::new(3.0, 0.0))
                .with_angular_velocity(3.0),
        );
        let joint = AngleJoint::new(world.body(a).unwrap(), world.body(b).unwrap()).unwrap();
        assert_eq!(joint.reference_angle, 0.0);
        world.register_joint(joint, false).unwrap();

        for _ in 0..120 {
            world.update();
        }

        let (a, b) = (world.body(a).unwrap(), world.body(b).unwrap());
        assert_relative_eq!(b.rotation() - a.rotation(), 0.0, epsilon = 1e-2);
        // Equal inertias split the angular momentum.
        assert_relative_eq!(a.angular_velocity(), 1.5, epsilon = 1e-3);
        assert_relative_eq!(b.angular_velocity(), 1.5, epsilon = 1e-3);
    }

    #[test]
    fn soft_joint_overshoots_then_settles() {
        let mut world = PhysicsWorld::default();
        let (ground, wheel) = pinned_wheel(&mut world);
        let joint = AngleJoint::new(world.body(ground).unwrap(), world.body(wheel).unwrap())
            .unwrap()
            .with_reference_angle(1.0)
            .with_softness(SoftnessParameters::new(2.0, 0.1));
        world.register_joint(joint, false).unwrap();

        let mut max_rotation: Scalar = 0.0;
        for _ in 0..600 {
            world.update();
            max_rotation = max_rotation.max(world.body(wheel).unwrap().rotation());
        }

        assert!(max_rotation > 1.2, "max rotation {max_rotation}");
        assert_relative_eq!(world.body(wheel).unwrap().rotation(), 1.0, epsilon = 1e-2);
    }
}

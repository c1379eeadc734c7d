//! [`LineJoint`] joint.

use super::{ImpulseJoint, local_anchor, validate_pair};
use crate::{
    PhysicsConfig, PhysicsError, dynamics::solver::softness_parameters::SoftnessParameters,
    prelude::*,
};

/// A line joint only lets the anchor of the second body slide along an axis fixed to the
/// first body. Rotation is left free, which makes it suitable for wheel suspensions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct LineJoint {
    pub body1: BodyId,
    pub body2: BodyId,
    pub local_anchor1: Vector,
    pub local_anchor2: Vector,
    /// The unit sliding axis in the first body's local frame.
    pub local_axis1: Vector,
    pub softness: SoftnessParameters,
    impulse: Scalar,
    r1: Vector,
    r2: Vector,
    /// The world-space direction perpendicular to the sliding axis.
    perp: Vector,
    /// `(d + r1) x perp`, where `d` is the separation of the anchors.
    arm1: Scalar,
    /// `r2 x perp`
    arm2: Scalar,
    effective_mass: Scalar,
    bias: Scalar,
    gamma: Scalar,
}

impl LineJoint {
    /// Connects the bodies at the world-space `anchor`, sliding along the world-space `axis`.
    pub fn new(
        body1: &RigidBody,
        body2: &RigidBody,
        anchor: Vector,
        axis: Vector,
    ) -> Result<Self, PhysicsError> {
        validate_pair(body1, body2)?;
        let axis = axis.try_normalize().unwrap_or(Vector::X);
        Ok(Self {
            body1: body1.id(),
            body2: body2.id(),
            local_anchor1: local_anchor(body1, anchor),
            local_anchor2: local_anchor(body2, anchor),
            local_axis1: inverse_rotate(axis, body1.rotation()),
            softness: SoftnessParameters::RIGID,
            impulse: 0.0,
            r1: Vector::ZERO,
            r2: Vector::ZERO,
            perp: Vector::ZERO,
            arm1: 0.0,
            arm2: 0.0,
            effective_mass: 0.0,
            bias: 0.0,
            gamma: 0.0,
        })
    }

    pub fn with_softness(mut self, softness: SoftnessParameters) -> Self {
        self.softness = softness;
        self
    }

    /// The impulse accumulated in the last step, along the axis normal.
    #[inline]
    pub fn impulse(&self) -> Scalar {
        self.impulse
    }

    /// Returns the world-space sliding axis for a first body rotated by `rotation`.
    #[inline]
    pub fn axis(&self, rotation: Scalar) -> Vector {
        rotate(self.local_axis1, rotation)
    }

    fn apply_impulse(&self, body1: &mut SolverBody, body2: &mut SolverBody, lambda: Scalar) {
        let impulse = lambda * self.perp;
        body1.linear_velocity -= impulse * body1.inv_mass;
        body1.angular_velocity -= body1.inv_inertia * lambda * self.arm1;
        body2.linear_velocity += impulse * body2.inv_mass;
        body2.angular_velocity += body2.inv_inertia * lambda * self.arm2;
    }
}

impl ImpulseJoint for LineJoint {
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
        self.perp = self.axis(body1.rotation).perp();

        let separation = (body2.position + self.r2) - (body1.position + self.r1);
        self.arm1 = cross(separation + self.r1, self.perp);
        self.arm2 = cross(self.r2, self.perp);

        let k = body1.inv_mass
            + body2.inv_mass
            + body1.inv_inertia * self.arm1 * self.arm1
            + body2.inv_inertia * self.arm2 * self.arm2;

        let coefficients =
            self.softness
                .compute_coefficients(delta_secs, k.recip_or_zero(), config);
        self.gamma = coefficients.gamma;
        self.effective_mass = (k + self.gamma).recip_or_zero();
        self.bias = coefficients.beta / delta_secs * separation.dot(self.perp);

        if config.warm_starting {
            self.apply_impulse(body1, body2, self.impulse);
        } else {
            self.impulse = 0.0;
        }
    }

    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        let jv = self.perp.dot(body2.linear_velocity - body1.linear_velocity)
            + self.arm2 * body2.angular_velocity
            - self.arm1 * body1.angular_velocity;
        let lambda = -self.effective_mass * (jv + self.bias + self.gamma * self.impulse);
        self.impulse += lambda;
        self.apply_impulse(body1, body2, lambda);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slides_along_axis_only() {
        let mut world = PhysicsWorld::default();
        let rail = world.register_body(RigidBody::rectangle(0.5, 0.5).unwrap().into_static());
        let cart = world.register_body(
            RigidBody::rectangle(1.0, 1.0)
                .unwrap()
                .with_position(Vector::new(2.0, 0.0))
                .with_linear_velocity(Vector::new(1.0, 1.0))
                .with_angular_velocity(2.0),
        );
        let joint = LineJoint::new(
            world.body(rail).unwrap(),
            world.body(cart).unwrap(),
            Vector::new(2.0, 0.0),
            Vector::X,
        )
        .unwrap();
        world.register_joint(joint, false).unwrap();

        for _ in 0..120 {
            world.update();
            assert!(world.body(cart).unwrap().position().y.abs() < 0.01);
        }

        let cart = world.body(cart).unwrap();
        assert!(cart.position().x > 3.5);
        assert_relative_eq!(cart.linear_velocity().y, 0.0, epsilon = 1e-3);
        // Rotation is not constrained.
        assert!(cart.rotation() > 3.0);
    }

    #[test]
    fn tilted_axis_follows_first_body() {
        let mut world = PhysicsWorld::default();
        world.config_mut().gravity = Vector::ZERO;
        let rail = world.register_body(
            RigidBody::rectangle(0.5, 0.5)
                .unwrap()
                .into_static()
                .with_rotation(0.3),
        );
        let start = Vector::new(2.0, 0.0);
        let cart = world.register_body(
            RigidBody::circle(0.5)
                .unwrap()
                .with_position(start)
                .with_linear_velocity(Vector::new(2.0, 0.0)),
        );
        let axis = Vector::new(1.0, 1.0);
        let joint = LineJoint::new(
            world.body(rail).unwrap(),
            world.body(cart).unwrap(),
            start,
            axis,
        )
        .unwrap();
        assert_relative_eq!(joint.axis(0.3), axis.normalize(), epsilon = 1e-6);
        let id = world.register_joint(joint, false).unwrap();

        for _ in 0..120 {
            world.update();
        }

        let offset = world.body(cart).unwrap().position() - start;
        assert_relative_eq!(cross(axis.normalize(), offset), 0.0, epsilon = 0.01);
        assert!(offset.dot(axis) > 1.0);

        let JointKind::Line(line) = &world.joint(id).unwrap().kind else {
            panic!("expected a line joint");
        };
        assert_relative_eq!(line.impulse(), 0.0, epsilon = 1e-3);
    }
}

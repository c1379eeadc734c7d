//! [`MaxDistanceJoint`] joint.

use super::{ImpulseJoint, local_anchor, validate_pair};
use crate::{
    PhysicsConfig, PhysicsError, dynamics::solver::softness_parameters::SoftnessCoefficients,
    prelude::*,
};

/// A max distance joint keeps the anchors of two bodies from moving further apart than
/// a maximum distance, like a rope. Below that distance the bodies move freely.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MaxDistanceJoint {
    pub body1: BodyId,
    pub body2: BodyId,
    pub local_anchor1: Vector,
    pub local_anchor2: Vector,
    /// The largest allowed distance between the anchors.
    pub max_distance: Scalar,
    impulse: Scalar,
    active: bool,
    r1: Vector,
    r2: Vector,
    axis: Vector,
    effective_mass: Scalar,
    bias: Scalar,
}

impl MaxDistanceJoint {
    /// Connects the world-space `anchor1` on `body1` to `anchor2` on `body2`.
    ///
    /// The maximum distance is the current distance between the anchors.
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
            max_distance: anchor1.distance(anchor2),
            impulse: 0.0,
            active: false,
            r1: Vector::ZERO,
            r2: Vector::ZERO,
            axis: Vector::ZERO,
            effective_mass: 0.0,
            bias: 0.0,
        })
    }

    pub fn with_max_distance(mut self, max_distance: Scalar) -> Self {
        self.max_distance = max_distance.max(0.0);
        self
    }

    /// Returns `true` if the anchors were further apart than the maximum distance
    /// at the start of the last step.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The impulse accumulated in the last step. Never positive.
    #[inline]
    pub fn impulse(&self) -> Scalar {
        self.impulse
    }
}

impl ImpulseJoint for MaxDistanceJoint {
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
        let error = length - self.max_distance;

        self.active = error > 0.0;
        if !self.active {
            self.impulse = 0.0;
            return;
        }

        self.axis = separation.normalize_or_zero();
        let r1_cross_n = cross(self.r1, self.axis);
        let r2_cross_n = cross(self.r2, self.axis);
        let k = body1.inv_mass
            + body2.inv_mass
            + body1.inv_inertia * r1_cross_n * r1_cross_n
            + body2.inv_inertia * r2_cross_n * r2_cross_n;
        self.effective_mass = k.recip_or_zero();
        self.bias = SoftnessCoefficients::rigid(config).beta / delta_secs * error;

        if config.warm_starting {
            let impulse = self.impulse * self.axis;
            body1.apply_impulse(-impulse, self.r1);
            body2.apply_impulse(impulse, self.r2);
        } else {
            self.impulse = 0.0;
        }
    }

    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        if !self.active {
            return;
        }

        let relative_velocity =
            body2.velocity_at_point(self.r2) - body1.velocity_at_point(self.r1);
        let jv = relative_velocity.dot(self.axis);
        let lambda = -self.effective_mass * (jv + self.bias);

        // The joint can only pull the bodies together.
        let old_impulse = self.impulse;
        self.impulse = (self.impulse + lambda).min(0.0);
        let lambda = self.impulse - old_impulse;

        let impulse = lambda * self.axis;
        body1.apply_impulse(-impulse, self.r1);
        body2.apply_impulse(impulse, self.r2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rope(world: &mut PhysicsWorld, b_velocity: Vector, b_x: Scalar) -> (BodyId, BodyId) {
        world.config_mut().gravity = Vector::ZERO;
        let a = world.register_body(RigidBody::circle(0.5).unwrap());
        let b = world.register_body(
            RigidBody::circle(0.5)
                .unwrap()
                .with_position(Vector::new(b_x, 0.0))
                .with_linear_velocity(b_velocity),
        );
        (a, b)
    }

    fn joint_state(world: &PhysicsWorld, id: JointId) -> (bool, Scalar) {
        let JointKind::MaxDistance(joint) = &world.joint(id).unwrap().kind else {
            panic!("expected a max distance joint");
        };
        (joint.is_active(), joint.impulse())
    }

    #[test]
    fn slack_until_stretched() {
        let mut world = PhysicsWorld::default();
        let (a, b) = rope(&mut world, Vector::new(1.0, 0.0), 3.0);
        let joint = MaxDistanceJoint::new(
            world.body(a).unwrap(),
            world.body(b).unwrap(),
            Vector::ZERO,
            Vector::new(3.0, 0.0),
        )
        .unwrap()
        .with_max_distance(5.0);
        let id = world.register_joint(joint, false).unwrap();

        // Below the limit, the bodies move freely.
        for _ in 0..60 {
            world.update();
            assert_eq!(joint_state(&world, id), (false, 0.0));
        }
        assert_eq!(world.body(a).unwrap().linear_velocity(), Vector::ZERO);
        assert_eq!(world.body(b).unwrap().linear_velocity(), Vector::new(1.0, 0.0));
        assert_relative_eq!(world.body(b).unwrap().position().x, 4.0, epsilon = 1e-3);

        // Past it, the rope drags the first body along.
        for _ in 0..240 {
            world.update();
            let distance = world
                .body(a)
                .unwrap()
                .position()
                .distance(world.body(b).unwrap().position());
            assert!(distance < 5.05, "distance {distance}");
        }
        let va = world.body(a).unwrap().linear_velocity();
        let vb = world.body(b).unwrap().linear_velocity();
        assert!(va.x > 0.0);
        assert_relative_eq!(va.x + vb.x, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn never_pushes_apart() {
        let mut world = PhysicsWorld::default();
        // Stretched past the limit, but closing fast.
        let (a, b) = rope(&mut world, Vector::new(-20.0, 0.0), 6.0);
        let mut joint = MaxDistanceJoint::new(
            world.body(a).unwrap(),
            world.body(b).unwrap(),
            Vector::ZERO,
            Vector::new(6.0, 0.0),
        )
        .unwrap()
        .with_max_distance(5.0);

        let mut body1 = SolverBody::from_body(world.body(a).unwrap());
        let mut body2 = SolverBody::from_body(world.body(b).unwrap());
        joint.prepare(&mut body1, &mut body2, 1.0 / 60.0, world.config());
        assert!(joint.is_active());

        for _ in 0..10 {
            joint.solve(&mut body1, &mut body2);
            assert!(joint.impulse() <= 0.0);
        }
        assert_eq!(joint.impulse(), 0.0);
        assert_eq!(body1.linear_velocity, Vector::ZERO);
        assert_eq!(body2.linear_velocity, Vector::new(-20.0, 0.0));
    }
}

//! [`PrismaticJoint`] joint.

use super::{AngleJoint, ImpulseJoint, LineJoint};
use crate::{
    PhysicsConfig, PhysicsError, dynamics::solver::softness_parameters::SoftnessParameters,
    prelude::*,
};

/// A prismatic joint lets the second body slide along an axis fixed to the first body,
/// and keeps their relative rotation fixed, like a piston.
///
/// It is a [`LineJoint`] combined with an [`AngleJoint`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PrismaticJoint {
    line: LineJoint,
    angle: AngleJoint,
}

impl PrismaticJoint {
    /// Connects the bodies at the world-space `anchor`, sliding along the world-space `axis`.
    pub fn new(
        body1: &RigidBody,
        body2: &RigidBody,
        anchor: Vector,
        axis: Vector,
    ) -> Result<Self, PhysicsError> {
        Ok(Self {
            line: LineJoint::new(body1, body2, anchor, axis)?,
            angle: AngleJoint::new(body1, body2)?,
        })
    }

    /// Sets the softness of both the sliding and the rotational constraint.
    pub fn with_softness(mut self, softness: SoftnessParameters) -> Self {
        self.line.softness = softness;
        self.angle.softness = softness;
        self
    }

    #[inline]
    pub fn softness(&self) -> SoftnessParameters {
        self.line.softness
    }

    #[inline]
    pub fn line(&self) -> &LineJoint {
        &self.line
    }

    #[inline]
    pub fn angle(&self) -> &AngleJoint {
        &self.angle
    }
}

impl ImpulseJoint for PrismaticJoint {
    fn body1(&self) -> BodyId {
        self.line.body1
    }

    fn body2(&self) -> Option<BodyId> {
        Some(self.line.body2)
    }

    fn prepare(
        &mut self,
        body1: &mut SolverBody,
        body2: &mut SolverBody,
        delta_secs: Scalar,
        config: &PhysicsConfig,
    ) {
        self.angle.prepare(body1, body2, delta_secs, config);
        self.line.prepare(body1, body2, delta_secs, config);
    }

    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        self.angle.solve(body1, body2);
        self.line.solve(body1, body2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slides_down_a_slope_without_turning() {
        let mut world = PhysicsWorld::default();
        let frame = world.register_body(RigidBody::rectangle(0.5, 0.5).unwrap().into_static());
        let start = Vector::new(2.0, 0.0);
        let piston = world.register_body(
            RigidBody::rectangle(1.0, 0.5)
                .unwrap()
                .with_position(start)
                .with_angular_velocity(3.0),
        );
        let axis = Vector::new(1.0, -1.0).normalize();
        let joint = PrismaticJoint::new(
            world.body(frame).unwrap(),
            world.body(piston).unwrap(),
            start,
            axis,
        )
        .unwrap();
        assert_eq!(joint.angle().reference_angle, 0.0);
        assert!(joint.softness().is_rigid());
        world.register_joint(joint, false).unwrap();

        for _ in 0..60 {
            world.update();
            let offset = world.body(piston).unwrap().position() - start;
            assert!(cross(axis, offset).abs() < 0.01);
        }

        let piston = world.body(piston).unwrap();
        assert_relative_eq!(piston.rotation(), 0.0, epsilon = 1e-2);
        assert_relative_eq!(piston.angular_velocity(), 0.0, epsilon = 1e-2);
        assert!((piston.position() - start).dot(axis) > 2.0);
    }

    #[test]
    fn softness_applies_to_both_parts() {
        let mut world = PhysicsWorld::default();
        let a = world.register_body(RigidBody::circle(0.5).unwrap());
        let b = world.register_body(
            RigidBody::circle(0.5)
                .unwrap()
                .with_position(Vector::new(2.0, 0.0)),
        );
        let softness = SoftnessParameters::new(5.0, 0.7);
        let joint = PrismaticJoint::new(
            world.body(a).unwrap(),
            world.body(b).unwrap(),
            Vector::new(1.0, 0.0),
            Vector::X,
        )
        .unwrap()
        .with_softness(softness);

        assert_eq!(joint.softness(), softness);
        assert_eq!(joint.line().softness, softness);
        assert_eq!(joint.angle().softness, softness);
        assert_eq!(joint.line().body2, b);
    }
}

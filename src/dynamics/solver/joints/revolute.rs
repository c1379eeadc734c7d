//! [`RevoluteJoint`] joint.

use super::{ImpulseJoint, PointConstraintPart, local_anchor, validate_pair};
use crate::{
    PhysicsConfig, PhysicsError, dynamics::solver::softness_parameters::SoftnessCoefficients,
    prelude::*,
};

/// A revolute joint pins two bodies together at a shared anchor point while letting
/// them rotate freely relative to each other, like a hinge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct RevoluteJoint {
    pub body1: BodyId,
    pub body2: BodyId,
    point_constraint: PointConstraintPart,
}

impl RevoluteJoint {
    /// Connects the bodies at the world-space `anchor`.
    pub fn new(body1: &RigidBody, body2: &RigidBody, anchor: Vector) -> Result<Self, PhysicsError> {
        validate_pair(body1, body2)?;
        Ok(Self {
            body1: body1.id(),
            body2: body2.id(),
            point_constraint: PointConstraintPart::new(
                local_anchor(body1, anchor),
                local_anchor(body2, anchor),
            ),
        })
    }

    /// The anchor on the first body, in its local frame.
    #[inline]
    pub fn local_anchor1(&self) -> Vector {
        self.point_constraint.local_anchor1
    }

    /// The anchor on the second body, in its local frame.
    #[inline]
    pub fn local_anchor2(&self) -> Vector {
        self.point_constraint.local_anchor2
    }

    /// The impulse accumulated in the last step.
    #[inline]
    pub fn impulse(&self) -> Vector {
        self.point_constraint.impulse
    }
}

impl ImpulseJoint for RevoluteJoint {
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
        self.point_constraint.prepare(
            body1,
            body2,
            delta_secs,
            SoftnessCoefficients::rigid(config),
            config.warm_starting,
        );
    }

    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        self.point_constraint.solve(body1, body2, None);
    }
}

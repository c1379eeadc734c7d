//! [`GrabJoint`] joint.

use super::{ImpulseJoint, PointConstraintPart, local_anchor};
use crate::{
    PhysicsConfig, PhysicsError, dynamics::solver::softness_parameters::SoftnessParameters,
    prelude::*,
};

/// A grab joint pulls an anchor on a single dynamic body towards a world-space target with a
/// soft spring, for example to drag a body with the mouse.
///
/// Grab joints keep their island awake.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct GrabJoint {
    pub body: BodyId,
    pub softness: SoftnessParameters,
    /// The largest force the joint can apply, if any.
    pub max_force: Option<Scalar>,
    /// `local_anchor2` holds the target, since the second body is a dummy at the origin.
    point_constraint: PointConstraintPart,
    max_impulse: Option<Scalar>,
}

impl GrabJoint {
    /// The default softness of a grab joint.
    pub const DEFAULT_SOFTNESS: SoftnessParameters = SoftnessParameters {
        frequency: 5.0,
        damping_ratio: 0.7,
        joint_mass: None,
    };

    /// Grabs `body` at the world-space `anchor`, with the target initially at the anchor.
    pub fn new(body: &RigidBody, anchor: Vector) -> Result<Self, PhysicsError> {
        if !body.is_registered() {
            return Err(PhysicsError::DetachedBody);
        }
        if !body.is_dynamic() {
            return Err(PhysicsError::NonDynamicGrab(body.id()));
        }
        Ok(Self {
            body: body.id(),
            softness: Self::DEFAULT_SOFTNESS,
            max_force: None,
            point_constraint: PointConstraintPart::new(local_anchor(body, anchor), anchor),
            max_impulse: None,
        })
    }

    pub fn with_softness(mut self, softness: SoftnessParameters) -> Self {
        self.softness = softness;
        self
    }

    pub fn with_max_force(mut self, max_force: Scalar) -> Self {
        self.max_force = Some(max_force.max(0.0));
        self
    }

    /// The world-space point the body is pulled towards.
    #[inline]
    pub fn target(&self) -> Vector {
        self.point_constraint.local_anchor2
    }

    pub fn set_target(&mut self, target: Vector) {
        self.point_constraint.local_anchor2 = target;
    }

    /// The anchor on the grabbed body, in its local frame.
    #[inline]
    pub fn local_anchor(&self) -> Vector {
        self.point_constraint.local_anchor1
    }

    /// The impulse accumulated in the last step, applied towards the target.
    #[inline]
    pub fn impulse(&self) -> Vector {
        -self.point_constraint.impulse
    }
}

impl ImpulseJoint for GrabJoint {
    fn body1(&self) -> BodyId {
        self.body
    }

    fn body2(&self) -> Option<BodyId> {
        None
    }

    fn prepare(
        &mut self,
        body1: &mut SolverBody,
        body2: &mut SolverBody,
        delta_secs: Scalar,
        config: &PhysicsConfig,
    ) {
        self.max_impulse = self.max_force.map(|force| force * delta_secs);
        let coefficients =
            self.softness
                .compute_coefficients(delta_secs, body1.inv_mass.recip_or_zero(), config);
        self.point_constraint
            .prepare(body1, body2, delta_secs, coefficients, config.warm_starting);
    }

    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        self.point_constraint.solve(body1, body2, self.max_impulse);
    }

    fn keeps_awake(&self) -> bool {
        true
    }
}

//! **Joints** connect bodies in a way that restricts their movement relative to each other.
//!
//! # Degrees of Freedom (DOF)
//!
//! In 2D, a body can translate along the `X` and `Y` axes and rotate around the `Z` axis,
//! for a total of 3 DOF. Joints remove some of them.
//!
//! | Joint                 | Removed DOF                               | Soft |
//! | --------------------- | ----------------------------------------- | ---- |
//! | [`RevoluteJoint`]     | 2 translations                            | no   |
//! | [`DistanceJoint`]     | 1 translation (distance between anchors)  | yes  |
//! | [`AngleJoint`]        | 1 rotation                                | yes  |
//! | [`LineJoint`]         | 1 translation (perpendicular to an axis)  | yes  |
//! | [`PrismaticJoint`]    | 1 translation and 1 rotation              | yes  |
//! | [`WeldJoint`]         | 2 translations and 1 rotation             | yes  |
//! | [`MaxDistanceJoint`]  | distance, only when above a maximum       | no   |
//! | [`MotorJoint`]        | drives position and rotation, force-limited | yes |
//! | [`GrabJoint`]         | pulls one body towards a target point     | yes  |
//!
//! # Solving
//!
//! Joints are impulse-based velocity constraints, solved together with contacts by the
//! sequential impulse solver. Each step, [`ImpulseJoint::prepare`] recomputes anchors,
//! effective masses and position error biases, and re-applies the impulse accumulated
//! in the previous step. [`ImpulseJoint::solve`] then runs once per solver iteration.
//!
//! Soft joints are tuned with [`SoftnessParameters`]. Rigid joints correct drift with the
//! configured Baumgarte factor.
//!
//! # Building joints
//!
//! Joint constructors take the bodies they connect and world-space anchor points. The bodies
//! must already be registered in the world, and their current pose defines the joint's rest
//! configuration.
//!
//! ```
//! use impulse2d::prelude::*;
//!
//! let mut world = PhysicsWorld::default();
//! let ground = world.register_body(RigidBody::rectangle(10.0, 1.0).unwrap().into_static());
//! let pendulum = world.register_body(
//!     RigidBody::circle(0.25).unwrap().with_position(Vector::new(2.0, 3.0)),
//! );
//!
//! let joint = RevoluteJoint::new(
//!     world.body(ground).unwrap(),
//!     world.body(pendulum).unwrap(),
//!     Vector::new(0.0, 3.0),
//! )
//! .unwrap();
//! world.register_joint(joint, false).unwrap();
//! ```

mod point_constraint_part;

mod angle;
mod distance;
mod grab;
mod line;
mod max_distance;
mod motor;
mod prismatic;
mod revolute;
mod weld;

pub use point_constraint_part::PointConstraintPart;

pub use angle::AngleJoint;
pub use distance::DistanceJoint;
pub use grab::GrabJoint;
pub use line::LineJoint;
pub use max_distance::MaxDistanceJoint;
pub use motor::MotorJoint;
pub use prismatic::PrismaticJoint;
pub use revolute::RevoluteJoint;
pub use weld::WeldJoint;

use bitflags::bitflags;
use derive_more::{Display, From};

use crate::{PhysicsConfig, PhysicsError, prelude::*};

/// A stable identifier of a [`Joint`] in a [`PhysicsWorld`](crate::PhysicsWorld).
#[derive(Clone, Copy, Debug, Display, From, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct JointId(pub u32);

impl JointId {
    /// The identifier of a joint that has not been registered yet.
    pub const PLACEHOLDER: Self = Self(u32::MAX);

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The velocity-level protocol shared by every joint type.
pub trait ImpulseJoint {
    /// The first body of the joint.
    fn body1(&self) -> BodyId;

    /// The second body of the joint, or `None` for joints acting on a single body.
    fn body2(&self) -> Option<BodyId>;

    /// Recomputes anchors, effective masses and biases, and warm starts the bodies
    /// with the impulse accumulated in the previous step.
    ///
    /// Single-body joints receive [`SolverBody::DUMMY`] as `body2`.
    fn prepare(
        &mut self,
        body1: &mut SolverBody,
        body2: &mut SolverBody,
        delta_secs: Scalar,
        config: &PhysicsConfig,
    );

    /// Runs one velocity iteration.
    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody);

    /// Joints that keep their island awake while they exist.
    fn keeps_awake(&self) -> bool {
        false
    }
}

/// Every joint type, dispatched without dynamic allocation.
#[derive(Clone, Debug, From, PartialEq)]
pub enum JointKind {
    Revolute(RevoluteJoint),
    Distance(DistanceJoint),
    Angle(AngleJoint),
    Line(LineJoint),
    Prismatic(PrismaticJoint),
    Weld(WeldJoint),
    MaxDistance(MaxDistanceJoint),
    Motor(MotorJoint),
    Grab(GrabJoint),
}

macro_rules! dispatch {
    ($kind:expr, $joint:ident => $body:expr) => {
        match $kind {
            JointKind::Revolute($joint) => $body,
            JointKind::Distance($joint) => $body,
            JointKind::Angle($joint) => $body,
            JointKind::Line($joint) => $body,
            JointKind::Prismatic($joint) => $body,
            JointKind::Weld($joint) => $body,
            JointKind::MaxDistance($joint) => $body,
            JointKind::Motor($joint) => $body,
            JointKind::Grab($joint) => $body,
        }
    };
}

impl ImpulseJoint for JointKind {
    fn body1(&self) -> BodyId {
        dispatch!(self, joint => joint.body1())
    }

    fn body2(&self) -> Option<BodyId> {
        dispatch!(self, joint => joint.body2())
    }

    fn prepare(
        &mut self,
        body1: &mut SolverBody,
        body2: &mut SolverBody,
        delta_secs: Scalar,
        config: &PhysicsConfig,
    ) {
        dispatch!(self, joint => joint.prepare(body1, body2, delta_secs, config))
    }

    fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody) {
        dispatch!(self, joint => joint.solve(body1, body2))
    }

    fn keeps_awake(&self) -> bool {
        dispatch!(self, joint => joint.keeps_awake())
    }
}

bitflags! {
    /// Hints for drawing a joint. The physics core never reads them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
    pub struct JointDrawHints: u8 {
        /// Draw the anchor points.
        const ANCHORS = 1 << 0;
        /// Draw a line between the anchor points.
        const LINE = 1 << 1;
        /// Draw the bodies' centers of mass.
        const CENTERS = 1 << 2;
        /// Draw the joint's axis, for joints that have one.
        const AXIS = 1 << 3;
    }
}

/// A joint registered in, or ready to be registered in, a [`PhysicsWorld`](crate::PhysicsWorld).
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    pub(crate) id: JointId,
    pub kind: JointKind,
    pub draw_hints: JointDrawHints,
    pub(crate) pass_test: bool,
}

impl From<JointKind> for Joint {
    fn from(kind: JointKind) -> Self {
        Self {
            id: JointId::PLACEHOLDER,
            kind,
            draw_hints: JointDrawHints::ANCHORS | JointDrawHints::LINE,
            pass_test: false,
        }
    }
}

macro_rules! impl_into_joint {
    ($($joint:ty),* $(,)?) => {
        $(
            impl From<$joint> for Joint {
                fn from(joint: $joint) -> Self {
                    JointKind::from(joint).into()
                }
            }
        )*
    };
}

impl_into_joint!(
    RevoluteJoint,
    DistanceJoint,
    AngleJoint,
    LineJoint,
    PrismaticJoint,
    WeldJoint,
    MaxDistanceJoint,
    MotorJoint,
    GrabJoint,
);

impl Joint {
    pub fn new(kind: impl Into<JointKind>) -> Self {
        Self::from(kind.into())
    }

    pub fn with_draw_hints(mut self, draw_hints: JointDrawHints) -> Self {
        self.draw_hints = draw_hints;
        self
    }

    #[inline]
    pub fn id(&self) -> JointId {
        self.id
    }

    /// Whether the broad phase skips contacts between the joint's bodies.
    #[inline]
    pub fn pass_test(&self) -> bool {
        self.pass_test
    }

    #[inline]
    pub fn body1(&self) -> BodyId {
        self.kind.body1()
    }

    #[inline]
    pub fn body2(&self) -> Option<BodyId> {
        self.kind.body2()
    }

    /// Returns `true` if the joint references the body.
    pub fn connects(&self, body: BodyId) -> bool {
        self.body1() == body || self.body2() == Some(body)
    }
}

/// Rejects body combinations that no two-body joint can handle.
pub(crate) fn validate_pair(body1: &RigidBody, body2: &RigidBody) -> Result<(), PhysicsError> {
    if !body1.is_registered() || !body2.is_registered() {
        return Err(PhysicsError::DetachedBody);
    }
    if body1.id() == body2.id() {
        return Err(PhysicsError::SameBody(body1.id()));
    }
    if body1.is_static() && body2.is_static() {
        return Err(PhysicsError::StaticPair(body1.id(), body2.id()));
    }
    Ok(())
}

/// Converts a world-space point into the body's local frame, ignoring scale.
#[inline]
pub(crate) fn local_anchor(body: &RigidBody, world_anchor: Vector) -> Vector {
    inverse_rotate(world_anchor - body.position(), body.rotation())
}

//! Errors reported when constructing or registering physics objects.
//!
//! Only configuration-time mistakes produce a [`PhysicsError`]. Numerical edge cases
//! hit during a step, like GJK running out of iterations, are not errors: the pair is
//! simply treated as not colliding for that step.

use thiserror::Error;

use crate::{Scalar, dynamics::rigid_body::BodyId};

/// An error produced when building a shape, a joint or a configuration,
/// or when registering it in a [`PhysicsWorld`](crate::PhysicsWorld).
#[derive(Error, Clone, Debug, PartialEq)]
pub enum PhysicsError {
    #[error("a polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("polygon vertices do not form a convex loop")]
    NonConvexPolygon,

    #[error("polygon has zero area")]
    DegeneratePolygon,

    #[error("shape dimension must be positive and finite, got {0}")]
    InvalidDimension(Scalar),

    #[error("density must be positive and finite, got {0}")]
    InvalidDensity(Scalar),

    #[error("a joint cannot connect body {0} to itself")]
    SameBody(BodyId),

    #[error("a joint between bodies {0} and {1} needs at least one dynamic body")]
    StaticPair(BodyId, BodyId),

    #[error("a grab joint needs a dynamic body, body {0} is static")]
    NonDynamicGrab(BodyId),

    #[error("joint bodies must be registered before building the joint")]
    DetachedBody,

    #[error("body {0} is not registered in this world")]
    UnregisteredBody(BodyId),

    #[error("invalid physics configuration: {0}")]
    InvalidConfig(&'static str),
}

//! Exact collision tests between two convex shapes.
//!
//! The narrow phase runs in three stages:
//!
//! 1. [`gjk`] decides whether the shapes overlap by searching the Minkowski difference
//!    `A - B` for the origin.
//! 2. [`epa`] expands the terminating GJK simplex into a polytope to find the penetration
//!    depth and the contact normal, pointing from `A` towards `B`.
//! 3. [`contact_points`] clips the facing edges of both shapes against each other to find
//!    up to two contact points.
//!
//! [`collide`] runs all three. Numerical trouble in any stage, such as running out of
//! iterations or a degenerate polytope, is reported as "no collision" for that step.

mod clipping;
mod epa;
mod gjk;

pub use clipping::{CONTACT_MERGE_THRESHOLD, contact_points};
pub use epa::{EPA_MAX_ITERATIONS, EPA_TOLERANCE, Penetration, epa};
pub use gjk::{GJK_MAX_ITERATIONS, GJK_TOLERANCE, GjkResult, Simplex, gjk};

use crate::{data_structures::ArrayVec, prelude::*};

/// A point on the boundary of the Minkowski difference `A - B`,
/// together with the points of each shape it was built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportPoint {
    /// `a - b`.
    pub point: Vector,
    /// The support point of shape `A` in the search direction.
    pub a: Vector,
    /// The support point of shape `B` in the opposite direction.
    pub b: Vector,
}

/// Computes the support point of the Minkowski difference `A - B` in `direction`.
#[inline]
pub fn cso_support(shape_a: &WorldShape, shape_b: &WorldShape, direction: Vector) -> SupportPoint {
    let a = shape_a.support(direction);
    let b = shape_b.support(-direction);
    SupportPoint { point: a - b, a, b }
}

/// A world-space contact point and the penetration depth at that point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactPoint {
    pub point: Vector,
    pub depth: Scalar,
}

/// The result of a successful narrow phase test.
#[derive(Clone, Debug, PartialEq)]
pub struct Collision {
    /// The unit contact normal, pointing from the first body towards the second.
    pub normal: Vector,
    /// The penetration depth along the normal.
    pub depth: Scalar,
    /// One or two contact points.
    pub points: ArrayVec<ContactPoint, 2>,
    /// `true` if the shapes were swapped to keep the normal pointing down,
    /// so that the first body of the collision is the second input shape.
    pub swapped: bool,
}

/// The direction contact normals are canonicalized towards.
pub const CANONICAL_DOWN: Vector = Vector::NEG_Y;

/// Tests two shapes for overlap and computes the contact data.
///
/// Returns `None` if the shapes do not overlap or if the result is numerically degenerate.
pub fn collide(shape_a: &WorldShape, shape_b: &WorldShape) -> Option<Collision> {
    let result = gjk(shape_a, shape_b);
    if !result.collide {
        return None;
    }

    let penetration = epa(shape_a, shape_b, &result.simplex)?;

    // Keep the normal polarity stable regardless of the query order.
    let (first, second, normal, swapped) = if penetration.normal.dot(CANONICAL_DOWN) < 0.0 {
        (shape_b, shape_a, -penetration.normal, true)
    } else {
        (shape_a, shape_b, penetration.normal, false)
    };

    let points = contact_points(first, second, normal, penetration.depth)?;

    Some(Collision {
        normal,
        depth: penetration.depth,
        points,
        swapped,
    })
}

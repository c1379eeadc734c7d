use bevy::log::trace;

use super::{Simplex, SupportPoint, cso_support};
use crate::prelude::*;

/// The maximum number of polytope expansions.
pub const EPA_MAX_ITERATIONS: usize = 64;

/// How close a new support point must be to the closest edge for the search to stop.
pub const EPA_TOLERANCE: Scalar = 1e-4;

const DEGENERACY_EPSILON: Scalar = 1e-9;

/// The penetration of two overlapping shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penetration {
    /// The penetration depth.
    pub depth: Scalar,
    /// The unit contact normal, pointing from `A` towards `B`.
    ///
    /// Moving `B` by `normal * depth` separates the shapes.
    pub normal: Vector,
}

#[derive(Clone, Copy, Debug)]
struct ClosestEdge {
    /// Index of the first vertex of the edge in the polytope.
    index: usize,
    normal: Vector,
    distance: Scalar,
}

/// Runs the Expanding Polytope Algorithm on the simplex of an overlapping [`gjk`](super::gjk) result.
///
/// Simplices with fewer than three points are first grown into a triangle.
/// Returns `None` if no triangle with a nonzero area can be built, which happens for
/// shapes that only touch. Exhausting [`EPA_MAX_ITERATIONS`] returns the best estimate so far.
pub fn epa(shape_a: &WorldShape, shape_b: &WorldShape, simplex: &Simplex) -> Option<Penetration> {
    let mut polytope = seed_polytope(shape_a, shape_b, simplex)?;
    debug_assert!(polytope.len() >= 3, "EPA polytope must start as a triangle");

    // Keep the polytope counterclockwise.
    if cross(
        polytope[1].point - polytope[0].point,
        polytope[2].point - polytope[0].point,
    ) < 0.0
    {
        polytope.swap(1, 2);
    }

    let mut edge = closest_edge(&polytope)?;
    for _ in 0..EPA_MAX_ITERATIONS {
        let support = cso_support(shape_a, shape_b, edge.normal);
        if support.point.dot(edge.normal) - edge.distance < EPA_TOLERANCE {
            return Some(Penetration {
                depth: edge.distance,
                normal: edge.normal,
            });
        }
        polytope.insert(edge.index + 1, support);
        edge = closest_edge(&polytope)?;
    }

    trace!("EPA did not converge in {EPA_MAX_ITERATIONS} iterations");
    Some(Penetration {
        depth: edge.distance,
        normal: edge.normal,
    })
}

/// Builds a triangle from the GJK simplex, querying extra support points if needed.
fn seed_polytope(
    shape_a: &WorldShape,
    shape_b: &WorldShape,
    simplex: &Simplex,
) -> Option<Vec<SupportPoint>> {
    let mut polytope: Vec<SupportPoint> = simplex.iter().copied().collect();

    if polytope.len() == 1 {
        let first = polytope[0].point;
        let candidate = [Vector::X, Vector::NEG_X]
            .into_iter()
            .map(|direction| cso_support(shape_a, shape_b, direction))
            .find(|support| support.point.distance_squared(first) > DEGENERACY_EPSILON)?;
        polytope.push(candidate);
    }

    if polytope.len() == 2 {
        let (p0, p1) = (polytope[0].point, polytope[1].point);
        let edge_normal = (p1 - p0).perp().normalize_or_zero();
        if edge_normal == Vector::ZERO {
            return None;
        }
        let candidate = [edge_normal, -edge_normal]
            .into_iter()
            .map(|direction| cso_support(shape_a, shape_b, direction))
            .find(|support| cross(p1 - p0, support.point - p0).abs() > DEGENERACY_EPSILON)?;
        polytope.push(candidate);
    }

    (polytope.len() >= 3).then_some(polytope)
}

/// Finds the polytope edge closest to the origin, with its outward normal.
fn closest_edge(polytope: &[SupportPoint]) -> Option<ClosestEdge> {
    let mut best: Option<ClosestEdge> = None;

    for (index, start) in polytope.iter().enumerate() {
        let end = polytope[(index + 1) % polytope.len()];
        let edge = end.point - start.point;

        // Outward normal of a counterclockwise loop.
        let mut normal = Vector::new(edge.y, -edge.x).normalize_or_zero();
        if normal == Vector::ZERO {
            continue;
        }
        let mut distance = normal.dot(start.point);
        if distance < 0.0 {
            normal = -normal;
            distance = -distance;
        }

        if best.is_none_or(|best| distance < best.distance) {
            best = Some(ClosestEdge {
                index,
                normal,
                distance,
            });
        }
    }

    best
}

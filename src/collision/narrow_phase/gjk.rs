use bevy::log::trace;

use super::{SupportPoint, cso_support};
use crate::{data_structures::ArrayVec, prelude::*};

/// The maximum number of GJK iterations before giving up.
pub const GJK_MAX_ITERATIONS: usize = 30;

/// Distance from the origin under which the simplex is considered to contain it.
pub const GJK_TOLERANCE: Scalar = 1e-6;

/// The GJK simplex: up to three points of the Minkowski difference.
pub type Simplex = ArrayVec<SupportPoint, 3>;

/// The outcome of [`gjk`].
#[derive(Clone, Debug, PartialEq)]
pub struct GjkResult {
    /// `true` if the shapes overlap.
    pub collide: bool,
    /// The simplex the search ended with.
    ///
    /// When the shapes overlap, this encloses or touches the origin and seeds [`epa`](super::epa).
    pub simplex: Simplex,
}

/// Runs the GJK distance algorithm on the Minkowski difference of two shapes.
///
/// Exhausting [`GJK_MAX_ITERATIONS`] is reported as no collision.
pub fn gjk(shape_a: &WorldShape, shape_b: &WorldShape) -> GjkResult {
    let mut simplex = Simplex::new();
    simplex.push(cso_support(shape_a, shape_b, Vector::X));

    for _ in 0..GJK_MAX_ITERATIONS {
        let closest = reduce_to_closest(&mut simplex);

        if closest.length_squared() <= GJK_TOLERANCE * GJK_TOLERANCE {
            return GjkResult {
                collide: true,
                simplex,
            };
        }

        let direction = -closest;
        let support = cso_support(shape_a, shape_b, direction);

        let duplicate = simplex
            .iter()
            .any(|p| p.point.distance_squared(support.point) <= GJK_TOLERANCE * GJK_TOLERANCE);
        let progress = support.point.dot(direction) - closest.dot(direction);
        if duplicate || progress <= GJK_TOLERANCE {
            return GjkResult {
                collide: false,
                simplex,
            };
        }

        debug_assert!(simplex.len() < 3, "GJK simplex overflow");
        if simplex.try_push(support).is_err() {
            break;
        }
    }

    trace!("GJK did not converge in {GJK_MAX_ITERATIONS} iterations");
    GjkResult {
        collide: false,
        simplex,
    }
}

/// Finds the point of the simplex closest to the origin and drops the vertices
/// that do not contribute to it.
///
/// A triangle that contains the origin is kept whole and yields the origin.
fn reduce_to_closest(simplex: &mut Simplex) -> Vector {
    match simplex.len() {
        1 => simplex[0].point,
        2 => {
            let (closest, kept) = closest_on_segment(simplex[0], simplex[1]);
            *simplex = kept;
            closest
        }
        3 => {
            let [a, b, c] = [simplex[0], simplex[1], simplex[2]];
            let winding = cross(b.point - a.point, c.point - a.point);

            let mut best: Option<(Vector, Simplex)> = None;
            for (p, q, opposite) in [(a, b, c), (b, c, a), (c, a, b)] {
                let edge = q.point - p.point;
                let origin_side = cross(edge, -p.point);
                let opposite_side = cross(edge, opposite.point - p.point);
                // A degenerate triangle has no inside, so every edge is a candidate.
                let outside = winding.abs() <= Scalar::EPSILON || origin_side * opposite_side < 0.0;
                if !outside {
                    continue;
                }
                let (closest, kept) = closest_on_segment(p, q);
                let better = best
                    .as_ref()
                    .is_none_or(|(best_closest, _)| closest.length_squared() < best_closest.length_squared());
                if better {
                    best = Some((closest, kept));
                }
            }

            match best {
                Some((closest, kept)) => {
                    *simplex = kept;
                    closest
                }
                None => Vector::ZERO,
            }
        }
        _ => {
            debug_assert!(false, "GJK simplex must hold 1 to 3 points");
            simplex.first().map_or(Vector::ZERO, |p| p.point)
        }
    }
}

/// The point of segment `ab` closest to the origin, and the vertices it depends on.
fn closest_on_segment(a: SupportPoint, b: SupportPoint) -> (Vector, Simplex) {
    let ab = b.point - a.point;
    let length_squared = ab.length_squared();
    let mut kept = Simplex::new();

    if length_squared <= Scalar::EPSILON {
        kept.push(a);
        return (a.point, kept);
    }

    let t = -a.point.dot(ab) / length_squared;
    if t <= 0.0 {
        kept.push(a);
        (a.point, kept)
    } else if t >= 1.0 {
        kept.push(b);
        (b.point, kept)
    } else {
        kept.push(a);
        kept.push(b);
        (a.point + t * ab, kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: Scalar, y: Scalar) -> SupportPoint {
        let p = Vector::new(x, y);
        SupportPoint {
            point: p,
            a: p,
            b: Vector::ZERO,
        }
    }

    #[test]
    fn segment_region() {
        let mut simplex = Simplex::new();
        simplex.push(point(1.0, -1.0));
        simplex.push(point(1.0, 1.0));
        assert_eq!(reduce_to_closest(&mut simplex), Vector::new(1.0, 0.0));
        assert_eq!(simplex.len(), 2);

        let mut simplex = Simplex::new();
        simplex.push(point(1.0, 1.0));
        simplex.push(point(2.0, 3.0));
        assert_eq!(reduce_to_closest(&mut simplex), Vector::new(1.0, 1.0));
        assert_eq!(simplex.len(), 1);
    }

    #[test]
    fn triangle_regions() {
        let mut simplex = Simplex::new();
        simplex.push(point(-1.0, -1.0));
        simplex.push(point(1.0, -1.0));
        simplex.push(point(0.0, 1.0));
        assert_eq!(reduce_to_closest(&mut simplex), Vector::ZERO);
        assert_eq!(simplex.len(), 3);

        let mut simplex = Simplex::new();
        simplex.push(point(1.0, 1.0));
        simplex.push(point(3.0, 1.0));
        simplex.push(point(1.0, 3.0));
        assert_eq!(reduce_to_closest(&mut simplex), Vector::new(1.0, 1.0));
        assert_eq!(simplex.len(), 1);
    }
}

use super::ContactPoint;
use crate::{data_structures::ArrayVec, prelude::*};

/// Clipped contact pairs closer than this are merged into their midpoint.
pub const CONTACT_MERGE_THRESHOLD: Scalar = 0.005;

/// Generates up to two contact points for two overlapping shapes by clipping
/// their facing edges against each other.
///
/// `normal` points from `shape_a` towards `shape_b`. The edge most perpendicular to the
/// normal is the reference edge. The other, incident, edge is clipped against the side
/// planes of the reference edge, and only the clipped points behind the reference face
/// are kept.
///
/// A circle always yields a single contact on its own surface. Returns `None` if the
/// feature edges are degenerate in a way that leaves no contact point.
pub fn contact_points(
    shape_a: &WorldShape,
    shape_b: &WorldShape,
    normal: Vector,
    depth: Scalar,
) -> Option<ArrayVec<ContactPoint, 2>> {
    let edge_a = shape_a.feature_edge(normal);
    let edge_b = shape_b.feature_edge(-normal);

    let mut points = ArrayVec::new();

    // A circle's feature edge collapses to its support point. Clipping a unit edge tangent
    // to the circle at that point keeps only the point itself, so it is used directly.
    if edge_a.is_degenerate() || edge_b.is_degenerate() {
        let point = if edge_a.is_degenerate() {
            edge_a.max
        } else {
            edge_b.max
        };
        points.push(ContactPoint { point, depth });
        return Some(points);
    }

    let (reference, incident, flipped) =
        if edge_a.direction().dot(normal).abs() <= edge_b.direction().dot(normal).abs() {
            (edge_a, edge_b, false)
        } else {
            (edge_b, edge_a, true)
        };

    let reference_direction = reference.direction().normalize_or_zero();
    if reference_direction == Vector::ZERO {
        return None;
    }

    let offset1 = reference_direction.dot(reference.a);
    let clipped = clip(incident.a, incident.b, reference_direction, offset1)?;

    let offset2 = reference_direction.dot(reference.b);
    let clipped = clip(clipped[0], clipped[1], -reference_direction, -offset2)?;

    // The reference face normal points out of the reference shape, towards the incident one.
    let mut face_normal = reference_direction.perp();
    let outward = if flipped { -normal } else { normal };
    if face_normal.dot(outward) < 0.0 {
        face_normal = -face_normal;
    }
    let face_offset = face_normal.dot(reference.max);

    for point in clipped {
        let point_depth = face_offset - face_normal.dot(point);
        if point_depth >= 0.0 {
            points.push(ContactPoint {
                point,
                depth: point_depth,
            });
        }
    }

    if points.len() == 2 && points[0].point.distance(points[1].point) <= CONTACT_MERGE_THRESHOLD {
        let merged = ContactPoint {
            point: points[0].point.midpoint(points[1].point),
            depth: points[0].depth.max(points[1].depth),
        };
        points.clear();
        points.push(merged);
    }

    if points.is_empty() {
        // Rounding can push both points just outside the reference face.
        points.push(ContactPoint {
            point: incident.max,
            depth,
        });
    }

    Some(points)
}

/// Clips the segment `v1 → v2` to the half-plane `direction · p >= offset`.
fn clip(v1: Vector, v2: Vector, direction: Vector, offset: Scalar) -> Option<[Vector; 2]> {
    let d1 = direction.dot(v1) - offset;
    let d2 = direction.dot(v2) - offset;

    let mut clipped = ArrayVec::<Vector, 2>::new();
    if d1 >= 0.0 {
        clipped.push(v1);
    }
    if d2 >= 0.0 {
        clipped.push(v2);
    }
    if d1 * d2 < 0.0 {
        let t = d1 / (d1 - d2);
        let _ = clipped.try_push(v1 + t * (v2 - v1));
    }

    match clipped.as_slice() {
        [a, b] => Some([*a, *b]),
        // The segment only touches the plane.
        [a] => Some([*a, *a]),
        _ => None,
    }
}

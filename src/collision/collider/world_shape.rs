use super::{Collider, support_index};
use crate::prelude::*;

/// A [`Collider`] placed in the world by a [`BodyTransform`].
///
/// This is the view of a body used by the narrow phase.
#[derive(Clone, Copy, Debug)]
pub struct WorldShape<'a> {
    pub collider: &'a Collider,
    pub transform: &'a BodyTransform,
}

/// The edge of a shape that best faces a direction, used for clipping contacts.
///
/// `max` is the vertex farthest along the direction, and `a` → `b` is the adjacent edge
/// most perpendicular to it, in counterclockwise order. Circles produce a degenerate
/// edge with `a == b == max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureEdge {
    pub max: Vector,
    pub a: Vector,
    pub b: Vector,
}

impl FeatureEdge {
    /// The edge vector `b - a`.
    #[inline]
    pub fn direction(&self) -> Vector {
        self.b - self.a
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }
}

impl<'a> WorldShape<'a> {
    #[inline]
    pub fn new(collider: &'a Collider, transform: &'a BodyTransform) -> Self {
        Self {
            collider,
            transform,
        }
    }

    /// Returns the world-space point of the shape farthest along the world-space `direction`.
    #[inline]
    pub fn support(&self, direction: Vector) -> Vector {
        let local_direction = self.transform.inverse_rotate_vector(direction);
        self.transform
            .rigid_transform_point(self.collider.support_local(local_direction))
    }

    /// Returns the feature edge of the shape facing `direction`, in world space.
    pub fn feature_edge(&self, direction: Vector) -> FeatureEdge {
        let vertices = self.collider.vertices();
        if vertices.is_empty() {
            let point = self.support(direction);
            return FeatureEdge {
                max: point,
                a: point,
                b: point,
            };
        }

        let local_direction = self.transform.inverse_rotate_vector(direction);
        let count = vertices.len();
        let index = support_index(vertices, local_direction);

        let to_world = |i: usize| self.transform.rigid_transform_point(vertices[i]);
        let max = to_world(index);
        let previous = to_world((index + count - 1) % count);
        let next = to_world((index + 1) % count);

        let to_previous = (max - previous).normalize_or_zero();
        let to_next = (max - next).normalize_or_zero();

        if to_previous.dot(direction) <= to_next.dot(direction) {
            FeatureEdge {
                max,
                a: previous,
                b: max,
            }
        } else {
            FeatureEdge {
                max,
                a: max,
                b: next,
            }
        }
    }
}

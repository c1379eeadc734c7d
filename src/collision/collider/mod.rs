//! Convex collision shapes.
//!
//! A [`Collider`] is either a circle or a convex polygon. Polygon vertices are stored
//! in body-local space, wound counterclockwise, with the centroid at the local origin.
//! This means that the center of mass of a body always coincides with its position.

mod world_shape;

pub use world_shape::{FeatureEdge, WorldShape};

use crate::{PhysicsError, prelude::*};

/// Tolerance used when checking polygon convexity and degeneracy.
const POLYGON_EPSILON: Scalar = 1e-6;

/// A convex collision shape.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Collider {
    /// A circle centered on the local origin.
    Circle {
        /// The radius of the circle.
        radius: Scalar,
    },
    /// A convex polygon with counterclockwise vertices around the local origin.
    Polygon {
        /// The vertices, in counterclockwise order.
        vertices: Vec<Vector>,
    },
}

impl Collider {
    /// Creates a circle with the given `radius`.
    pub fn circle(radius: Scalar) -> Result<Self, PhysicsError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PhysicsError::InvalidDimension(radius));
        }
        Ok(Self::Circle { radius })
    }

    /// Creates an axis-aligned rectangle with the given full `width` and `height`.
    pub fn rectangle(width: Scalar, height: Scalar) -> Result<Self, PhysicsError> {
        for dimension in [width, height] {
            if !(dimension.is_finite() && dimension > 0.0) {
                return Err(PhysicsError::InvalidDimension(dimension));
            }
        }
        let half = Vector::new(width, height) * 0.5;
        Ok(Self::Polygon {
            vertices: vec![
                Vector::new(-half.x, -half.y),
                Vector::new(half.x, -half.y),
                Vector::new(half.x, half.y),
                Vector::new(-half.x, half.y),
            ],
        })
    }

    /// Creates a convex polygon from a vertex loop.
    ///
    /// The loop may be wound in either direction. It is reordered counterclockwise
    /// and translated so that its centroid lies on the local origin.
    ///
    /// # Errors
    ///
    /// Fails if there are fewer than three vertices, if the vertices enclose no area,
    /// or if the loop is not convex.
    pub fn polygon(vertices: impl Into<Vec<Vector>>) -> Result<Self, PhysicsError> {
        let mut vertices: Vec<Vector> = vertices.into();
        if vertices.len() < 3 {
            return Err(PhysicsError::TooFewVertices(vertices.len()));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(PhysicsError::DegeneratePolygon);
        }

        let signed_area = signed_area(&vertices);
        if signed_area.abs() <= POLYGON_EPSILON {
            return Err(PhysicsError::DegeneratePolygon);
        }
        if signed_area < 0.0 {
            vertices.reverse();
        }

        let count = vertices.len();
        for i in 0..count {
            let a = vertices[i];
            let b = vertices[(i + 1) % count];
            let c = vertices[(i + 2) % count];
            if cross(b - a, c - b) < -POLYGON_EPSILON {
                return Err(PhysicsError::NonConvexPolygon);
            }
        }

        let centroid = centroid(&vertices);
        vertices.iter_mut().for_each(|v| *v -= centroid);

        Ok(Self::Polygon { vertices })
    }

    /// Returns the polygon vertices, or an empty slice for a circle.
    pub fn vertices(&self) -> &[Vector] {
        match self {
            Self::Circle { .. } => &[],
            Self::Polygon { vertices } => vertices,
        }
    }

    /// Returns `true` if the shape is a circle.
    pub fn is_circle(&self) -> bool {
        matches!(self, Self::Circle { .. })
    }

    /// Computes the area of the shape.
    pub fn area(&self) -> Scalar {
        match self {
            Self::Circle { radius } => PI * radius * radius,
            Self::Polygon { vertices } => signed_area(vertices),
        }
    }

    /// Computes the angular inertia about the local origin for a body of the given `mass`.
    pub fn angular_inertia(&self, mass: Scalar) -> Scalar {
        match self {
            Self::Circle { radius } => 0.5 * mass * radius * radius,
            Self::Polygon { vertices } => {
                let mut numerator = 0.0;
                let mut denominator = 0.0;
                for (i, &a) in vertices.iter().enumerate() {
                    let b = vertices[(i + 1) % vertices.len()];
                    let c = cross(a, b).abs();
                    numerator += c * (a.dot(a) + a.dot(b) + b.dot(b));
                    denominator += c;
                }
                if denominator <= 0.0 {
                    return 0.0;
                }
                mass * numerator / (6.0 * denominator)
            }
        }
    }

    /// Returns a copy of the shape scaled per axis.
    ///
    /// Circles stay circular and use the largest absolute scale component.
    pub fn scaled(&self, scale: Vector) -> Self {
        match self {
            Self::Circle { radius } => Self::Circle {
                radius: radius * scale.abs().max_element(),
            },
            Self::Polygon { vertices } => {
                let mut vertices: Vec<Vector> = vertices.iter().map(|v| *v * scale).collect();
                // A mirroring scale flips the winding.
                if scale.x * scale.y < 0.0 {
                    vertices.reverse();
                }
                Self::Polygon { vertices }
            }
        }
    }

    /// Returns the point of the shape farthest along `direction`, in local space.
    pub fn support_local(&self, direction: Vector) -> Vector {
        match self {
            Self::Circle { radius } => direction.normalize_or_zero() * *radius,
            Self::Polygon { vertices } => vertices[support_index(vertices, direction)],
        }
    }

    /// Computes the tight bounding box of the shape placed at `transform`.
    ///
    /// The scale of `transform` is ignored, as colliders carry their scale in their geometry.
    pub fn aabb(&self, transform: &BodyTransform) -> Aabb {
        match self {
            Self::Circle { radius } => Aabb::new(transform.translation, Vector::splat(*radius)),
            Self::Polygon { vertices } => Aabb::from_points(
                vertices
                    .iter()
                    .map(|v| transform.rigid_transform_point(*v)),
            )
            .unwrap_or(Aabb::new(transform.translation, Vector::ZERO)),
        }
    }

    /// Checks whether the world-space `point` lies inside the shape placed at `transform`.
    pub fn contains_point(&self, transform: &BodyTransform, point: Vector) -> bool {
        let local = transform.rigid_inverse_transform_point(point);
        match self {
            Self::Circle { radius } => local.length_squared() <= radius * radius,
            Self::Polygon { vertices } => vertices.iter().enumerate().all(|(i, &a)| {
                let b = vertices[(i + 1) % vertices.len()];
                cross(b - a, local - a) >= 0.0
            }),
        }
    }
}

/// Index of the vertex farthest along `direction`.
pub(crate) fn support_index(vertices: &[Vector], direction: Vector) -> usize {
    let mut best = 0;
    let mut best_dot = Scalar::NEG_INFINITY;
    for (i, v) in vertices.iter().enumerate() {
        let dot = v.dot(direction);
        if dot > best_dot {
            best = i;
            best_dot = dot;
        }
    }
    best
}

fn signed_area(vertices: &[Vector]) -> Scalar {
    0.5 * vertices
        .iter()
        .enumerate()
        .map(|(i, &a)| cross(a, vertices[(i + 1) % vertices.len()]))
        .sum::<Scalar>()
}

fn centroid(vertices: &[Vector]) -> Vector {
    // Triangle fan around the first vertex keeps the sums small for far-off polygons.
    let origin = vertices[0];
    let mut weighted = Vector::ZERO;
    let mut area = 0.0;
    for i in 1..vertices.len() - 1 {
        let a = vertices[i] - origin;
        let b = vertices[i + 1] - origin;
        let triangle_area = 0.5 * cross(a, b);
        weighted += triangle_area * (a + b) / 3.0;
        area += triangle_area;
    }
    origin + weighted / area
}

use crate::prelude::*;

/// An axis-aligned bounding box.
///
/// The [area](Aabb::area) is the cost metric of the [`AabbTree`](super::broad_phase::AabbTree).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// The minimum point of the AABB.
    pub min: Vector,
    /// The maximum point of the AABB.
    pub max: Vector,
}

impl Aabb {
    /// Creates a new [`Aabb`] from the given `center` and `half_size`.
    pub fn new(center: Vector, half_size: Vector) -> Self {
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Creates a new [`Aabb`] from its minimum and maximum points.
    pub fn from_min_max(min: Vector, max: Vector) -> Self {
        Self { min, max }
    }

    /// Creates the tightest [`Aabb`] containing every point.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vector>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::from_min_max(first, first), |aabb, p| Self {
            min: aabb.min.min(p),
            max: aabb.max.max(p),
        }))
    }

    /// Computes the center of the AABB.
    #[inline(always)]
    pub fn center(self) -> Vector {
        self.min.midpoint(self.max)
    }

    /// Computes the size of the AABB.
    #[inline(always)]
    pub fn size(self) -> Vector {
        self.max - self.min
    }

    /// Computes the area of the AABB, `width * height`.
    #[inline(always)]
    pub fn area(self) -> Scalar {
        let size = self.size();
        size.x * size.y
    }

    /// Merges this AABB with another one.
    #[inline(always)]
    pub fn merged(self, other: Self) -> Self {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Increases the size of the bounding volume in each direction by the given amount.
    #[inline(always)]
    pub fn grow(&self, amount: Scalar) -> Self {
        let b = Self {
            min: self.min - Vector::splat(amount),
            max: self.max + Vector::splat(amount),
        };
        debug_assert!(b.min.cmple(b.max).all());
        b
    }

    /// Checks if `self` intersects with `other`. Touching boxes intersect.
    #[inline(always)]
    pub fn intersects(&self, other: &Self) -> bool {
        let x_overlaps = self.min.x <= other.max.x && self.max.x >= other.min.x;
        let y_overlaps = self.min.y <= other.max.y && self.max.y >= other.min.y;
        x_overlaps && y_overlaps
    }

    /// Checks if `other` lies entirely inside `self`.
    #[inline(always)]
    pub fn contains(&self, other: &Self) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Checks if the point lies inside or on the boundary of `self`.
    #[inline(always)]
    pub fn contains_point(&self, point: Vector) -> bool {
        self.min.cmple(point).all() && self.max.cmpge(point).all()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb {
            min: Vector::INFINITY,
            max: Vector::NEG_INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_and_area() {
        let a = Aabb::from_min_max(Vector::ZERO, Vector::ONE);
        let b = Aabb::from_min_max(Vector::new(2.0, 0.0), Vector::new(3.0, 2.0));
        let merged = a.merged(b);
        assert_eq!(merged, Aabb::from_min_max(Vector::ZERO, Vector::new(3.0, 2.0)));
        assert_eq!(merged.area(), 6.0);
        assert!(merged.contains(&a) && merged.contains(&b));
        assert!(!a.intersects(&b));
        assert!(a.grow(0.5).intersects(&b.grow(0.5)));
    }

    #[test]
    fn from_points() {
        let aabb = Aabb::from_points([
            Vector::new(1.0, -1.0),
            Vector::new(-2.0, 0.5),
            Vector::new(0.0, 3.0),
        ]);
        assert_eq!(
            aabb,
            Some(Aabb::from_min_max(Vector::new(-2.0, -1.0), Vector::new(1.0, 3.0)))
        );
        assert_eq!(Aabb::from_points([]), None);
    }
}

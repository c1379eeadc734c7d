use super::{Matrix3, Scalar, Vector, inverse_rotate, rotate};

/// The placement of a body in the world: a translation, a rotation in radians
/// and a per-axis scale applied to its collider.
///
/// Points are mapped from body-local space to world space by scaling first,
/// then rotating, then translating.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyTransform {
    pub translation: Vector,
    pub rotation: Scalar,
    pub scale: Vector,
}

impl Default for BodyTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BodyTransform {
    pub const IDENTITY: Self = Self {
        translation: Vector::ZERO,
        rotation: 0.0,
        scale: Vector::ONE,
    };

    #[inline]
    pub fn from_translation(translation: Vector) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    pub fn with_rotation(mut self, rotation: Scalar) -> Self {
        self.rotation = rotation;
        self
    }

    #[inline]
    pub fn with_scale(mut self, scale: Vector) -> Self {
        self.scale = scale;
        self
    }

    /// The affine matrix mapping body-local points to world space.
    #[inline]
    pub fn local_to_global(&self) -> Matrix3 {
        Matrix3::from_scale_angle_translation(self.scale, self.rotation, self.translation)
    }

    /// The affine matrix mapping world-space points to body-local space.
    ///
    /// This is the inverse of [`BodyTransform::local_to_global`].
    #[inline]
    pub fn global_to_local(&self) -> Matrix3 {
        self.local_to_global().inverse()
    }

    /// Maps a point that is already scaled into world space.
    ///
    /// Colliders bake the scale into their geometry, so most callers want this
    /// rather than [`BodyTransform::transform_point`].
    #[inline]
    pub fn rigid_transform_point(&self, point: Vector) -> Vector {
        self.translation + rotate(point, self.rotation)
    }

    /// Inverse of [`BodyTransform::rigid_transform_point`].
    #[inline]
    pub fn rigid_inverse_transform_point(&self, point: Vector) -> Vector {
        inverse_rotate(point - self.translation, self.rotation)
    }

    /// Maps a body-local point, including scale, into world space.
    #[inline]
    pub fn transform_point(&self, point: Vector) -> Vector {
        self.rigid_transform_point(point * self.scale)
    }

    /// Maps a world-space point, including scale, into body-local space.
    #[inline]
    pub fn inverse_transform_point(&self, point: Vector) -> Vector {
        self.rigid_inverse_transform_point(point) / self.scale
    }

    #[inline]
    pub fn rotate_vector(&self, vector: Vector) -> Vector {
        rotate(vector, self.rotation)
    }

    #[inline]
    pub fn inverse_rotate_vector(&self, vector: Vector) -> Vector {
        inverse_rotate(vector, self.rotation)
    }
}

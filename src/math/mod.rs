//! Math types and traits used by the crate.
//!
//! The simulation is 2D and uses `f32` precision. Vectors and matrices are the
//! glam types re-exported by [`bevy::math`].

mod transform;

pub use transform::BodyTransform;

use bevy::math::*;

/// The scalar type used throughout the simulation.
pub type Scalar = f32;

/// A 2D vector.
pub type Vector = Vec2;

/// A 3D vector. Used for the 3x3 systems solved by some joints.
pub type Vector3 = Vec3;

/// A 2x2 matrix.
pub type Matrix2 = Mat2;

/// A 3x3 matrix. Also used for affine 2D transforms.
pub type Matrix3 = Mat3;

/// The active dimension.
pub const DIM: usize = 2;

pub const PI: Scalar = core::f32::consts::PI;

pub const TAU: Scalar = core::f32::consts::TAU;

/// The 2D cross product of two vectors, `a.x * b.y - a.y * b.x`.
#[inline]
pub fn cross(a: Vector, b: Vector) -> Scalar {
    a.perp_dot(b)
}

/// The cross product of a scalar angular quantity and a vector, `w × r`.
#[inline]
pub fn cross_scalar_vector(w: Scalar, r: Vector) -> Vector {
    w * r.perp()
}

/// Rotates `v` counterclockwise by `angle` radians.
#[inline]
pub fn rotate(v: Vector, angle: Scalar) -> Vector {
    Vector::from_angle(angle).rotate(v)
}

/// Rotates `v` clockwise by `angle` radians, undoing [`rotate`].
#[inline]
pub fn inverse_rotate(v: Vector, angle: Scalar) -> Vector {
    Vector::from_angle(-angle).rotate(v)
}

/// An extension trait for computing reciprocals without division by zero.
pub trait RecipOrZero {
    /// Computes the reciprocal of `self` if `self` is finite and not zero,
    /// and returns zero otherwise.
    ///
    /// Infinite masses map to a zero inverse mass.
    fn recip_or_zero(self) -> Self;
}

impl RecipOrZero for f32 {
    #[inline]
    fn recip_or_zero(self) -> Self {
        if self != 0.0 && self.is_finite() {
            self.recip()
        } else {
            0.0
        }
    }
}

impl RecipOrZero for Vec2 {
    #[inline]
    fn recip_or_zero(self) -> Self {
        Self::new(self.x.recip_or_zero(), self.y.recip_or_zero())
    }
}

/// Inverts a 2x2 matrix, returning the zero matrix if it is singular.
#[inline]
pub fn inverse_or_zero2(m: Matrix2) -> Matrix2 {
    let det = m.determinant();
    if det.abs() <= Scalar::EPSILON {
        Matrix2::ZERO
    } else {
        m.inverse()
    }
}

/// Inverts a 3x3 matrix, returning the zero matrix if it is singular.
#[inline]
pub fn inverse_or_zero3(m: Matrix3) -> Matrix3 {
    let det = m.determinant();
    if det.abs() <= Scalar::EPSILON {
        Matrix3::ZERO
    } else {
        m.inverse()
    }
}

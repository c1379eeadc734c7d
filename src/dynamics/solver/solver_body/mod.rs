//! Compact rigid body state used by the constraint solver.
//!
//! Each island copies the bodies it touches into a contiguous list of [`SolverBody`]s,
//! solves its constraints against that list, and writes the velocities back.

use crate::prelude::*;

/// Rigid body state that the solver operates on.
///
/// Static and sleeping bodies get zero inverse mass and inertia, so impulses never move them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolverBody {
    /// The world-space center of mass.
    pub position: Vector,
    /// The rotation in radians.
    pub rotation: Scalar,
    pub linear_velocity: Vector,
    pub angular_velocity: Scalar,
    pub inv_mass: Scalar,
    pub inv_inertia: Scalar,
}

impl SolverBody {
    /// A dummy [`SolverBody`] that cannot move, used as the second body of single-body joints.
    pub const DUMMY: Self = Self {
        position: Vector::ZERO,
        rotation: 0.0,
        linear_velocity: Vector::ZERO,
        angular_velocity: 0.0,
        inv_mass: 0.0,
        inv_inertia: 0.0,
    };

    /// Creates a solver body from the current state of a rigid body.
    pub fn from_body(body: &RigidBody) -> Self {
        let movable = body.is_dynamic() && !body.is_sleeping();
        Self {
            position: body.position(),
            rotation: body.rotation(),
            linear_velocity: body.linear_velocity(),
            angular_velocity: body.angular_velocity(),
            inv_mass: if movable { body.inverse_mass() } else { 0.0 },
            inv_inertia: if movable { body.inverse_inertia() } else { 0.0 },
        }
    }

    /// Computes the velocity at the given `point` relative to the center of the body.
    #[inline]
    pub fn velocity_at_point(&self, point: Vector) -> Vector {
        self.linear_velocity + self.angular_velocity * point.perp()
    }

    /// Applies an impulse at the point `r` relative to the center of the body.
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vector, r: Vector) {
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * cross(r, impulse);
    }

    /// Applies an angular impulse.
    #[inline]
    pub fn apply_angular_impulse(&mut self, impulse: Scalar) {
        self.angular_velocity += self.inv_inertia * impulse;
    }

    /// Returns `true` if impulses can move the body.
    #[inline]
    pub fn is_movable(&self) -> bool {
        self.inv_mass > 0.0 || self.inv_inertia > 0.0
    }
}

/// Borrows two distinct solver bodies mutably.
#[inline]
pub(crate) fn pair_mut(
    bodies: &mut [SolverBody],
    index1: usize,
    index2: usize,
) -> (&mut SolverBody, &mut SolverBody) {
    debug_assert_ne!(index1, index2, "a constraint cannot act on one body twice");
    if index1 < index2 {
        let (left, right) = bodies.split_at_mut(index2);
        (&mut left[index1], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(index1);
        (&mut right[0], &mut left[index2])
    }
}

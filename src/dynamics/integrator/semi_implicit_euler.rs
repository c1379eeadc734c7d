//! The *semi-implicit* or *symplectic* Euler [integration](super) scheme.
//!
//! Semi-implicit Euler integration evaluates the acceleration at
//! the current timestep and the velocity at the next timestep:
//!
//! ```text
//! v = v_0 + a * Δt (linear velocity)
//! ω = ω_0 + α * Δt (angular velocity)
//! ```
//!
//! and computes the new position with the new velocity:
//!
//! ```text
//! x = x_0 + v * Δt (position)
//! θ = θ_0 + ω * Δt (rotation)
//! ```
//!
//! Using the new velocity instead of the old one keeps bodies from gaining energy over time.

use crate::prelude::*;

/// Integrates velocity based on the given forces in order to find
/// the linear and angular velocity after `delta_secs` have passed.
pub fn integrate_velocity(
    lin_vel: &mut Vector,
    ang_vel: &mut Scalar,
    force: Vector,
    torque: Scalar,
    inverse_mass: Scalar,
    inverse_inertia: Scalar,
    gravity: Vector,
    delta_secs: Scalar,
) {
    // v = v_0 + a * Δt
    *lin_vel += linear_acceleration(force, inverse_mass, gravity) * delta_secs;

    // ω = ω_0 + α * Δt
    *ang_vel += angular_acceleration(torque, inverse_inertia) * delta_secs;
}

/// Integrates position and rotation based on the given velocities in order to
/// find the position and rotation after `delta_secs` have passed.
pub fn integrate_position(
    pos: &mut Vector,
    rot: &mut Scalar,
    lin_vel: Vector,
    ang_vel: Scalar,
    delta_secs: Scalar,
) {
    // x = x_0 + v * Δt
    *pos += lin_vel * delta_secs;

    // θ = θ_0 + ω * Δt
    *rot += ang_vel * delta_secs;
}

/// Computes linear acceleration based on the given force and inverse mass.
///
/// `gravity` is an acceleration, so it is not scaled by the mass.
#[inline]
pub fn linear_acceleration(force: Vector, inverse_mass: Scalar, gravity: Vector) -> Vector {
    // a = F / m + g
    force * inverse_mass + gravity
}

/// Computes angular acceleration based on the given torque and inverse angular inertia.
#[inline]
pub fn angular_acceleration(torque: Scalar, inverse_inertia: Scalar) -> Scalar {
    // α = τ / I
    torque * inverse_inertia
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn semi_implicit_euler() {
        let mut position = Vector::ZERO;
        let mut rotation = 0.0;

        let mut linear_velocity = Vector::new(1.0, 2.0);
        let mut angular_velocity = 2.0;

        let inverse_mass = 1.0;
        let inverse_inertia = 1.0;

        let gravity = Vector::new(0.0, -9.81);

        // Step by 100 steps of 0.1 seconds
        for _ in 0..100 {
            integrate_velocity(
                &mut linear_velocity,
                &mut angular_velocity,
                Vector::ZERO,
                0.0,
                inverse_mass,
                inverse_inertia,
                gravity,
                1.0 / 10.0,
            );
            integrate_position(
                &mut position,
                &mut rotation,
                linear_velocity,
                angular_velocity,
                1.0 / 10.0,
            );
        }

        // y = Σ (2 - 0.981 k) * 0.1 for k in 1..=100
        assert_relative_eq!(position, Vector::new(10.0, -475.405), epsilon = 0.05);
        assert_relative_eq!(linear_velocity, Vector::new(1.0, -96.1), epsilon = 0.01);
        assert_relative_eq!(rotation, 20.0, epsilon = 1e-3);
        assert_relative_eq!(angular_velocity, 2.0);
    }

    #[test]
    fn forces_scale_by_inverse_mass() {
        let mut linear_velocity = Vector::ZERO;
        let mut angular_velocity = 0.0;
        integrate_velocity(
            &mut linear_velocity,
            &mut angular_velocity,
            Vector::new(4.0, 0.0),
            3.0,
            0.5,
            0.25,
            Vector::ZERO,
            0.5,
        );
        assert_eq!(linear_velocity, Vector::new(1.0, 0.0));
        assert_eq!(angular_velocity, 0.375);
    }
}

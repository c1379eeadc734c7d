//! Applies forces and velocities to bodies in order to move them according to the equations of motion
//! using numerical integration.
//!
//! Only the [semi-implicit (symplectic) Euler](semi_implicit_euler) scheme is supported. It is the
//! standard for game physics, being simple, efficient, and sufficiently accurate.
//!
//! Velocity integration is a prediction: the [solver](crate::dynamics::solver) corrects the
//! predicted velocities to take contacts and joints into account before positions are integrated.

#[doc(alias = "symplectic_euler")]
pub mod semi_implicit_euler;

use crate::prelude::*;

/// Applies gravity and the accumulated force and torque to the velocity of an awake dynamic body.
pub(crate) fn integrate_body_velocity(body: &mut RigidBody, gravity: Vector, delta_secs: Scalar) {
    if !body.is_dynamic() || body.is_sleeping() {
        return;
    }

    let force = body.force();
    let torque = body.torque();
    let inverse_mass = body.inverse_mass();
    let inverse_inertia = body.inverse_inertia();

    semi_implicit_euler::integrate_velocity(
        &mut body.linear_velocity,
        &mut body.angular_velocity,
        force,
        torque,
        inverse_mass,
        inverse_inertia,
        gravity,
        delta_secs,
    );
}

/// Moves an awake dynamic body by its velocity and clears its force accumulators.
pub(crate) fn integrate_body_position(body: &mut RigidBody, delta_secs: Scalar) {
    if body.is_dynamic() && !body.is_sleeping() {
        let (linear_velocity, angular_velocity) = (body.linear_velocity, body.angular_velocity);
        semi_implicit_euler::integrate_position(
            &mut body.transform.translation,
            &mut body.transform.rotation,
            linear_velocity,
            angular_velocity,
            delta_secs,
        );
    }
    body.clear_forces();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn static_and_sleeping_bodies_do_not_move() {
        let gravity = Vector::new(0.0, -10.0);

        let mut ground = RigidBody::rectangle(4.0, 1.0).unwrap().into_static();
        integrate_body_velocity(&mut ground, gravity, 0.1);
        integrate_body_position(&mut ground, 0.1);
        assert_eq!(ground.position(), Vector::ZERO);

        let mut sleeper = RigidBody::circle(0.5).unwrap();
        sleeper.put_to_sleep();
        integrate_body_velocity(&mut sleeper, gravity, 0.1);
        assert_eq!(sleeper.linear_velocity(), Vector::ZERO);

        let mut ball = RigidBody::circle(0.5).unwrap();
        ball.apply_force(Vector::new(ball.mass(), 0.0));
        integrate_body_velocity(&mut ball, gravity, 0.1);
        integrate_body_position(&mut ball, 0.1);
        assert_relative_eq!(ball.linear_velocity().x, 0.1, epsilon = 1e-6);
        assert_relative_eq!(ball.linear_velocity().y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(ball.position().y, -0.1, epsilon = 1e-6);
        assert_eq!(ball.force(), Vector::ZERO);
    }
}

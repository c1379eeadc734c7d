//! Constraints and other types used for solving contacts.

mod normal_part;
mod tangent_part;

pub use normal_part::{ContactNormalPart, NormalImpulse, normal_bias};
pub use tangent_part::{ContactTangentPart, TangentImpulse};

use crate::{PhysicsConfig, collision::contact_types::ContactManifold, prelude::*};

/// Data and logic for solving a single contact point of a [`ContactManifold`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactConstraintPoint {
    /// The world-space contact point.
    pub point: Vector,

    /// The penetration depth at the contact point.
    pub depth: Scalar,

    /// The contact point relative to the center of mass of the first body.
    pub anchor1: Vector,

    /// The contact point relative to the center of mass of the second body.
    pub anchor2: Vector,

    /// The normal part of the contact constraint.
    #[cfg_attr(feature = "serialize", serde(skip))]
    pub normal_part: ContactNormalPart,

    /// The tangential friction part of the contact constraint.
    #[cfg_attr(feature = "serialize", serde(skip))]
    pub tangent_part: ContactTangentPart,
}

impl ContactConstraintPoint {
    /// Creates a contact point with no accumulated impulse.
    pub fn new(point: Vector, depth: Scalar) -> Self {
        Self {
            point,
            depth,
            ..Default::default()
        }
    }
}

impl ContactManifold {
    /// Computes anchors, effective masses and biases for every point, and applies the
    /// warm-start impulses when warm starting is enabled.
    pub fn prepare(
        &mut self,
        body1: &mut SolverBody,
        body2: &mut SolverBody,
        delta_secs: Scalar,
        config: &PhysicsConfig,
    ) {
        let inv_mass_sum = body1.inv_mass + body2.inv_mass;
        let normal = self.normal;
        let tangent = self.tangent;

        for point in self.points.iter_mut() {
            let r1 = point.point - body1.position;
            let r2 = point.point - body2.position;
            point.anchor1 = r1;
            point.anchor2 = r2;

            let relative_velocity = body2.velocity_at_point(r2) - body1.velocity_at_point(r1);
            let closing_speed = relative_velocity.dot(normal);
            let bias = normal_bias(
                point.depth,
                closing_speed,
                self.restitution,
                delta_secs,
                config,
            );

            point.normal_part.prepare(
                inv_mass_sum,
                body1.inv_inertia,
                body2.inv_inertia,
                r1,
                r2,
                normal,
                bias,
            );
            point.tangent_part.prepare(
                inv_mass_sum,
                body1.inv_inertia,
                body2.inv_inertia,
                r1,
                r2,
                tangent,
            );

            if config.warm_starting {
                let p = point.normal_part.impulse * normal + point.tangent_part.impulse * tangent;
                body1.apply_impulse(-p, r1);
                body2.apply_impulse(p, r2);
            } else {
                point.normal_part.impulse = 0.0;
                point.tangent_part.impulse = 0.0;
            }
        }
    }

    /// Runs one velocity iteration.
    ///
    /// Each point solves its normal part and then its friction part, so the friction
    /// bound uses the normal impulse that was just updated.
    pub fn solve(&mut self, body1: &mut SolverBody, body2: &mut SolverBody, config: &PhysicsConfig) {
        let accumulate = config.accumulate_impulses;

        for point in self.points.iter_mut() {
            let r1 = point.anchor1;
            let r2 = point.anchor2;

            let relative_velocity = body2.velocity_at_point(r2) - body1.velocity_at_point(r1);
            let impulse_magnitude =
                point
                    .normal_part
                    .solve_impulse(relative_velocity, self.normal, accumulate);

            if impulse_magnitude != 0.0 {
                let impulse = impulse_magnitude * self.normal;
                body1.apply_impulse(-impulse, r1);
                body2.apply_impulse(impulse, r2);
            }

            // Friction
            let relative_velocity = body2.velocity_at_point(r2) - body1.velocity_at_point(r1);
            let impulse_magnitude = point.tangent_part.solve_impulse(
                relative_velocity,
                self.tangent,
                self.friction,
                point.normal_part.impulse,
                accumulate,
            );

            let impulse = impulse_magnitude * self.tangent;
            body1.apply_impulse(-impulse, r1);
            body2.apply_impulse(impulse, r2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::narrow_phase::{Collision, ContactPoint};
    use approx::assert_relative_eq;

    fn manifold(normal: Vector, depth: Scalar, points: &[Vector]) -> ContactManifold {
        let collision = Collision {
            normal,
            depth,
            points: points
                .iter()
                .map(|&point| ContactPoint { point, depth })
                .collect(),
            swapped: false,
        };
        ContactManifold::new(BodyId(0), BodyId(1), &collision, 0.0, 1.0)
    }

    fn dynamic(position: Vector, velocity: Vector) -> SolverBody {
        SolverBody {
            position,
            linear_velocity: velocity,
            inv_mass: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn elastic_head_on_collision_swaps_velocities() {
        let config = PhysicsConfig {
            position_correction: false,
            warm_starting: false,
            ..Default::default()
        };
        let mut manifold = manifold(Vector::X, 0.0, &[Vector::ZERO]);
        let mut body1 = dynamic(Vector::new(-1.0, 0.0), Vector::new(2.0, 0.0));
        let mut body2 = dynamic(Vector::new(1.0, 0.0), Vector::new(-2.0, 0.0));

        manifold.prepare(&mut body1, &mut body2, 1.0 / 60.0, &config);
        for _ in 0..config.solver_iterations {
            manifold.solve(&mut body1, &mut body2, &config);
        }

        assert_relative_eq!(body1.linear_velocity.x, -2.0, epsilon = 1e-5);
        assert_relative_eq!(body2.linear_velocity.x, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn resting_contact_against_static_body() {
        let config = PhysicsConfig::default();
        // The ground is the first body, the box sits on it.
        let mut manifold = manifold(
            Vector::Y,
            0.001,
            &[Vector::new(-0.5, 0.0), Vector::new(0.5, 0.0)],
        );
        manifold.restitution = 0.0;
        let mut ground = SolverBody::DUMMY;
        let mut body = SolverBody {
            position: Vector::new(0.0, 0.5),
            linear_velocity: Vector::new(0.0, -0.1),
            inv_mass: 1.0,
            inv_inertia: 6.0,
            ..Default::default()
        };

        manifold.prepare(&mut ground, &mut body, 1.0 / 60.0, &config);
        for _ in 0..config.solver_iterations {
            manifold.solve(&mut ground, &mut body, &config);
        }

        assert_relative_eq!(body.linear_velocity.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(body.angular_velocity, 0.0, epsilon = 1e-4);
        assert_eq!(ground, SolverBody::DUMMY);
        assert!(manifold.total_normal_impulse() > 0.0);
    }

    #[test]
    fn friction_stops_sliding() {
        let config = PhysicsConfig {
            position_correction: false,
            ..Default::default()
        };
        let mut manifold = manifold(Vector::Y, 0.0, &[Vector::ZERO]);
        manifold.friction = 1.0;
        manifold.restitution = 0.0;
        let mut ground = SolverBody::DUMMY;
        // Moving sideways and into the ground.
        let mut body = dynamic(Vector::new(0.0, 0.5), Vector::new(0.5, -1.0));

        manifold.prepare(&mut ground, &mut body, 1.0 / 60.0, &config);
        for _ in 0..config.solver_iterations {
            manifold.solve(&mut ground, &mut body, &config);
        }

        // The normal impulse of 1 allows a friction impulse of up to 1, enough to stop.
        assert_relative_eq!(body.linear_velocity.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(body.linear_velocity.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn friction_follows_each_normal_in_the_same_pass() {
        let config = PhysicsConfig {
            position_correction: false,
            warm_starting: false,
            ..Default::default()
        };
        let mut manifold = manifold(
            Vector::Y,
            0.0,
            &[Vector::new(-0.5, 0.0), Vector::new(0.5, 0.0)],
        );
        manifold.friction = 1.0;
        manifold.restitution = 0.0;
        let mut ground = SolverBody::DUMMY;
        let mut body = SolverBody {
            position: Vector::new(0.0, 0.5),
            linear_velocity: Vector::new(2.0, -1.0),
            inv_mass: 1.0,
            inv_inertia: 1.0,
            ..Default::default()
        };

        manifold.prepare(&mut ground, &mut body, 1.0 / 60.0, &config);
        manifold.solve(&mut ground, &mut body, &config);

        // The friction of the first point spins the body, which deepens the second
        // point's approach before its normal is solved.
        assert_relative_eq!(manifold.points[0].normal_part.impulse, 0.8, epsilon = 1e-5);
        assert_relative_eq!(manifold.points[0].tangent_part.impulse, 0.8, epsilon = 1e-5);
        assert_relative_eq!(manifold.points[1].normal_part.impulse, 0.48, epsilon = 1e-5);
        assert_relative_eq!(manifold.points[1].tangent_part.impulse, 0.48, epsilon = 1e-5);

        assert_relative_eq!(body.linear_velocity.x, 0.72, epsilon = 1e-5);
        assert_relative_eq!(body.linear_velocity.y, 0.28, epsilon = 1e-5);
        assert_relative_eq!(body.angular_velocity, -0.8, epsilon = 1e-5);
    }
}

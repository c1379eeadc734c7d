use crate::prelude::*;

pub type TangentImpulse = Scalar;

/// The tangential friction part of a [`ContactConstraintPoint`](super::ContactConstraintPoint).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactTangentPart {
    /// The contact impulse magnitude along the contact tangent.
    ///
    /// This corresponds to the magnitude of the friction impulse.
    pub impulse: TangentImpulse,

    /// The inertial properties of the bodies projected onto the contact tangent,
    /// or in other words, the mass "seen" by the constraint along the tangent.
    pub effective_mass: Scalar,
}

impl ContactTangentPart {
    /// Computes the effective mass along the tangent, keeping the current impulse.
    pub fn prepare(
        &mut self,
        inverse_mass_sum: Scalar,
        inverse_inertia1: Scalar,
        inverse_inertia2: Scalar,
        r1: Vector,
        r2: Vector,
        tangent: Vector,
    ) {
        let rt1 = cross(r1, tangent);
        let rt2 = cross(r2, tangent);
        let k = inverse_mass_sum + inverse_inertia1 * rt1 * rt1 + inverse_inertia2 * rt2 * rt2;
        self.effective_mass = k.recip_or_zero();
    }

    /// Solves the friction constraint, updating the total impulse in `self` and returning
    /// the incremental impulse to apply to each body.
    ///
    /// By the Coulomb friction law, the friction impulse is bounded by
    /// `friction * normal_impulse` in either direction.
    pub fn solve_impulse(
        &mut self,
        relative_velocity: Vector,
        tangent: Vector,
        friction: Scalar,
        normal_impulse: Scalar,
        accumulate: bool,
    ) -> Scalar {
        let impulse_limit = friction * normal_impulse;

        // Compute the relative velocity along the tangent.
        let tangent_speed = relative_velocity.dot(tangent);
        let mut impulse = self.effective_mass * (-tangent_speed);

        if accumulate {
            let new_impulse = (self.impulse + impulse).clamp(-impulse_limit, impulse_limit);
            impulse = new_impulse - self.impulse;
            self.impulse = new_impulse;
        } else {
            impulse = impulse.clamp(-impulse_limit, impulse_limit);
            self.impulse += impulse;
        }

        impulse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friction_is_bounded_by_normal_impulse() {
        let mut part = ContactTangentPart::default();
        part.prepare(1.0, 0.0, 0.0, Vector::ZERO, Vector::ZERO, Vector::X);

        let impulse = part.solve_impulse(Vector::new(10.0, 0.0), Vector::X, 0.5, 2.0, true);
        assert_eq!(impulse, -1.0);

        let impulse = part.solve_impulse(Vector::new(0.5, 0.0), Vector::X, 0.5, 2.0, true);
        assert_eq!(impulse, 0.0);
        assert_eq!(part.impulse, -1.0);

        // A smaller normal impulse shrinks the bound.
        let impulse = part.solve_impulse(Vector::ZERO, Vector::X, 0.5, 1.0, true);
        assert_eq!(impulse, 0.5);
        assert_eq!(part.impulse, -0.5);
    }
}

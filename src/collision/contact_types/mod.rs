//! Contact types produced by the narrow phase and consumed by the solver.

use crate::{
    collision::narrow_phase::Collision,
    data_structures::{ArrayVec, pair_key::PairKey},
    dynamics::solver::contact::ContactConstraintPoint,
    prelude::*,
};

/// A contact surface between two bodies, with one or two contact points sharing a normal.
///
/// Manifolds are rebuilt every step. Only the accumulated impulses of their points
/// carry over, through [`ContactManifold::try_warm_start`].
#[derive(Clone, Debug, PartialEq)]
pub struct ContactManifold {
    /// The first body in the contact.
    pub body_a: BodyId,
    /// The second body in the contact.
    pub body_b: BodyId,
    /// The unit contact normal, pointing from `body_a` towards `body_b`.
    pub normal: Vector,
    /// The unit contact tangent, perpendicular to the normal.
    pub tangent: Vector,
    /// The deepest penetration depth of the manifold.
    pub depth: Scalar,
    /// The contact points and their constraint state.
    pub points: ArrayVec<ContactConstraintPoint, 2>,
    /// The combined friction coefficient of the bodies.
    pub friction: Scalar,
    /// The combined restitution coefficient of the bodies.
    pub restitution: Scalar,
    /// `true` if the manifold was warm started from the previous step's manifold.
    pub persistent: bool,
}

impl ContactManifold {
    /// Creates a manifold from a narrow phase [`Collision`] between `body_a` and `body_b`.
    ///
    /// The bodies must already be in the order of the collision, so that the normal
    /// points from `body_a` towards `body_b`.
    pub fn new(
        body_a: BodyId,
        body_b: BodyId,
        collision: &Collision,
        friction: Scalar,
        restitution: Scalar,
    ) -> Self {
        Self {
            body_a,
            body_b,
            normal: collision.normal,
            tangent: collision.normal.perp(),
            depth: collision.depth,
            points: collision
                .points
                .iter()
                .map(|contact| ContactConstraintPoint::new(contact.point, contact.depth))
                .collect(),
            friction,
            restitution,
            persistent: false,
        }
    }

    /// The order-independent key of the body pair.
    #[inline]
    pub fn key(&self) -> PairKey {
        PairKey::new(self.body_a, self.body_b)
    }

    /// Returns the world-space contact points.
    pub fn contact_points(&self) -> impl Iterator<Item = Vector> + '_ {
        self.points.iter().map(|point| point.point)
    }

    /// The total normal impulse applied in the last solve.
    pub fn total_normal_impulse(&self) -> Scalar {
        self.points.iter().map(|p| p.normal_part.impulse).sum()
    }

    /// Copies accumulated impulses from the previous step's manifold of the same pair.
    ///
    /// Each point takes the impulses of the first old point within a squared distance
    /// of `threshold`. If any point matches, the manifold is marked persistent.
    pub fn try_warm_start(&mut self, previous: &ContactManifold, threshold: Scalar) {
        for point in self.points.iter_mut() {
            let matched = previous
                .points
                .iter()
                .find(|old| old.point.distance_squared(point.point) < threshold);

            if let Some(old) = matched {
                point.normal_part.impulse = old.normal_part.impulse;
                point.tangent_part.impulse = old.tangent_part.impulse;
                self.persistent = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::narrow_phase::ContactPoint;

    fn manifold(points: &[Vector]) -> ContactManifold {
        let collision = Collision {
            normal: Vector::NEG_Y,
            depth: 0.01,
            points: points
                .iter()
                .map(|&point| ContactPoint { point, depth: 0.01 })
                .collect(),
            swapped: false,
        };
        ContactManifold::new(BodyId(0), BodyId(1), &collision, 0.5, 0.0)
    }

    #[test]
    fn tangent_is_perpendicular() {
        let manifold = manifold(&[Vector::ZERO]);
        assert_eq!(manifold.normal.dot(manifold.tangent), 0.0);
        assert_eq!(manifold.key(), PairKey::new(BodyId(1), BodyId(0)));
    }

    #[test]
    fn warm_start_matches_nearby_points() {
        let mut old = manifold(&[Vector::new(-0.5, 0.0), Vector::new(0.5, 0.0)]);
        old.points[0].normal_part.impulse = 2.0;
        old.points[0].tangent_part.impulse = -0.3;
        old.points[1].normal_part.impulse = 4.0;

        let mut new = manifold(&[Vector::new(-0.49, 0.0), Vector::new(3.0, 0.0)]);
        new.try_warm_start(&old, 0.0025);

        assert!(new.persistent);
        assert_eq!(new.points[0].normal_part.impulse, 2.0);
        assert_eq!(new.points[0].tangent_part.impulse, -0.3);
        assert_eq!(new.points[1].normal_part.impulse, 0.0);

        let mut far = manifold(&[Vector::new(10.0, 0.0)]);
        far.try_warm_start(&old, 0.0025);
        assert!(!far.persistent);
    }
}

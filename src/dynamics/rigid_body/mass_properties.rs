//! Mass and angular inertia of rigid bodies.

use crate::prelude::*;

/// The mass, angular inertia and their cached inverses.
///
/// The inverses are always the reciprocals of the values, except for infinite
/// values, whose inverse is exactly zero. Static bodies use [`MassProperties::INFINITE`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MassProperties {
    mass: Scalar,
    inverse_mass: Scalar,
    inertia: Scalar,
    inverse_inertia: Scalar,
}

impl MassProperties {
    /// Infinite mass and inertia, used for static bodies.
    pub const INFINITE: Self = Self {
        mass: Scalar::INFINITY,
        inverse_mass: 0.0,
        inertia: Scalar::INFINITY,
        inverse_inertia: 0.0,
    };

    /// Creates mass properties from a mass and an angular inertia.
    pub fn new(mass: Scalar, inertia: Scalar) -> Self {
        Self {
            mass,
            inverse_mass: mass.recip_or_zero(),
            inertia,
            inverse_inertia: inertia.recip_or_zero(),
        }
    }

    /// Computes the mass properties of a collider with a uniform `density`:
    /// `mass = density * area`, with the angular inertia from the shape's closed-form formula.
    pub fn from_collider(collider: &Collider, density: Scalar) -> Self {
        let mass = density * collider.area();
        Self::new(mass, collider.angular_inertia(mass))
    }

    #[inline]
    pub fn mass(&self) -> Scalar {
        self.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> Scalar {
        self.inverse_mass
    }

    #[inline]
    pub fn inertia(&self) -> Scalar {
        self.inertia
    }

    #[inline]
    pub fn inverse_inertia(&self) -> Scalar {
        self.inverse_inertia
    }

    /// Returns a copy with the mass replaced, keeping the inverse consistent.
    pub fn with_mass(self, mass: Scalar) -> Self {
        Self::new(mass, self.inertia)
    }

    /// Returns a copy with the angular inertia replaced, keeping the inverse consistent.
    pub fn with_inertia(self, inertia: Scalar) -> Self {
        Self::new(self.mass, inertia)
    }
}

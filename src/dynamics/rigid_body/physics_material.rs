use crate::prelude::*;

/// The friction coefficient of new bodies.
pub const DEFAULT_FRICTION: Scalar = 0.5;

/// The restitution coefficient of new bodies.
pub const DEFAULT_RESTITUTION: Scalar = 0.0;

/// Determines how the friction or restitution coefficients of two bodies are combined
/// for a contact between them.
///
/// The rule is chosen globally in [`PhysicsConfig`](crate::PhysicsConfig), separately
/// for friction and restitution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum CoefficientCombine {
    /// Coefficients are combined by computing their average `(a + b) / 2.0`.
    #[default]
    Average = 1,
    /// Coefficients are combined by computing their geometric mean `sqrt(a * b)`.
    GeometricMean = 2,
    /// Coefficients are combined by choosing the smaller coefficient `min(a, b)`.
    Min = 3,
    /// Coefficients are combined by computing their product `a * b`.
    Multiply = 4,
    /// Coefficients are combined by choosing the larger coefficient `max(a, b)`.
    Max = 5,
}

impl CoefficientCombine {
    /// Combines two coefficients according to the combine rule.
    pub fn mix(&self, a: Scalar, b: Scalar) -> Scalar {
        match self {
            CoefficientCombine::Average => (a + b) * 0.5,
            CoefficientCombine::GeometricMean => (a * b).sqrt(),
            CoefficientCombine::Min => a.min(b),
            CoefficientCombine::Multiply => a * b,
            CoefficientCombine::Max => a.max(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn combine_rules() {
        assert_relative_eq!(CoefficientCombine::Average.mix(0.2, 0.6), 0.4);
        assert_relative_eq!(CoefficientCombine::GeometricMean.mix(0.25, 1.0), 0.5);
        assert_relative_eq!(CoefficientCombine::Min.mix(0.2, 0.6), 0.2);
        assert_relative_eq!(CoefficientCombine::Multiply.mix(0.5, 0.6), 0.3);
        assert_relative_eq!(CoefficientCombine::Max.mix(0.2, 0.6), 0.6);
    }
}

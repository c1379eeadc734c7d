use crate::{dynamics::solver::softness_parameters::SoftnessCoefficients, prelude::*};

/// A 2-DOF constraint that keeps two anchor points together.
///
/// Shared by the revolute, grab and motor joints.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PointConstraintPart {
    /// The anchor on the first body, in its local frame.
    pub local_anchor1: Vector,
    /// The anchor on the second body, in its local frame.
    pub local_anchor2: Vector,
    /// The world-space offset of the first anchor from the first body's center.
    pub r1: Vector,
    /// The world-space offset of the second anchor from the second body's center.
    pub r2: Vector,
    /// The accumulated impulse, applied positively to the second body.
    pub impulse: Vector,
    effective_mass: Matrix2,
    bias: Vector,
    gamma: Scalar,
}

impl PointConstraintPart {
    pub fn new(local_anchor1: Vector, local_anchor2: Vector) -> Self {
        Self {
            local_anchor1,
            local_anchor2,
            ..Default::default()
        }
    }

    /// The world-space separation of the anchors, `(p2 + r2) - (p1 + r1)`.
    #[inline]
    pub fn position_error(&self, body1: &SolverBody, body2: &SolverBody) -> Vector {
        (body2.position + self.r2) - (body1.position + self.r1)
    }

    #[inline]
    pub fn velocity_error(&self, body1: &SolverBody, body2: &SolverBody) -> Vector {
        body2.velocity_at_point(self.r2) - body1.velocity_at_point(self.r1)
    }

    /// Computes the inverse effective mass matrix for the constraint.
    #[inline]
    pub fn effective_inverse_mass(
        &self,
        inverse_mass_sum: Scalar,
        inverse_inertia1: Scalar,
        inverse_inertia2: Scalar,
    ) -> Matrix2 {
        let k00 = inverse_mass_sum
            + self.r1.y.powi(2) * inverse_inertia1
            + self.r2.y.powi(2) * inverse_inertia2;
        let k10 = -self.r1.y * self.r1.x * inverse_inertia1 - self.r2.y * self.r2.x * inverse_inertia2;
        let k11 = inverse_mass_sum
            + self.r1.x.powi(2) * inverse_inertia1
            + self.r2.x.powi(2) * inverse_inertia2;
        Matrix2::from_cols_array(&[k00, k10, k10, k11])
    }

    /// Updates the anchors, effective mass and bias, and warm starts the bodies.
    pub fn prepare(
        &mut self,
        body1: &mut SolverBody,
        body2: &mut SolverBody,
        delta_secs: Scalar,
        softness: SoftnessCoefficients,
        warm_start: bool,
    ) {
        self.r1 = rotate(self.local_anchor1, body1.rotation);
        self.r2 = rotate(self.local_anchor2, body2.rotation);

        let mut k = self.effective_inverse_mass(
            body1.inv_mass + body2.inv_mass,
            body1.inv_inertia,
            body2.inv_inertia,
        );
        k.x_axis.x += softness.gamma;
        k.y_axis.y += softness.gamma;

        self.effective_mass = inverse_or_zero2(k);
        self.bias = softness.beta / delta_secs * self.position_error(body1, body2);
        self.gamma = softness.gamma;

        if warm_start {
            self.apply_impulse(body1, body2, self.impulse);
        } else {
            self.impulse = Vector::ZERO;
        }
    }

    /// Solves the constraint and returns the incremental impulse that was applied.
    ///
    /// `max_impulse` bounds the length of the accumulated impulse.
    pub fn solve(
        &mut self,
        body1: &mut SolverBody,
        body2: &mut SolverBody,
        max_impulse: Option<Scalar>,
    ) -> Vector {
        let velocity_error = self.velocity_error(body1, body2);
        let mut impulse =
            -(self.effective_mass * (velocity_error + self.bias + self.gamma * self.impulse));

        if let Some(max_impulse) = max_impulse {
            let old_impulse = self.impulse;
            self.impulse = (self.impulse + impulse).clamp_length_max(max_impulse);
            impulse = self.impulse - old_impulse;
        } else {
            self.impulse += impulse;
        }

        self.apply_impulse(body1, body2, impulse);
        impulse
    }

    #[inline]
    pub fn apply_impulse(&self, body1: &mut SolverBody, body2: &mut SolverBody, impulse: Vector) {
        body1.apply_impulse(-impulse, self.r1);
        body2.apply_impulse(impulse, self.r2);
    }
}

//! The sequential impulse solver for contacts and joints.
//!
//! Each island is solved on its own: constraints are [prepared](contact) once per step, which
//! also applies the impulses accumulated in the previous step (warm starting), and then solved
//! for a fixed number of velocity iterations. Position drift is corrected with a Baumgarte
//! velocity bias, or with [soft constraint](softness_parameters) coefficients for soft joints.

pub mod contact;
pub mod islands;
pub mod joints;
pub mod softness_parameters;
pub mod solver_body;

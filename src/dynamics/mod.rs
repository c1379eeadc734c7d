//! Rigid body dynamics: bodies, integration, and the constraint solver for contacts and joints.

pub mod integrator;
pub mod rigid_body;
pub mod solver;

pub use rigid_body::*;

//! Specialized data structures used by the simulation.

pub mod pair_key;

pub use arrayvec::ArrayVec;

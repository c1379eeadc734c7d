//! Collision detection for [`Collider`]s.
//!
//! Collision detection runs in two phases every step:
//!
//! - The [broad phase](broad_phase) keeps every body's bounding box in a dynamic
//!   [`AabbTree`] and enumerates the pairs of bodies whose boxes overlap.
//! - The [narrow phase](narrow_phase) tests each candidate pair exactly with GJK and EPA,
//!   and clips the shapes' facing edges to find contact points.
//!
//! Each touching pair produces a [`ContactManifold`] that the
//! [solver](crate::dynamics::solver) turns into contact constraints.

pub mod aabb;
pub mod broad_phase;
pub mod collider;
pub mod contact_types;
pub mod narrow_phase;

pub use aabb::Aabb;
pub use broad_phase::{AabbTree, NodeId};
pub use collider::{Collider, FeatureEdge, WorldShape};
pub use contact_types::ContactManifold;
pub use narrow_phase::{Collision, ContactPoint, collide};

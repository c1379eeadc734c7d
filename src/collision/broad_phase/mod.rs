//! Finds pairs of bodies with overlapping [AABBs](crate::collision::Aabb) to reduce the number of
//! exact tests run by the [narrow phase](super::narrow_phase).
//!
//! The broad phase is backed by a dynamic [`AabbTree`]. Dynamic bodies are stored with
//! a margin around their AABB, so a leaf only moves in the tree once its body leaves
//! the enlarged box.

mod aabb_tree;

pub use aabb_tree::{AabbTree, NodeId};

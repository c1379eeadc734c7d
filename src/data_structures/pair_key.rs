//! A unique key for an unordered pair of bodies.

use bevy::prelude::*;

use crate::dynamics::rigid_body::BodyId;

/// A unique key for an unordered pair of bodies.
///
/// `PairKey::new(a, b)` and `PairKey::new(b, a)` are equal, so the key can be used
/// to store and look up per-pair data such as contact manifolds regardless of
/// the order in which the pair was found.
#[derive(Clone, Copy, Debug, Deref, DerefMut, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PairKey(pub u64);

impl PairKey {
    /// Creates a new pair key from two body IDs.
    #[inline]
    pub const fn new(id1: BodyId, id2: BodyId) -> Self {
        let (id1, id2) = (id1.0, id2.0);
        if id1 < id2 {
            Self(((id1 as u64) << 32) | id2 as u64)
        } else {
            Self(((id2 as u64) << 32) | id1 as u64)
        }
    }

    /// Gets the two body IDs stored in the pair key in ascending order.
    #[inline]
    pub fn get(&self) -> (BodyId, BodyId) {
        (
            BodyId(((self.0 >> 32) & 0xFFFF_FFFF) as u32),
            BodyId((self.0 & 0xFFFF_FFFF) as u32),
        )
    }
}

//! # impulse2d
//!
//! **impulse2d** is a 2D rigid body physics core. It advances a set of convex bodies through
//! time under gravity, contacts and joints, and integrates with the [Bevy game engine](https://bevyengine.org/)
//! through the [`PhysicsPlugin`].
//!
//! The simulation has three main parts:
//!
//! - A [broad phase](collision::broad_phase) that keeps the enlarged bounding boxes of all bodies
//!   in a dynamic [AABB tree](collision::AabbTree) and reports overlapping pairs.
//! - A [narrow phase](collision::narrow_phase) that finds the penetration depth, normal and
//!   contact points of each pair with GJK, EPA and polygon clipping.
//! - A [solver](dynamics::solver) that resolves contacts and [joints](dynamics::solver::joints)
//!   with warm-started sequential impulses, island by island, and puts resting islands to sleep.
//!
//! ## Getting started
//!
//! ```
//! use impulse2d::prelude::*;
//!
//! let mut world = PhysicsWorld::default();
//!
//! // A static floor and a falling box.
//! world.register_body(RigidBody::rectangle(10.0, 1.0).unwrap().into_static());
//! let falling = world.register_body(
//!     RigidBody::rectangle(1.0, 1.0)
//!         .unwrap()
//!         .with_position(Vector::new(0.0, 3.0))
//!         .with_rotation(0.3),
//! );
//!
//! for _ in 0..60 {
//!     world.update();
//! }
//!
//! assert!(world.body(falling).unwrap().position().y < 3.0);
//! ```
//!
//! In a Bevy app, add the [`PhysicsPlugin`] and access the world through the [`Physics`](plugin::Physics)
//! resource.
//!
//! ## Configuration
//!
//! All tunables live in [`PhysicsConfig`], owned by the world and read during each step.

pub mod collision;
pub mod config;
pub mod data_structures;
pub mod dynamics;
pub mod error;
pub mod math;
pub mod plugin;
pub mod world;

/// Re-exports common types.
pub mod prelude {
    pub use crate::{
        collision::{
            Aabb, AabbTree, Collider, Collision, ContactManifold, ContactPoint, FeatureEdge,
            NodeId, WorldShape, collide,
        },
        config::PhysicsConfig,
        data_structures::pair_key::PairKey,
        dynamics::{
            rigid_body::{
                BodyId, CoefficientCombine, MassProperties, RigidBody, RigidBodyType,
            },
            solver::{
                islands::{Island, IslandBuilder},
                joints::*,
                softness_parameters::{SoftnessCoefficients, SoftnessParameters},
                solver_body::SolverBody,
            },
        },
        error::PhysicsError,
        math::*,
        plugin::{Physics, PhysicsPaused, PhysicsPlugin, PhysicsSet},
        world::PhysicsWorld,
    };
}

pub use config::PhysicsConfig;
pub use error::PhysicsError;
pub use math::{Scalar, TAU};
pub use plugin::PhysicsPlugin;
pub use world::PhysicsWorld;

#[cfg(test)]
mod tests;

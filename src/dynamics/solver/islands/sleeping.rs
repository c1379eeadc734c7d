//! Sleeping and waking for [`Island`]s.
//!
//! A body is resting while its linear and angular speeds stay below the configured rest
//! tolerances. An island falls asleep once every body in it has been resting for
//! [`time_to_sleep`](crate::PhysicsConfig::time_to_sleep) seconds, and wakes up as soon
//! as any of its bodies moves or is touched by an awake body.

use slab::Slab;

use super::Island;
use crate::{
    PhysicsConfig,
    dynamics::solver::joints::{ImpulseJoint, Joint},
    prelude::*,
};

/// Returns `true` if the island should be asleep for this step.
pub(crate) fn wants_to_sleep(
    island: &Island,
    bodies: &Slab<RigidBody>,
    joints: &Slab<Joint>,
    config: &PhysicsConfig,
) -> bool {
    if !config.sleeping {
        return false;
    }

    let kept_awake = island.joints.iter().any(|id| {
        joints
            .get(id.index())
            .is_some_and(|joint| joint.kind.keeps_awake())
    });
    if kept_awake {
        return false;
    }

    island.bodies.iter().all(|id| {
        bodies
            .get(id.index())
            .is_some_and(|body| body.resting_time >= config.time_to_sleep)
    })
}

/// Advances the resting timers of the island's bodies after their velocities were solved.
pub(crate) fn update_resting_times(
    island: &Island,
    bodies: &mut Slab<RigidBody>,
    delta_secs: Scalar,
    config: &PhysicsConfig,
) {
    if !config.sleeping {
        return;
    }

    let linear_tolerance_squared = config.rest_linear_tolerance * config.rest_linear_tolerance;

    for id in &island.bodies {
        let Some(body) = bodies.get_mut(id.index()) else {
            continue;
        };
        if body.linear_velocity.length_squared() < linear_tolerance_squared
            && body.angular_velocity.abs() < config.rest_angular_tolerance
        {
            body.resting_time += delta_secs;
        } else {
            body.resting_time = 0.0;
        }
    }
}

//! Runs a [`PhysicsWorld`] inside a Bevy [`App`].
//!
//! See [`PhysicsPlugin`].

use bevy::{
    ecs::{intern::Interned, schedule::ScheduleLabel},
    prelude::*,
};

use crate::{PhysicsConfig, PhysicsError, PhysicsWorld};

/// Inserts a [`PhysicsWorld`] as the [`Physics`] resource and steps it once per run of
/// the given schedule.
///
/// The default schedule is `FixedUpdate`. Each run advances the world by
/// [`PhysicsConfig::delta_secs`], and the plugin sets the fixed timestep to match it.
///
/// Rendering and input are left to the application. They can read or modify bodies through
/// the [`Physics`] resource, and order themselves around [`PhysicsSet::StepSimulation`].
pub struct PhysicsPlugin {
    schedule: Interned<dyn ScheduleLabel>,
    config: PhysicsConfig,
}

impl PhysicsPlugin {
    /// Creates a [`PhysicsPlugin`] that steps the world in the given schedule.
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
            config: PhysicsConfig::default(),
        }
    }

    /// Uses the given configuration for the world if it is valid.
    pub fn with_config(mut self, config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }
}

impl Default for PhysicsPlugin {
    fn default() -> Self {
        Self::new(FixedUpdate)
    }
}

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        let mut world = PhysicsWorld::default();
        if let Err(error) = world.set_config(self.config.clone()) {
            warn!("{error}, using the default physics configuration");
        }

        app.insert_resource(Time::<Fixed>::from_seconds(
            world.config().delta_secs as f64,
        ))
        .insert_resource(Physics(world))
        .init_resource::<PhysicsPaused>()
        .configure_sets(self.schedule, PhysicsSet::StepSimulation)
        .add_systems(
            self.schedule,
            step_physics
                .in_set(PhysicsSet::StepSimulation)
                .run_if(|paused: Res<PhysicsPaused>| !paused.0),
        );
    }
}

/// The simulated world, stepped by the [`PhysicsPlugin`].
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct Physics(pub PhysicsWorld);

/// Stops the [`PhysicsPlugin`] from stepping the world while `true`.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct PhysicsPaused(pub bool);

/// System sets for scheduling systems around the simulation step.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    /// Advances the [`PhysicsWorld`] by one step.
    StepSimulation,
}

fn step_physics(mut physics: ResMut<Physics>) {
    physics.update();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    fn create_app() -> App {
        let mut app = App::new();
        app.add_plugins(PhysicsPlugin::default());
        app
    }

    #[test]
    fn steps_in_fixed_update() {
        let mut app = create_app();
        let body = app
            .world_mut()
            .resource_mut::<Physics>()
            .register_body(RigidBody::circle(0.5).unwrap());

        for _ in 0..10 {
            app.world_mut().run_schedule(FixedUpdate);
        }

        let physics = app.world().resource::<Physics>();
        assert!(physics.body(body).unwrap().linear_velocity().y < 0.0);
        assert!(physics.body(body).unwrap().position().y < 0.0);
    }

    #[test]
    fn paused_world_does_not_move() {
        let mut app = create_app();
        app.insert_resource(PhysicsPaused(true));
        let body = app
            .world_mut()
            .resource_mut::<Physics>()
            .register_body(RigidBody::circle(0.5).unwrap());

        app.world_mut().run_schedule(FixedUpdate);

        let physics = app.world().resource::<Physics>();
        assert_eq!(physics.body(body).unwrap().position(), Vector::ZERO);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = PhysicsConfig {
            solver_iterations: 4,
            delta_secs: 0.0,
            ..Default::default()
        };
        assert!(PhysicsPlugin::default().with_config(config).is_err());
    }
}

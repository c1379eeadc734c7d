//! The [`PhysicsWorld`] owns every body, joint and contact, and advances them in time.
//!
//! # Step
//!
//! Each call to [`PhysicsWorld::step`] runs the following stages in order:
//!
//! 1. Gravity and accumulated forces are integrated into the velocities of awake dynamic bodies.
//! 2. The [`AabbTree`] is refitted to the bodies that moved out of their enlarged boxes.
//! 3. The tree reports overlapping pairs. Pairs of static or sleeping bodies keep their previous
//!    manifold, pairs excluded by a joint are skipped, and every other pair goes through the
//!    [narrow phase](crate::collision::narrow_phase). New manifolds are warm started from the
//!    manifold of the same pair in the previous step.
//! 4. Bodies are partitioned into [`Island`]s by the [`IslandBuilder`].
//! 5. Each island either falls asleep or is solved by the sequential impulse solver.
//! 6. Positions are integrated, force accumulators are cleared, and bodies that fell below
//!    [`PhysicsConfig::dead_bottom`] are removed together with their joints.

use bevy::log::{debug, trace, warn};
use indexmap::IndexMap;
use slab::Slab;

use crate::{
    PhysicsConfig, PhysicsError,
    collision::narrow_phase::collide,
    data_structures::pair_key::PairKey,
    dynamics::{
        integrator::{integrate_body_position, integrate_body_velocity},
        solver::{
            islands::{Island, IslandBuilder},
            joints::{Joint, JointId},
        },
    },
    prelude::*,
};

/// A 2D rigid body simulation.
///
/// Bodies and joints are registered into the world and addressed by the returned
/// [`BodyId`]s and [`JointId`]s afterwards. Identifiers of removed objects may be reused.
///
/// ```
/// use impulse2d::prelude::*;
///
/// let mut world = PhysicsWorld::default();
/// world.register_body(RigidBody::rectangle(20.0, 1.0).unwrap().into_static());
/// let ball = world.register_body(
///     RigidBody::circle(0.5).unwrap().with_position(Vector::new(0.0, 5.0)),
/// );
///
/// for _ in 0..120 {
///     world.update();
/// }
///
/// // The ball has landed on the ground.
/// let y = world.body(ball).unwrap().position().y;
/// assert!(y > 0.9 && y < 1.1);
/// ```
#[derive(Debug, Default)]
pub struct PhysicsWorld {
    config: PhysicsConfig,
    bodies: Slab<RigidBody>,
    joints: Slab<Joint>,
    manifolds: IndexMap<PairKey, ContactManifold>,
    tree: AabbTree,
    islands: Vec<Island>,
    island_builder: IslandBuilder,
    /// Body pairs that never collide, with the number of joints asking for it.
    pass_pairs: IndexMap<PairKey, usize>,
}

impl PhysicsWorld {
    /// Creates an empty world with the given configuration.
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    #[inline]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Mutable access to the configuration. Values are not validated.
    #[inline]
    pub fn config_mut(&mut self) -> &mut PhysicsConfig {
        &mut self.config
    }

    /// Replaces the configuration if it is valid.
    pub fn set_config(&mut self, config: PhysicsConfig) -> Result<(), PhysicsError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Adds a body to the world and returns its identifier.
    pub fn register_body(&mut self, mut body: RigidBody) -> BodyId {
        let margin = self.margin(&body);
        let entry = self.bodies.vacant_entry();
        let id = BodyId(entry.key() as u32);

        body.id = id;
        body.manifold_keys.clear();
        body.joint_ids.clear();
        body.island_id = None;
        body.proxy = Some(self.tree.insert(id, body.aabb(), margin));

        debug!("registered {:?} body {id}", body.body_type());
        entry.insert(body);
        id
    }

    /// Adds a joint between registered bodies and returns its identifier.
    ///
    /// With `pass_test`, the bodies connected by the joint no longer collide with each other.
    pub fn register_joint(
        &mut self,
        joint: impl Into<Joint>,
        pass_test: bool,
    ) -> Result<JointId, PhysicsError> {
        let mut joint = joint.into();

        let (body1, body2) = (joint.body1(), joint.body2());
        for id in core::iter::once(body1).chain(body2) {
            if !self.bodies.contains(id.index()) {
                warn!("rejected joint: body {id} is not registered");
                return Err(PhysicsError::UnregisteredBody(id));
            }
        }
        if let Err(error) = self.validate_joint_bodies(body1, body2) {
            warn!("rejected joint: {error}");
            return Err(error);
        }

        let entry = self.joints.vacant_entry();
        let id = JointId(entry.key() as u32);
        joint.id = id;
        joint.pass_test = pass_test && body2.is_some();

        for body in core::iter::once(body1).chain(body2) {
            if let Some(body) = self.bodies.get_mut(body.index()) {
                body.joint_ids.insert(id);
                body.wake_up();
            }
        }
        if let (true, Some(body2)) = (joint.pass_test, body2) {
            *self.pass_pairs.entry(PairKey::new(body1, body2)).or_default() += 1;
        }

        debug!("registered joint {id} between {body1} and {body2:?}");
        entry.insert(joint);
        Ok(id)
    }

    /// Checks the body combination of a joint whose bodies are known to be registered.
    ///
    /// Joint body ids are public, so they may have changed since the joint was built.
    fn validate_joint_bodies(&self, body1: BodyId, body2: Option<BodyId>) -> Result<(), PhysicsError> {
        let is_static = |id: BodyId| self.bodies.get(id.index()).is_some_and(RigidBody::is_static);
        match body2 {
            Some(body2) if body2 == body1 => Err(PhysicsError::SameBody(body1)),
            Some(body2) if is_static(body1) && is_static(body2) => {
                Err(PhysicsError::StaticPair(body1, body2))
            }
            None if is_static(body1) => Err(PhysicsError::NonDynamicGrab(body1)),
            _ => Ok(()),
        }
    }

    /// Removes a body and everything attached to it: its joints, its contact manifolds
    /// and its broad phase proxy.
    pub fn unregister_body(&mut self, id: BodyId) -> Option<RigidBody> {
        if !self.bodies.contains(id.index()) {
            return None;
        }

        let joint_ids: Vec<JointId> = self.bodies[id.index()].joint_ids.iter().copied().collect();
        for joint_id in joint_ids {
            self.unregister_joint(joint_id);
        }

        let mut body = self.bodies.remove(id.index());

        for key in body.manifold_keys.drain(..) {
            if let Some(manifold) = self.manifolds.swap_remove(&key) {
                let other = if manifold.body_a == id {
                    manifold.body_b
                } else {
                    manifold.body_a
                };
                if let Some(other) = self.bodies.get_mut(other.index()) {
                    other.manifold_keys.swap_remove(&key);
                    other.wake_up();
                }
            }
        }

        if let Some(proxy) = body.proxy.take() {
            self.tree.remove(proxy);
        }
        for island in &mut self.islands {
            island.bodies.retain(|body| *body != id);
        }

        body.id = BodyId::PLACEHOLDER;
        body.island_id = None;

        debug!("unregistered body {id}");
        Some(body)
    }

    /// Removes a joint and detaches it from its bodies.
    pub fn unregister_joint(&mut self, id: JointId) -> Option<Joint> {
        if !self.joints.contains(id.index()) {
            return None;
        }
        let mut joint = self.joints.remove(id.index());
        let (body1, body2) = (joint.body1(), joint.body2());

        for body in core::iter::once(body1).chain(body2) {
            if let Some(body) = self.bodies.get_mut(body.index()) {
                body.joint_ids.swap_remove(&id);
                body.wake_up();
            }
        }

        if let (true, Some(body2)) = (joint.pass_test, body2) {
            let key = PairKey::new(body1, body2);
            if let Some(count) = self.pass_pairs.get_mut(&key) {
                *count -= 1;
                if *count == 0 {
                    self.pass_pairs.swap_remove(&key);
                }
            }
        }
        for island in &mut self.islands {
            island.joints.retain(|joint| *joint != id);
        }

        joint.id = JointId::PLACEHOLDER;
        debug!("unregistered joint {id}");
        Some(joint)
    }

    /// Advances the simulation by [`PhysicsConfig::delta_secs`].
    pub fn update(&mut self) {
        self.step(self.config.delta_secs);
    }

    /// Advances the simulation by `delta_secs`.
    pub fn step(&mut self, delta_secs: Scalar) {
        if !(delta_secs.is_finite() && delta_secs > 0.0) {
            trace!("skipped step with timestep {delta_secs}");
            return;
        }

        let gravity = self.config.scaled_gravity();
        for (_, body) in self.bodies.iter_mut() {
            integrate_body_velocity(body, gravity, delta_secs);
            body.manifold_keys.clear();
        }

        self.update_broad_phase();
        self.update_contacts();

        let mut islands =
            self.island_builder
                .build(&mut self.bodies, &self.manifolds, &self.joints);
        for island in &mut islands {
            island.solve(
                &mut self.bodies,
                &mut self.manifolds,
                &mut self.joints,
                delta_secs,
                &self.config,
            );
        }
        self.islands = islands;

        for (_, body) in self.bodies.iter_mut() {
            integrate_body_position(body, delta_secs);
        }

        self.remove_fallen_bodies();
    }

    fn margin(&self, body: &RigidBody) -> Scalar {
        if body.is_static() {
            0.0
        } else {
            self.config.aabb_margin
        }
    }

    /// Refits the tree leaves of bodies that left their enlarged boxes.
    fn update_broad_phase(&mut self) {
        let margin = self.config.aabb_margin;
        for (_, body) in self.bodies.iter() {
            let Some(proxy) = body.proxy else {
                continue;
            };
            if body.is_sleeping() {
                continue;
            }
            let margin = if body.is_static() { 0.0 } else { margin };
            self.tree.update(proxy, body.aabb(), margin);
        }
    }

    /// Rebuilds the contact manifolds from the broad phase pairs.
    fn update_contacts(&mut self) {
        let mut previous = core::mem::take(&mut self.manifolds);

        for (id1, id2) in self.tree.collision_pairs() {
            let key = PairKey::new(id1, id2);
            let (Some(body1), Some(body2)) = (self.bodies.get(id1.index()), self.bodies.get(id2.index()))
            else {
                continue;
            };
            if body1.is_static() && body2.is_static() {
                continue;
            }
            if self.pass_pairs.contains_key(&key) {
                continue;
            }

            let inactive = |body: &RigidBody| body.is_static() || body.is_sleeping();
            if inactive(body1) && inactive(body2) {
                // Resting contacts of sleeping bodies keep the island together.
                if let Some(manifold) = previous.swap_remove(&key) {
                    self.manifolds.insert(key, manifold);
                }
                continue;
            }

            let Some(collision) = collide(&body1.world_shape(), &body2.world_shape()) else {
                continue;
            };
            let (body_a, body_b) = if collision.swapped {
                (id2, id1)
            } else {
                (id1, id2)
            };

            let friction = self
                .config
                .friction_combine
                .mix(body1.friction(), body2.friction());
            let restitution = self
                .config
                .restitution_combine
                .mix(body1.restitution(), body2.restitution());

            let mut manifold = ContactManifold::new(body_a, body_b, &collision, friction, restitution);
            if self.config.warm_starting {
                if let Some(old) = previous.get(&key) {
                    manifold.try_warm_start(old, self.config.warm_starting_threshold);
                }
            }
            self.manifolds.insert(key, manifold);
        }

        for key in self.manifolds.keys() {
            let (id1, id2) = key.get();
            for id in [id1, id2] {
                if let Some(body) = self.bodies.get_mut(id.index()) {
                    body.manifold_keys.insert(*key);
                }
            }
        }
    }

    fn remove_fallen_bodies(&mut self) {
        let dead_bottom = self.config.dead_bottom;
        let fallen: Vec<BodyId> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_dynamic() && body.position().y < dead_bottom)
            .map(|(_, body)| body.id())
            .collect();

        for id in fallen {
            debug!("removing body {id} below the dead bottom at {dead_bottom}");
            self.unregister_body(id);
        }
    }

    #[inline]
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.index())
    }

    /// Mutable access to a body. Moved bodies are refitted in the broad phase on the next step.
    #[inline]
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id.index())
    }

    #[inline]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.index())
    }

    #[inline]
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.index())
    }

    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.iter().map(|(_, body)| body)
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut RigidBody> {
        self.bodies.iter_mut().map(|(_, body)| body)
    }

    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.iter().map(|(_, joint)| joint)
    }

    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// The contact manifolds found in the last step, keyed by body pair.
    #[inline]
    pub fn manifolds(&self) -> &IndexMap<PairKey, ContactManifold> {
        &self.manifolds
    }

    /// Returns the manifold between two bodies from the last step, if they touched.
    pub fn manifold(&self, body1: BodyId, body2: BodyId) -> Option<&ContactManifold> {
        self.manifolds.get(&PairKey::new(body1, body2))
    }

    /// The islands built in the last step.
    #[inline]
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// The broad phase tree.
    #[inline]
    pub fn aabb_tree(&self) -> &AabbTree {
        &self.tree
    }

    /// Returns the bodies containing the world-space `point`.
    pub fn query_point(&self, point: Vector) -> Vec<BodyId> {
        self.tree
            .query_point(point)
            .into_iter()
            .filter(|id| self.body(*id).is_some_and(|body| body.contains_point(point)))
            .collect()
    }

    /// Returns the bodies whose bounding box intersects `region`.
    pub fn query_region(&self, region: Aabb) -> Vec<BodyId> {
        self.tree
            .query_region(region)
            .into_iter()
            .filter(|id| self.body(*id).is_some_and(|body| body.aabb().intersects(&region)))
            .collect()
    }

    /// Body pairs excluded from collision by joints.
    pub fn pass_pairs(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.pass_pairs.keys().copied()
    }

    /// Removes every body and joint.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.joints.clear();
        self.manifolds.clear();
        self.tree.clear();
        self.islands.clear();
        self.pass_pairs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_joints_on_unregistered_bodies() {
        let mut world = PhysicsWorld::default();
        let a = world.register_body(RigidBody::circle(0.5).unwrap());
        let b = world.register_body(
            RigidBody::circle(0.5)
                .unwrap()
                .with_position(Vector::new(2.0, 0.0)),
        );
        let joint = DistanceJoint::new(
            world.body(a).unwrap(),
            world.body(b).unwrap(),
            Vector::ZERO,
            Vector::new(2.0, 0.0),
        )
        .unwrap();

        world.unregister_body(b);
        assert_eq!(
            world.register_joint(joint, false),
            Err(PhysicsError::UnregisteredBody(b))
        );
        assert_eq!(world.joint_count(), 0);
    }

    #[test]
    fn pass_test_pairs_do_not_collide() {
        let mut world = PhysicsWorld::default();
        world.config_mut().gravity = Vector::ZERO;
        let a = world.register_body(RigidBody::circle(0.5).unwrap());
        let b = world.register_body(
            RigidBody::circle(0.5)
                .unwrap()
                .with_position(Vector::new(0.5, 0.0)),
        );

        world.update();
        assert!(world.manifold(a, b).is_some());

        let joint = RevoluteJoint::new(
            world.body(a).unwrap(),
            world.body(b).unwrap(),
            Vector::new(0.25, 0.0),
        )
        .unwrap();
        let joint = world.register_joint(joint, true).unwrap();
        assert_eq!(world.pass_pairs().count(), 1);

        world.update();
        assert!(world.manifold(a, b).is_none());

        world.unregister_joint(joint);
        assert_eq!(world.pass_pairs().count(), 0);
        world.update();
        assert!(world.manifold(a, b).is_some());
    }

    #[test]
    fn rejects_joints_with_invalid_body_combinations() {
        let mut world = PhysicsWorld::default();
        let a = world.register_body(RigidBody::circle(0.5).unwrap());
        let b = world.register_body(
            RigidBody::circle(0.5)
                .unwrap()
                .with_position(Vector::new(2.0, 0.0)),
        );
        let ground = world.register_body(RigidBody::rectangle(4.0, 1.0).unwrap().into_static());
        let wall = world.register_body(
            RigidBody::rectangle(1.0, 4.0)
                .unwrap()
                .into_static()
                .with_position(Vector::new(6.0, 0.0)),
        );

        let joint = DistanceJoint::new(
            world.body(a).unwrap(),
            world.body(b).unwrap(),
            Vector::ZERO,
            Vector::new(2.0, 0.0),
        )
        .unwrap();

        // The body ids were edited after the joint was built.
        let mut same = joint.clone();
        same.body2 = a;
        assert_eq!(
            world.register_joint(same, false),
            Err(PhysicsError::SameBody(a))
        );

        let mut statics = joint.clone();
        statics.body1 = ground;
        statics.body2 = wall;
        assert_eq!(
            world.register_joint(statics, true),
            Err(PhysicsError::StaticPair(ground, wall))
        );

        let mut grab = GrabJoint::new(world.body(a).unwrap(), Vector::ZERO).unwrap();
        grab.body = ground;
        assert_eq!(
            world.register_joint(grab, false),
            Err(PhysicsError::NonDynamicGrab(ground))
        );

        assert_eq!(world.joint_count(), 0);
        assert_eq!(world.pass_pairs().count(), 0);
        assert!(world.body(a).unwrap().joint_ids().is_empty());

        // Stepping still works, and a valid joint is accepted.
        world.update();
        assert!(world.register_joint(joint, false).is_ok());
        world.update();
        assert_eq!(world.joint_count(), 1);
    }

    #[test]
    fn set_config_validates() {
        let mut world = PhysicsWorld::default();
        let invalid = PhysicsConfig {
            solver_iterations: 4,
            delta_secs: -1.0,
            ..Default::default()
        };
        assert!(world.set_config(invalid.clone()).is_err());
        assert!(PhysicsWorld::new(invalid).is_err());
        assert_eq!(world.config().solver_iterations, 10);
    }
}

//! Simulation islands.
//!
//! An island is a connected component of the graph whose nodes are non-static bodies and whose
//! edges are contact manifolds and joints. Islands are rebuilt from scratch every step with a
//! depth-first search seeded from each body that has not been visited yet, and each island is
//! solved and put to sleep independently of the others.
//!
//! Static bodies are never island members. They take part in the constraints of any number
//! of islands, so traversal never continues through them.
//!
//! # References
//!
//! - [Box2D - Simulation Islands] by [Erin Catto]
//!
//! [Box2D - Simulation Islands]: https://box2d.org/posts/2023/10/simulation-islands/
//! [Erin Catto]: https://github.com/erincatto

mod sleeping;

pub(crate) use sleeping::{update_resting_times, wants_to_sleep};

use bevy::log::trace;
use indexmap::{IndexMap, IndexSet};
use slab::Slab;

use crate::{
    PhysicsConfig,
    collision::contact_types::ContactManifold,
    data_structures::pair_key::PairKey,
    dynamics::solver::{
        joints::{ImpulseJoint, Joint, JointId},
        solver_body::pair_mut,
    },
    prelude::*,
};

/// A group of bodies connected through contacts and joints, built for one step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Island {
    /// The index of the island in the step's island list.
    pub id: usize,
    /// The non-static bodies of the island.
    pub bodies: Vec<BodyId>,
    /// The contact manifolds between the island's bodies, or between them and static bodies.
    pub manifolds: Vec<PairKey>,
    /// The joints attached to the island's bodies.
    pub joints: Vec<JointId>,
    /// Whether the island was asleep during the step. Sleeping islands are not solved.
    pub sleeping: bool,
}

impl Island {
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contact_count(&self) -> usize {
        self.manifolds.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Puts the island to sleep, or wakes it and solves its constraints.
    ///
    /// Velocities are written back to the bodies. Positions are left to the integrator.
    pub(crate) fn solve(
        &mut self,
        bodies: &mut Slab<RigidBody>,
        manifolds: &mut IndexMap<PairKey, ContactManifold>,
        joints: &mut Slab<Joint>,
        delta_secs: Scalar,
        config: &PhysicsConfig,
    ) {
        if wants_to_sleep(self, bodies, joints, config) {
            if !self.sleeping {
                trace!("island {} with {} bodies fell asleep", self.id, self.bodies.len());
            }
            self.sleeping = true;
            for id in &self.bodies {
                if let Some(body) = bodies.get_mut(id.index()) {
                    body.put_to_sleep();
                }
            }
            return;
        }

        self.sleeping = false;
        for id in &self.bodies {
            if let Some(body) = bodies.get_mut(id.index()) {
                if body.is_sleeping() {
                    trace!("body {id} woke up in island {}", self.id);
                    body.wake_up();
                }
            }
        }

        // Solver bodies are laid out in the order they are first referenced, with static
        // bodies copied in as immovable bodies.
        let mut indices = IndexSet::<BodyId>::with_capacity(self.bodies.len());
        let mut solver_bodies = Vec::with_capacity(self.bodies.len());
        let mut index_of = |id: BodyId, solver_bodies: &mut Vec<SolverBody>| -> Option<usize> {
            if let Some(index) = indices.get_index_of(&id) {
                return Some(index);
            }
            let body = bodies.get(id.index())?;
            solver_bodies.push(SolverBody::from_body(body));
            Some(indices.insert_full(id).0)
        };

        for &id in &self.bodies {
            index_of(id, &mut solver_bodies);
        }
        let manifold_pairs: Vec<Option<(usize, usize)>> = self
            .manifolds
            .iter()
            .map(|key| {
                let manifold = manifolds.get(key)?;
                Some((
                    index_of(manifold.body_a, &mut solver_bodies)?,
                    index_of(manifold.body_b, &mut solver_bodies)?,
                ))
            })
            .collect();
        let joint_pairs: Vec<Option<(usize, Option<usize>)>> = self
            .joints
            .iter()
            .map(|id| {
                let joint = joints.get(id.index())?;
                let index1 = index_of(joint.body1(), &mut solver_bodies)?;
                let index2 = match joint.body2() {
                    Some(body2) => Some(index_of(body2, &mut solver_bodies)?),
                    None => None,
                };
                Some((index1, index2))
            })
            .collect();

        // Prepare and warm start.
        for (key, pair) in self.manifolds.iter().zip(&manifold_pairs) {
            let (Some(manifold), Some((index1, index2))) = (manifolds.get_mut(key), pair) else {
                continue;
            };
            let (body1, body2) = pair_mut(&mut solver_bodies, *index1, *index2);
            manifold.prepare(body1, body2, delta_secs, config);
        }
        for (id, pair) in self.joints.iter().zip(&joint_pairs) {
            let (Some(joint), Some((index1, index2))) = (joints.get_mut(id.index()), pair) else {
                continue;
            };
            with_joint_bodies(&mut solver_bodies, *index1, *index2, |body1, body2| {
                joint.kind.prepare(body1, body2, delta_secs, config);
            });
        }

        for _ in 0..config.solver_iterations {
            for (id, pair) in self.joints.iter().zip(&joint_pairs) {
                let (Some(joint), Some((index1, index2))) = (joints.get_mut(id.index()), pair)
                else {
                    continue;
                };
                with_joint_bodies(&mut solver_bodies, *index1, *index2, |body1, body2| {
                    joint.kind.solve(body1, body2);
                });
            }
            for (key, pair) in self.manifolds.iter().zip(&manifold_pairs) {
                let (Some(manifold), Some((index1, index2))) = (manifolds.get_mut(key), pair)
                else {
                    continue;
                };
                let (body1, body2) = pair_mut(&mut solver_bodies, *index1, *index2);
                manifold.solve(body1, body2, config);
            }
        }

        // Write back velocities of the island's own bodies. Static copies are discarded.
        for (index, id) in indices.iter().enumerate() {
            let Some(body) = bodies.get_mut(id.index()) else {
                continue;
            };
            if body.is_dynamic() {
                body.linear_velocity = solver_bodies[index].linear_velocity;
                body.angular_velocity = solver_bodies[index].angular_velocity;
            }
        }

        update_resting_times(self, bodies, delta_secs, config);
    }
}

/// Runs `f` with the solver bodies of a joint, substituting [`SolverBody::DUMMY`]
/// for the second body of single-body joints.
fn with_joint_bodies(
    solver_bodies: &mut [SolverBody],
    index1: usize,
    index2: Option<usize>,
    f: impl FnOnce(&mut SolverBody, &mut SolverBody),
) {
    match index2 {
        Some(index2) => {
            let (body1, body2) = pair_mut(solver_bodies, index1, index2);
            f(body1, body2);
        }
        None => {
            let mut dummy = SolverBody::DUMMY;
            f(&mut solver_bodies[index1], &mut dummy);
        }
    }
}

/// Partitions bodies into [`Island`]s by depth-first search over contacts and joints.
///
/// Reuses its traversal buffers between steps.
#[derive(Debug, Default)]
pub struct IslandBuilder {
    stack: Vec<BodyId>,
    visited_manifolds: IndexSet<PairKey>,
    visited_joints: IndexSet<JointId>,
}

impl IslandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the islands of the current contact and joint graph, and records each
    /// non-static body's island in [`RigidBody::island_id`].
    ///
    /// Every non-static body ends up in exactly one island.
    pub fn build(
        &mut self,
        bodies: &mut Slab<RigidBody>,
        manifolds: &IndexMap<PairKey, ContactManifold>,
        joints: &Slab<Joint>,
    ) -> Vec<Island> {
        self.stack.clear();
        self.visited_manifolds.clear();
        self.visited_joints.clear();

        for (_, body) in bodies.iter_mut() {
            body.island_id = None;
        }

        let seeds: Vec<BodyId> = bodies
            .iter()
            .filter(|(_, body)| !body.is_static())
            .map(|(_, body)| body.id())
            .collect();

        let mut islands = Vec::new();

        for seed in seeds {
            let Some(body) = bodies.get_mut(seed.index()) else {
                continue;
            };
            if body.island_id.is_some() {
                continue;
            }

            let mut island = Island {
                id: islands.len(),
                sleeping: body.is_sleeping(),
                ..Default::default()
            };
            body.island_id = Some(island.id);
            self.stack.push(seed);

            while let Some(id) = self.stack.pop() {
                let Some(body) = bodies.get(id.index()) else {
                    continue;
                };
                island.bodies.push(id);
                island.sleeping &= body.is_sleeping();

                let mut neighbors = Vec::new();

                for key in body.manifold_keys.iter() {
                    if !manifolds.contains_key(key) || !self.visited_manifolds.insert(*key) {
                        continue;
                    }
                    island.manifolds.push(*key);
                    let (id1, id2) = key.get();
                    neighbors.push(if id1 == id { id2 } else { id1 });
                }

                for &joint_id in body.joint_ids.iter() {
                    let Some(joint) = joints.get(joint_id.index()) else {
                        continue;
                    };
                    if !self.visited_joints.insert(joint_id) {
                        continue;
                    }
                    island.joints.push(joint_id);
                    let other = if joint.body1() == id {
                        joint.body2()
                    } else {
                        Some(joint.body1())
                    };
                    neighbors.extend(other);
                }

                for neighbor in neighbors {
                    let Some(other) = bodies.get_mut(neighbor.index()) else {
                        continue;
                    };
                    if other.is_static() || other.island_id.is_some() {
                        continue;
                    }
                    other.island_id = Some(island.id);
                    self.stack.push(neighbor);
                }
            }

            islands.push(island);
        }

        islands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::narrow_phase::{Collision, ContactPoint};

    fn register(bodies: &mut Slab<RigidBody>, body: RigidBody) -> BodyId {
        let entry = bodies.vacant_entry();
        let id = BodyId(entry.key() as u32);
        let mut body = body;
        body.id = id;
        entry.insert(body);
        id
    }

    fn touch(
        bodies: &mut Slab<RigidBody>,
        manifolds: &mut IndexMap<PairKey, ContactManifold>,
        a: BodyId,
        b: BodyId,
    ) {
        let collision = Collision {
            normal: Vector::Y,
            depth: 0.0,
            points: [ContactPoint::default()].into_iter().collect(),
            swapped: false,
        };
        let manifold = ContactManifold::new(a, b, &collision, 0.5, 0.0);
        let key = manifold.key();
        manifolds.insert(key, manifold);
        bodies[a.index()].manifold_keys.insert(key);
        bodies[b.index()].manifold_keys.insert(key);
    }

    #[test]
    fn every_dynamic_body_in_exactly_one_island() {
        let mut bodies = Slab::new();
        let mut manifolds = IndexMap::new();
        let joints = Slab::new();

        let ground = register(&mut bodies, RigidBody::rectangle(10.0, 1.0).unwrap().into_static());
        let a = register(&mut bodies, RigidBody::circle(0.5).unwrap());
        let b = register(&mut bodies, RigidBody::circle(0.5).unwrap());
        let c = register(&mut bodies, RigidBody::circle(0.5).unwrap());
        let lonely = register(&mut bodies, RigidBody::circle(0.5).unwrap());

        // a and c rest on the ground but only touch each other through it.
        touch(&mut bodies, &mut manifolds, ground, a);
        touch(&mut bodies, &mut manifolds, ground, c);
        touch(&mut bodies, &mut manifolds, a, b);

        let islands = IslandBuilder::new().build(&mut bodies, &manifolds, &joints);
        assert_eq!(islands.len(), 3);

        let mut members: Vec<BodyId> = islands.iter().flat_map(|i| i.bodies.clone()).collect();
        members.sort();
        assert_eq!(members, vec![a, b, c, lonely]);

        let island_a = bodies[a.index()].island_id().unwrap();
        assert_eq!(bodies[b.index()].island_id(), Some(island_a));
        assert_ne!(bodies[c.index()].island_id(), Some(island_a));
        assert_eq!(bodies[ground.index()].island_id(), None);
        assert_eq!(islands[island_a].contact_count(), 2);

        let manifold_total: usize = islands.iter().map(Island::contact_count).sum();
        assert_eq!(manifold_total, manifolds.len());
    }
}

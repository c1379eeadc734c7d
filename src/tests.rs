//! Simulation-level tests that step a whole [`PhysicsWorld`].

use crate::prelude::*;
use approx::assert_relative_eq;

fn create_world() -> PhysicsWorld {
    PhysicsWorld::default()
}

fn ground(world: &mut PhysicsWorld) -> BodyId {
    world.register_body(RigidBody::rectangle(20.0, 1.0).unwrap().into_static())
}

fn step(world: &mut PhysicsWorld, steps: usize) {
    for _ in 0..steps {
        world.update();
    }
}

#[test]
fn resting_box_settles_within_slop() {
    let mut world = create_world();
    ground(&mut world);

    // Start slightly overlapping the ground.
    let cube = world.register_body(
        RigidBody::rectangle(1.0, 1.0)
            .unwrap()
            .with_position(Vector::new(0.0, 0.99)),
    );

    step(&mut world, 300);

    let slop = world.config().penetration_slop;
    let body = world.body(cube).unwrap();
    let penetration = 1.0 - body.position().y;
    assert!(penetration <= slop + 1e-3, "penetration {penetration}");
    assert!(penetration > -1e-3);
    assert_relative_eq!(body.position().x, 0.0, epsilon = 1e-3);
    assert_relative_eq!(body.rotation(), 0.0, epsilon = 1e-3);
    assert!(body.is_sleeping());

    world.aabb_tree().validate();
}

#[test]
fn elastic_collision_swaps_velocities() {
    let mut world = create_world();
    world.config_mut().gravity = Vector::ZERO;

    let moving = world.register_body(
        RigidBody::circle(0.5)
            .unwrap()
            .with_restitution(1.0)
            .with_linear_velocity(Vector::new(4.0, 0.0)),
    );
    let resting = world.register_body(
        RigidBody::circle(0.5)
            .unwrap()
            .with_restitution(1.0)
            .with_position(Vector::new(1.05, 0.0)),
    );

    step(&mut world, 30);

    let v1 = world.body(moving).unwrap().linear_velocity();
    let v2 = world.body(resting).unwrap().linear_velocity();

    assert_relative_eq!(v1.x, 0.0, epsilon = 0.15);
    assert_relative_eq!(v2.x, 4.0, epsilon = 0.15);
    assert_relative_eq!(v1.y, 0.0, epsilon = 1e-4);
    assert_relative_eq!(v2.y, 0.0, epsilon = 1e-4);

    // Equal masses, so the sum of velocities is the total momentum.
    assert_relative_eq!(v1.x + v2.x, 4.0, epsilon = 1e-3);
}

#[test]
fn islands_partition_and_sleep_independently() {
    let mut world = create_world();
    let floor = ground(&mut world);

    let left = world.register_body(
        RigidBody::rectangle(1.0, 1.0)
            .unwrap()
            .with_position(Vector::new(-5.0, 1.0)),
    );
    let right = world.register_body(
        RigidBody::rectangle(1.0, 1.0)
            .unwrap()
            .with_position(Vector::new(5.0, 1.0)),
    );

    step(&mut world, 120);

    // Static bodies never own an island, and every dynamic body is in exactly one.
    assert_eq!(world.islands().len(), 2);
    assert_eq!(world.body(floor).unwrap().island_id(), None);
    for id in [left, right] {
        let owners = world
            .islands()
            .iter()
            .filter(|island| island.bodies.contains(&id))
            .count();
        assert_eq!(owners, 1);
    }
    assert!(world.islands().iter().all(|island| island.sleeping));
    assert!(world.body(left).unwrap().is_sleeping());
    assert!(world.body(right).unwrap().is_sleeping());

    // Waking one body leaves the other island asleep.
    world
        .body_mut(left)
        .unwrap()
        .set_linear_velocity(Vector::new(0.0, 1.0));
    step(&mut world, 1);

    assert!(!world.body(left).unwrap().is_sleeping());
    assert!(world.body(right).unwrap().is_sleeping());
    assert_eq!(
        world
            .islands()
            .iter()
            .filter(|island| island.sleeping)
            .count(),
        1
    );
}

#[test]
fn joints_merge_islands() {
    let mut world = create_world();
    world.config_mut().gravity = Vector::ZERO;

    let a = world.register_body(RigidBody::circle(0.5).unwrap());
    let b = world.register_body(
        RigidBody::circle(0.5)
            .unwrap()
            .with_position(Vector::new(3.0, 0.0)),
    );
    let lonely = world.register_body(
        RigidBody::circle(0.5)
            .unwrap()
            .with_position(Vector::new(-5.0, 0.0)),
    );

    let joint = DistanceJoint::new(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vector::ZERO,
        Vector::new(3.0, 0.0),
    )
    .unwrap();
    world.register_joint(joint, false).unwrap();

    step(&mut world, 1);

    assert_eq!(world.islands().len(), 2);
    let island_a = world.body(a).unwrap().island_id();
    assert!(island_a.is_some());
    assert_eq!(island_a, world.body(b).unwrap().island_id());
    assert_ne!(island_a, world.body(lonely).unwrap().island_id());

    let joined = &world.islands()[island_a.unwrap()];
    assert_eq!(joined.body_count(), 2);
    assert_eq!(joined.joint_count(), 1);
    assert_eq!(joined.contact_count(), 0);
}

#[test]
fn sleeping_body_wakes_on_contact() {
    let mut world = create_world();
    ground(&mut world);
    let cube = world.register_body(
        RigidBody::rectangle(1.0, 1.0)
            .unwrap()
            .with_position(Vector::new(0.0, 1.0)),
    );

    step(&mut world, 120);
    assert!(world.body(cube).unwrap().is_sleeping());

    world.register_body(
        RigidBody::circle(0.25)
            .unwrap()
            .with_position(Vector::new(0.0, 3.0)),
    );

    let mut woke = false;
    for _ in 0..120 {
        world.update();
        woke |= !world.body(cube).unwrap().is_sleeping();
    }
    assert!(woke);
}

#[test]
fn revolute_anchors_stay_together() {
    let mut world = create_world();

    let pivot = world.register_body(
        RigidBody::rectangle(0.2, 0.2)
            .unwrap()
            .into_static()
            .with_position(Vector::new(0.0, 5.0)),
    );
    let bob = world.register_body(
        RigidBody::circle(0.25)
            .unwrap()
            .with_position(Vector::new(2.0, 5.0)),
    );

    let anchor = Vector::new(0.0, 5.0);
    let joint = RevoluteJoint::new(world.body(pivot).unwrap(), world.body(bob).unwrap(), anchor)
        .unwrap();
    let joint = world.register_joint(joint, true).unwrap();

    step(&mut world, 120);

    let JointKind::Revolute(revolute) = &world.joint(joint).unwrap().kind else {
        panic!("expected a revolute joint");
    };
    let world_anchor1 = world
        .body(pivot)
        .unwrap()
        .transform()
        .rigid_transform_point(revolute.local_anchor1());
    let world_anchor2 = world
        .body(bob)
        .unwrap()
        .transform()
        .rigid_transform_point(revolute.local_anchor2());

    assert!(world_anchor1.distance(world_anchor2) < 0.05);
    // The bob swung below the pivot.
    assert!(world.body(bob).unwrap().position().y < 5.0);
}

#[test]
fn unregistering_a_body_removes_its_joints_and_contacts() {
    let mut world = create_world();
    let floor = ground(&mut world);
    let a = world.register_body(
        RigidBody::rectangle(1.0, 1.0)
            .unwrap()
            .with_position(Vector::new(0.0, 1.0)),
    );
    let b = world.register_body(
        RigidBody::rectangle(1.0, 1.0)
            .unwrap()
            .with_position(Vector::new(3.0, 1.0)),
    );

    let joint = DistanceJoint::new(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vector::new(0.0, 1.0),
        Vector::new(3.0, 1.0),
    )
    .unwrap();
    let joint = world.register_joint(joint, false).unwrap();

    step(&mut world, 2);
    assert!(world.manifold(a, floor).is_some());

    let removed = world.unregister_body(a).unwrap();
    assert!(!removed.is_registered());

    assert!(world.joint(joint).is_none());
    assert_eq!(world.joint_count(), 0);
    assert!(world.body(b).unwrap().joint_ids().is_empty());
    assert!(world.manifold(a, floor).is_none());
    assert!(
        !world
            .body(floor)
            .unwrap()
            .manifold_keys()
            .contains(&PairKey::new(a, floor))
    );
    assert_eq!(world.aabb_tree().len(), 2);
    assert!(world.unregister_body(a).is_none());
}

#[test]
fn bodies_below_dead_bottom_are_removed() {
    let mut world = create_world();
    world.config_mut().dead_bottom = -5.0;

    let a = world.register_body(RigidBody::circle(0.5).unwrap());
    let b = world.register_body(
        RigidBody::circle(0.5)
            .unwrap()
            .with_position(Vector::new(3.0, 0.0)),
    );
    let joint = DistanceJoint::new(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vector::ZERO,
        Vector::new(3.0, 0.0),
    )
    .unwrap();
    world.register_joint(joint, false).unwrap();

    step(&mut world, 120);

    assert_eq!(world.body_count(), 0);
    assert_eq!(world.joint_count(), 0);
    assert!(world.aabb_tree().is_empty());
}

#[test]
fn point_and_region_queries() {
    let mut world = create_world();
    let ball = world.register_body(RigidBody::circle(0.5).unwrap());
    let cube = world.register_body(
        RigidBody::rectangle(1.0, 1.0)
            .unwrap()
            .with_position(Vector::new(3.0, 0.0)),
    );

    assert_eq!(world.query_point(Vector::new(0.2, 0.1)), vec![ball]);
    assert_eq!(world.query_point(Vector::new(3.4, -0.4)), vec![cube]);
    // Inside the enlarged broad phase box, but outside the shape.
    assert!(world.query_point(Vector::new(0.55, 0.0)).is_empty());

    let region = Aabb::from_min_max(Vector::new(2.0, -1.0), Vector::new(4.0, 1.0));
    assert_eq!(world.query_region(region), vec![cube]);

    let everything = Aabb::from_min_max(Vector::splat(-10.0), Vector::splat(10.0));
    let mut found = world.query_region(everything);
    found.sort();
    assert_eq!(found, vec![ball, cube]);
}

#[test]
fn configuration_is_read_every_step() {
    let mut world = create_world();
    let ball = world.register_body(RigidBody::circle(0.5).unwrap());

    world.config_mut().gravity_scale = 0.0;
    step(&mut world, 10);
    assert_eq!(world.body(ball).unwrap().position(), Vector::ZERO);

    world.config_mut().gravity_scale = 2.0;
    world.step(0.1);
    assert_relative_eq!(
        world.body(ball).unwrap().linear_velocity().y,
        -9.81 * 2.0 * 0.1,
        epsilon = 1e-5
    );
}

#[test]
fn stacked_boxes_come_to_rest() {
    let mut world = create_world();
    ground(&mut world);

    let boxes: Vec<BodyId> = (0..5)
        .map(|i| {
            world.register_body(
                RigidBody::rectangle(1.0, 1.0)
                    .unwrap()
                    .with_position(Vector::new(0.0, 1.0 + i as Scalar)),
            )
        })
        .collect();

    step(&mut world, 600);

    for (i, id) in boxes.iter().enumerate() {
        let body = world.body(*id).unwrap();
        assert_relative_eq!(body.position().x, 0.0, epsilon = 0.05);
        assert_relative_eq!(body.position().y, 1.0 + i as Scalar, epsilon = 0.1);
    }
    assert_eq!(world.islands().len(), 1);
    world.aabb_tree().validate();
}

//! Static bodies have zero inverse mass and never move.

use nalgebra::Vector2;

use sim2d_constraint::RevoluteJoint;
use sim2d_core::World;
use sim2d_types::{Body, SimulationConfig};

#[test]
fn static_body_ignores_forces_impulses_and_joints() {
    let mut world = World::new(SimulationConfig::default());
    let ground = world.add_body(
        Body::new_static()
            .with_position(Vector2::new(1.0, 2.0))
            .with_rotation(0.3),
    );
    let bob = world.add_body(Body::new(1.0, 1.0).unwrap().with_position(Vector2::new(2.0, 2.0)));
    world
        .add_joint(RevoluteJoint::from_world(
            ground,
            world.body(ground).unwrap(),
            bob,
            world.body(bob).unwrap(),
            Vector2::new(1.0, 2.0),
        ))
        .unwrap();

    {
        let g = world.body_mut(ground).unwrap();
        g.set_mass(0.0).unwrap();
        g.set_inertia(-3.0).unwrap();
        g.apply_force(Vector2::new(100.0, 0.0));
        g.apply_torque(10.0);
        g.apply_impulse(Vector2::new(0.0, 5.0));
        g.apply_angular_impulse(1.0);
        assert_eq!(g.inv_mass(), 0.0);
        assert_eq!(g.inv_inertia(), 0.0);
        let _ = g.take_pose_update();
    }

    for _ in 0..30 {
        let stats = world.step_fixed().unwrap();
        assert!(stats.pose_updates.iter().all(|(id, _)| *id != ground));
    }

    let g = world.body(ground).unwrap();
    assert_eq!(g.position(), Vector2::new(1.0, 2.0));
    assert_eq!(g.rotation(), 0.3);
    assert_eq!(g.linear_velocity(), Vector2::zeros());
    assert_eq!(g.angular_velocity(), 0.0);
    assert_eq!(g.force(), Vector2::zeros());
    assert_eq!(g.queued_impulse(), Vector2::zeros());

    // The bob swung; the pin did not.
    assert!(world.body(bob).unwrap().position().y < 2.0);
}

#[test]
fn dynamic_body_rejects_non_positive_mass() {
    let mut world = World::default();
    let id = world.add_body(Body::new(1.0, 1.0).unwrap());
    let body = world.body_mut(id).unwrap();

    assert!(body.set_mass(0.0).unwrap_err().is_config_error());
    assert!(body.set_inertia(0.0).is_err());
    assert_eq!(body.mass(), 1.0);
    assert_eq!(body.inv_inertia(), 1.0);
}

//! Momentum is conserved by internal joint impulses.

use approx::assert_relative_eq;
use nalgebra::Vector2;

use sim2d_constraint::{PrismaticJoint, RevoluteJoint};
use sim2d_core::World;
use sim2d_types::{Body, DragCoefficients, SimulationConfig};

fn isolated_world() -> World {
    World::new(
        SimulationConfig::default()
            .zero_gravity()
            .warm_starting(false),
    )
}

fn free_body(x: f64, v: Vector2<f64>, w: f64) -> Body {
    Body::new(2.0, 0.5)
        .unwrap()
        .with_drag(DragCoefficients::none())
        .with_position(Vector2::new(x, 0.0))
        .with_linear_velocity(v)
        .with_angular_velocity(w)
}

#[test]
fn revolute_pair_conserves_linear_and_angular_momentum() {
    let mut world = isolated_world();
    let a = world.add_body(free_body(0.0, Vector2::new(1.0, 0.0), 0.5));
    let b = world.add_body(free_body(1.0, Vector2::new(0.0, -1.0), -0.3));
    let joint = RevoluteJoint::from_world(
        a,
        world.body(a).unwrap(),
        b,
        world.body(b).unwrap(),
        Vector2::new(0.5, 0.0),
    );
    world.add_joint(joint).unwrap();

    let p0 = world.linear_momentum();
    let l0 = world.angular_momentum();
    for _ in 0..30 {
        world.step_fixed().unwrap();
        let p = world.linear_momentum();
        assert_relative_eq!(p.x, p0.x, epsilon = 1e-9);
        assert_relative_eq!(p.y, p0.y, epsilon = 1e-9);
        // Anchors drift apart by position-level error only, so the moment
        // of the joint impulse about the origin stays tiny.
        assert_relative_eq!(world.angular_momentum(), l0, epsilon = 1e-3);
    }
}

#[test]
fn prismatic_pair_conserves_linear_momentum() {
    let mut world = isolated_world();
    let a = world.add_body(free_body(0.0, Vector2::new(0.5, 0.25), 0.2));
    let b = world.add_body(free_body(1.0, Vector2::new(-0.5, 1.0), 0.0));
    let joint = PrismaticJoint::from_world(
        a,
        world.body(a).unwrap(),
        b,
        world.body(b).unwrap(),
        Vector2::new(0.5, 0.0),
        Vector2::new(1.0, 1.0),
    );
    world.add_joint(joint).unwrap();

    let p0 = world.linear_momentum();
    for _ in 0..30 {
        world.step_fixed().unwrap();
    }
    let p = world.linear_momentum();
    assert_relative_eq!(p.x, p0.x, epsilon = 1e-9);
    assert_relative_eq!(p.y, p0.y, epsilon = 1e-9);
}

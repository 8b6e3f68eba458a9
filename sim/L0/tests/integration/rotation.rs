//! Rotation is kept in (0, 2π] with a revolution counter.

use std::f64::consts::{PI, TAU};

use approx::assert_relative_eq;
use nalgebra::Vector2;

use sim2d_constraint::PrismaticJoint;
use sim2d_core::World;
use sim2d_types::{Body, DragCoefficients, SimulationConfig};

fn spinner(w: f64) -> Body {
    Body::new(1.0, 1.0)
        .unwrap()
        .with_drag(DragCoefficients::none())
        .with_angular_velocity(w)
}

#[test]
fn setting_past_a_full_turn_unwraps() {
    let mut body = Body::new(1.0, 1.0).unwrap();
    body.set_rotation(TAU + 0.1);

    assert_relative_eq!(body.rotation(), 0.1, epsilon = 1e-12);
    assert_eq!(body.revolutions(), 1);
    assert_relative_eq!(body.total_rotation(), TAU + 0.1, epsilon = 1e-12);
}

#[test]
fn integration_counts_turns_both_ways() {
    let mut world = World::new(SimulationConfig::default().zero_gravity());
    let ccw = world.add_body(spinner(TAU));
    let cw = world.add_body(spinner(-TAU));

    for _ in 0..90 {
        world.step_fixed().unwrap();
    }

    let ccw = world.body(ccw).unwrap();
    assert_eq!(ccw.revolutions(), 1);
    assert_relative_eq!(ccw.rotation(), PI, epsilon = 1e-9);
    assert_relative_eq!(ccw.total_rotation(), 3.0 * PI, epsilon = 1e-9);

    let cw = world.body(cw).unwrap();
    assert_eq!(cw.revolutions(), -2);
    assert_relative_eq!(cw.rotation(), PI, epsilon = 1e-9);
    assert_relative_eq!(cw.total_rotation(), -3.0 * PI, epsilon = 1e-9);
}

#[test]
fn joint_angle_survives_wraparound() {
    let mut world = World::new(SimulationConfig::default().zero_gravity());
    let hub = world.add_body(
        Body::new(1000.0, 1000.0)
            .unwrap()
            .with_drag(DragCoefficients::none())
            .with_angular_velocity(TAU),
    );
    let rider = world.add_body(spinner(TAU));
    world
        .add_joint(PrismaticJoint::new(
            hub,
            rider,
            Vector2::zeros(),
            Vector2::zeros(),
            Vector2::x(),
            0.0,
        ))
        .unwrap();

    for _ in 0..90 {
        world.step_fixed().unwrap();
    }

    let hub = world.body(hub).unwrap();
    let rider = world.body(rider).unwrap();
    assert_eq!(hub.revolutions(), rider.revolutions());
    assert_relative_eq!(
        rider.total_rotation(),
        hub.total_rotation(),
        epsilon = 1e-6
    );
}

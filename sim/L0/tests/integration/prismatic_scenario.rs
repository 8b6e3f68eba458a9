//! A limited prismatic joint at rest stays at rest.

use approx::assert_relative_eq;
use nalgebra::Vector2;

use sim2d_constraint::{JointLimits, LimitState, PrismaticJoint};
use sim2d_core::World;
use sim2d_types::{Body, JointId, SimulationConfig};

fn limited_slider(config: SimulationConfig, axis: Vector2<f64>) -> (World, JointId) {
    let mut world = World::new(config);
    let a = world.add_body(Body::new_static());
    let b = world.add_body(Body::new(1.0, 1.0).unwrap());
    let joint = PrismaticJoint::new(a, b, Vector2::zeros(), Vector2::zeros(), axis, 0.0)
        .with_limits(JointLimits::new(-1.0, 1.0));
    let id = world.add_joint(joint).unwrap();
    (world, id)
}

fn translation(world: &World, id: JointId) -> f64 {
    let joint = world.joint(id).unwrap().as_prismatic().unwrap();
    joint.joint_translation(&world.bodies()[0], &world.bodies()[1])
}

#[test]
fn slider_without_forces_does_not_drift() {
    let config = SimulationConfig::with_timestep(1.0 / 60.0).zero_gravity();
    let (mut world, id) = limited_slider(config, Vector2::x());

    for _ in 0..60 {
        world.step(1.0 / 60.0).unwrap();
    }

    assert_relative_eq!(translation(&world, id), 0.0, epsilon = 1e-4);
    let b = &world.bodies()[1];
    assert_relative_eq!(b.position().y, 0.0, epsilon = 1e-4);
    assert_relative_eq!(b.total_rotation(), 0.0, epsilon = 1e-4);
    assert_eq!(
        world.joint(id).unwrap().as_prismatic().unwrap().limit_state(),
        LimitState::Inactive
    );
}

#[test]
fn vertical_slider_rests_on_lower_limit() {
    let mut world = World::new(SimulationConfig::default());
    let a = world.add_body(Body::new_static());
    let b = world.add_body(Body::new(1.0, 1.0).unwrap().with_position(Vector2::new(0.0, -1.0)));
    let id = world
        .add_joint(
            PrismaticJoint::new(a, b, Vector2::zeros(), Vector2::zeros(), Vector2::y(), 0.0)
                .with_limits(JointLimits::new(-1.0, 1.0)),
        )
        .unwrap();

    for _ in 0..60 {
        world.step_fixed().unwrap();
    }

    let joint = world.joint(id).unwrap().as_prismatic().unwrap();
    assert_eq!(joint.limit_state(), LimitState::AtLower);
    let slop = world.config().solver.linear_slop;
    assert!(translation(&world, id) > -1.0 - slop - 1e-9);

    // The limit carries the slider's weight.
    let force = joint.reaction_force(world.last_inv_dt());
    assert_relative_eq!(force.y, 9.81, max_relative = 1e-2);
    assert_relative_eq!(force.x, 0.0, epsilon = 1e-6);
}

#[test]
fn motor_drives_slider_into_upper_limit() {
    let config = SimulationConfig::default().zero_gravity();
    let (mut world, id) = limited_slider(config, Vector2::x());
    {
        let joint = world.joint_mut(id).unwrap().as_prismatic_mut().unwrap();
        joint.enable_motor(true);
        joint.set_motor_speed(2.0);
        joint.set_max_motor_force(10.0);
    }

    for _ in 0..120 {
        world.step_fixed().unwrap();
    }

    let joint = world.joint(id).unwrap().as_prismatic().unwrap();
    assert_eq!(joint.limit_state(), LimitState::AtUpper);
    let slop = world.config().solver.linear_slop;
    let t = translation(&world, id);
    assert!((1.0 - 1e-9..=1.0 + slop + 1e-9).contains(&t), "t = {t}");

    // Motor saturated, limit pushing back just as hard.
    let max_impulse = 10.0 / 60.0;
    assert_relative_eq!(joint.motor_impulse(), max_impulse, epsilon = 1e-12);
    assert_relative_eq!(joint.impulse().z, -max_impulse, max_relative = 1e-6);
    assert_relative_eq!(joint.motor_force(world.last_inv_dt()), 10.0, epsilon = 1e-9);
}

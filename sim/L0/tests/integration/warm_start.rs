//! Warm-start impulses are rescaled by the dt ratio.

use approx::assert_relative_eq;
use nalgebra::Vector2;

use sim2d_constraint::{Constraint, JointMotor, PrismaticJoint, RevoluteJoint};
use sim2d_core::World;
use sim2d_types::{Body, DragCoefficients, SimulationConfig, TimeStep};

#[test]
fn dt_ratio_two_doubles_joint_impulse() {
    let config = SimulationConfig::default();
    let mut world = World::new(config.clone());
    let ground = world.add_body(Body::new_static());
    let bob = world.add_body(
        Body::new(1.0, 1.0)
            .unwrap()
            .with_drag(DragCoefficients::none())
            .with_position(Vector2::new(1.0, 0.0)),
    );
    // Pinned at its own center: the impulse carries no torque on the bob.
    let pin = world
        .add_joint(RevoluteJoint::from_world(
            ground,
            world.body(ground).unwrap(),
            bob,
            world.body(bob).unwrap(),
            Vector2::new(1.0, 0.0),
        ))
        .unwrap();
    world.step_fixed().unwrap();

    let mut joint = world.joint(pin).unwrap().clone();
    let previous = joint.as_revolute().unwrap().impulse();
    assert!(previous.y > 0.0);

    let mut a = world.body(ground).unwrap().clone();
    let mut b = world.body(bob).unwrap().clone();
    let ts = TimeStep::new(config.timestep, world.last_inv_dt(), &config).with_dt_ratio(2.0);
    let v0 = b.linear_velocity();

    joint.init_velocity_constraints(&a, &b, &ts);
    joint.warm_start(&mut a, &mut b, &ts);

    let scaled = joint.as_revolute().unwrap().impulse();
    assert_eq!(scaled, previous * 2.0);
    let dv = b.linear_velocity() - v0;
    assert_relative_eq!(dv.x, scaled.x, epsilon = 1e-12);
    assert_relative_eq!(dv.y, scaled.y, epsilon = 1e-12);
}

#[test]
fn dt_ratio_scales_motor_impulse() {
    let config = SimulationConfig::default().zero_gravity();
    let mut world = World::new(config.clone());
    let ground = world.add_body(Body::new_static());
    let slider = world.add_body(Body::new(1.0, 1.0).unwrap());
    let id = world
        .add_joint(
            PrismaticJoint::new(
                ground,
                slider,
                Vector2::zeros(),
                Vector2::zeros(),
                Vector2::x(),
                0.0,
            )
            .with_motor(JointMotor::velocity(1.0, 1.0)),
        )
        .unwrap();
    world.step_fixed().unwrap();

    let mut joint = world.joint(id).unwrap().clone();
    let previous = joint.as_prismatic().unwrap().motor_impulse();
    // Saturated: the motor asks for far more than one newton can give.
    assert_relative_eq!(previous, config.timestep, epsilon = 1e-15);

    let mut a = world.body(ground).unwrap().clone();
    let mut b = world.body(slider).unwrap().clone();
    let ts = TimeStep::new(config.timestep, world.last_inv_dt(), &config).with_dt_ratio(2.0);
    joint.init_velocity_constraints(&a, &b, &ts);
    joint.warm_start(&mut a, &mut b, &ts);

    assert_eq!(joint.as_prismatic().unwrap().motor_impulse(), previous * 2.0);
}

#[test]
fn first_step_starts_cold() {
    let config = SimulationConfig::default();
    let ts = TimeStep::new(config.timestep, 0.0, &config);
    assert_eq!(ts.dt_ratio, 0.0);

    let ts = TimeStep::new(1.0 / 30.0, 60.0, &config);
    assert_relative_eq!(ts.dt_ratio, 2.0, epsilon = 1e-15);
}

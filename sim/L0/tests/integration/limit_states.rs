//! Limit state transitions and the limit impulse they reset.

use approx::assert_relative_eq;
use nalgebra::Vector2;

use sim2d_constraint::{Constraint, JointLimits, JointMotor, LimitState, PrismaticJoint};
use sim2d_types::{Body, BodyId, DragCoefficients, SimulationConfig, TimeStep};

fn slider_at(x: f64, vx: f64) -> (Body, Body, PrismaticJoint) {
    let ground = Body::new_static();
    let slider = Body::new(1.0, 1.0)
        .unwrap()
        .with_drag(DragCoefficients::none())
        .with_position(Vector2::new(x, 0.0))
        .with_linear_velocity(Vector2::new(vx, 0.0));
    let joint = PrismaticJoint::new(
        BodyId::new(0),
        BodyId::new(1),
        Vector2::zeros(),
        Vector2::zeros(),
        Vector2::x(),
        0.0,
    )
    .with_limits(JointLimits::new(-1.0, 1.0));
    (ground, slider, joint)
}

fn time_step() -> TimeStep {
    let config = SimulationConfig::default().zero_gravity();
    TimeStep::new(config.timestep, 1.0 / config.timestep, &config)
}

fn solve(joint: &mut PrismaticJoint, a: &mut Body, b: &mut Body, ts: &TimeStep) {
    joint.init_velocity_constraints(a, b, ts);
    joint.warm_start(a, b, ts);
    for _ in 0..ts.velocity_iterations {
        joint.solve_velocity_constraints(a, b, ts);
    }
}

#[test]
fn inactive_to_lower_starts_from_zero_limit_impulse() {
    let ts = time_step();
    let (mut a, mut b, mut joint) = slider_at(0.0, -1.0);

    solve(&mut joint, &mut a, &mut b, &ts);
    assert_eq!(joint.limit_state(), LimitState::Inactive);
    assert_eq!(joint.impulse().z, 0.0);

    b.set_position(Vector2::new(-1.2, 0.0));
    joint.init_velocity_constraints(&a, &b, &ts);
    assert_eq!(joint.limit_state(), LimitState::AtLower);
    assert_eq!(joint.impulse().z, 0.0);

    joint.warm_start(&mut a, &mut b, &ts);
    for _ in 0..ts.velocity_iterations {
        joint.solve_velocity_constraints(&mut a, &mut b, &ts);
    }
    let held = joint.impulse().z;
    assert!(held > 0.0);
    assert!(b.linear_velocity().x >= -1e-12);

    // Staying at the same bound keeps the accumulator for warm starting.
    joint.init_velocity_constraints(&a, &b, &ts);
    assert_eq!(joint.limit_state(), LimitState::AtLower);
    assert_eq!(joint.impulse().z, held);
}

#[test]
fn upper_to_lower_discards_limit_impulse() {
    let ts = time_step();
    let (mut a, mut b, mut joint) = slider_at(1.2, 2.0);

    solve(&mut joint, &mut a, &mut b, &ts);
    assert_eq!(joint.limit_state(), LimitState::AtUpper);
    assert!(joint.impulse().z < 0.0);

    b.set_position(Vector2::new(-1.5, 0.0));
    joint.init_velocity_constraints(&a, &b, &ts);
    assert_eq!(joint.limit_state(), LimitState::AtLower);
    assert_eq!(joint.impulse().z, 0.0);
}

#[test]
fn equal_limits_ignore_the_motor() {
    let ts = time_step();
    let (mut a, mut b, joint) = slider_at(0.5, 0.0);
    let mut joint = joint
        .with_limits(JointLimits::new(0.5, 0.501))
        .with_motor(JointMotor::velocity(5.0, 100.0));

    solve(&mut joint, &mut a, &mut b, &ts);
    assert_eq!(joint.limit_state(), LimitState::Equal);
    assert_eq!(joint.motor_impulse(), 0.0);
    assert_relative_eq!(joint.joint_speed(&a, &b), 0.0, epsilon = 1e-12);
}

#[test]
fn disabling_the_limit_drops_its_impulse() {
    let ts = time_step();
    let (mut a, mut b, mut joint) = slider_at(1.2, 2.0);
    solve(&mut joint, &mut a, &mut b, &ts);
    assert!(joint.impulse().z < 0.0);

    joint.enable_limit(false);
    joint.init_velocity_constraints(&a, &b, &ts);
    assert_eq!(joint.limit_state(), LimitState::Inactive);
    assert_eq!(joint.impulse().z, 0.0);
}

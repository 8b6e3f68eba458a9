//! Registration checks and runtime joint control through the world.

use approx::assert_relative_eq;
use nalgebra::Vector2;

use sim2d_constraint::{AnyJoint, Joint, JointType, PrismaticJoint, RevoluteJoint};
use sim2d_contact::{ContactId, ContactMaterial, Manifold, ManifoldPoint, MAX_MANIFOLD_POINTS};
use sim2d_core::World;
use sim2d_types::{Body, BodyId, DragCoefficients, JointId, SimError, SimulationConfig};

#[test]
fn joints_are_numbered_in_registration_order() {
    let mut world = World::default();
    let ground = world.add_body(Body::new_static());
    let a = world.add_body(Body::new(1.0, 1.0).unwrap());
    let b = world.add_body(Body::new(1.0, 1.0).unwrap());

    let first = world
        .add_joint(RevoluteJoint::new(ground, a, Vector2::zeros(), Vector2::zeros()))
        .unwrap();
    let second = world
        .add_joint(AnyJoint::from(PrismaticJoint::new(
            a,
            b,
            Vector2::zeros(),
            Vector2::zeros(),
            Vector2::y(),
            0.0,
        )))
        .unwrap();

    assert_eq!((first, second), (JointId::new(0), JointId::new(1)));
    assert_eq!(world.joint(first).unwrap().joint_type(), JointType::Revolute);
    assert_eq!(world.joint(second).unwrap().joint_type(), JointType::Prismatic);
    assert!(world.joint(JointId::new(2)).is_none());
}

#[test]
fn invalid_registrations_leave_world_unchanged() {
    let mut world = World::default();
    let ground = world.add_body(Body::new_static());
    let other_static = world.add_body(Body::new_static());
    let b = world.add_body(Body::new(1.0, 1.0).unwrap());

    assert!(matches!(
        world.add_joint(RevoluteJoint::new(ground, other_static, Vector2::zeros(), Vector2::zeros())),
        Err(SimError::DegenerateConstraint { .. })
    ));
    assert!(matches!(
        world.add_joint(RevoluteJoint::new(b, BodyId::new(40), Vector2::zeros(), Vector2::zeros())),
        Err(SimError::InvalidBodyId(40))
    ));
    assert!(matches!(
        world.update_manifold(ground, BodyId::new(40), Manifold::new(Vector2::y()), ContactMaterial::default()),
        Err(SimError::InvalidBodyId(40))
    ));
    assert_eq!(world.joint_count(), 0);
    assert_eq!(world.contact_count(), 0);

    let mut full = Manifold::new(Vector2::y());
    for key in 0..MAX_MANIFOLD_POINTS {
        full.push_point(ManifoldPoint::new(
            Vector2::zeros(),
            Vector2::zeros(),
            0.0,
            ContactId(u32::try_from(key).unwrap()),
        ))
        .unwrap();
    }
    let overflow = full.push_point(ManifoldPoint::new(
        Vector2::zeros(),
        Vector2::zeros(),
        0.0,
        ContactId(99),
    ));
    assert!(matches!(overflow, Err(SimError::CapacityExceeded { .. })));
}

#[test]
fn motor_can_be_switched_on_mid_run() {
    let mut world = World::new(SimulationConfig::default().zero_gravity());
    let ground = world.add_body(Body::new_static());
    let slider = world.add_body(
        Body::new(1.0, 1.0)
            .unwrap()
            .with_drag(DragCoefficients::none()),
    );
    let id = world
        .add_joint(PrismaticJoint::new(
            ground,
            slider,
            Vector2::zeros(),
            Vector2::zeros(),
            Vector2::x(),
            0.0,
        ))
        .unwrap();

    for _ in 0..10 {
        world.step_fixed().unwrap();
    }
    assert_eq!(world.body(slider).unwrap().linear_velocity(), Vector2::zeros());

    {
        let joint = world.joint_mut(id).unwrap().as_prismatic_mut().unwrap();
        joint.enable_motor(true);
        joint.set_motor_speed(0.75);
        joint.set_max_motor_force(1000.0);
    }
    world.step_fixed().unwrap();

    assert_relative_eq!(world.body(slider).unwrap().linear_velocity().x, 0.75, epsilon = 1e-9);
    let joint = world.joint(id).unwrap();
    assert_relative_eq!(
        joint.as_prismatic().unwrap().joint_speed(&world.bodies()[0], &world.bodies()[1]),
        0.75,
        epsilon = 1e-9
    );
    assert!(joint.reaction_force(world.last_inv_dt()).x > 0.0);
}

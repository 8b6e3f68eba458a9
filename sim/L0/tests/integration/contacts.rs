//! Contacts fed each step from a stand-in narrow phase.
//!
//! The ground is a static body at the origin whose top face is `y = 0`.
//! Boxes report their bottom corners as contact points whenever a corner is
//! below `linear_slop`, with stable ids per corner.

use approx::assert_relative_eq;
use nalgebra::Vector2;

use sim2d_contact::{ContactFeatures, ContactId, ContactMaterial, Manifold, ManifoldPoint};
use sim2d_core::World;
use sim2d_types::{Body, BodyId, DragCoefficients, SimulationConfig};

pub const HALF: f64 = 0.5;

/// Bottom-corner manifold for a box of half extent [`HALF`] against the ground.
pub fn ground_manifold(body: &Body, margin: f64) -> Option<Manifold> {
    let mut manifold = Manifold::new(Vector2::y());
    for (vertex, corner) in [(0u8, Vector2::new(-HALF, -HALF)), (1, Vector2::new(HALF, -HALF))] {
        let world = body.world_point(&corner);
        if world.y < margin {
            let id = ContactId::from(ContactFeatures {
                reference_edge: 0,
                incident_edge: 0,
                incident_vertex: vertex,
                flip: 0,
            });
            manifold
                .push_point(ManifoldPoint::new(world, corner, world.y, id))
                .ok()?;
        }
    }
    (!manifold.is_empty()).then_some(manifold)
}

/// Feed the ground contact for `id`, if it touches.
pub fn feed(world: &mut World, ground: BodyId, id: BodyId, material: ContactMaterial) {
    let margin = world.config().solver.linear_slop;
    let manifold = world.body(id).and_then(|b| ground_manifold(b, margin));
    if let Some(manifold) = manifold {
        world.update_manifold(ground, id, manifold, material).unwrap();
    }
}

fn box_at(x: f64, y: f64) -> Body {
    Body::new(1.0, 1.0 / 6.0)
        .unwrap()
        .with_drag(DragCoefficients::none())
        .with_position(Vector2::new(x, y))
}

#[test]
fn resting_box_stays_put_and_warm_starts() {
    let mut world = World::new(SimulationConfig::default());
    let ground = world.add_body(Body::new_static());
    let id = world.add_body(box_at(0.0, HALF));

    for _ in 0..120 {
        feed(&mut world, ground, id, ContactMaterial::default());
        world.step_fixed().unwrap();
    }

    let body = world.body(id).unwrap();
    let slop = world.config().solver.linear_slop;
    assert!(body.position().y > HALF - 2.0 * slop, "y = {}", body.position().y);
    assert!(body.position().y < HALF + 1e-3);
    assert!(body.linear_velocity().norm() < 1e-2);
    assert!(body.total_rotation().abs() < 1e-3);

    // Carried-over impulses hold the box against one step of gravity.
    let manifold = world.contact(ground, id).unwrap();
    assert_eq!(manifold.point_count(), 2);
    assert_relative_eq!(
        manifold.total_normal_impulse(),
        9.81 / 60.0,
        max_relative = 0.05
    );
}

#[test]
fn falling_box_comes_to_rest() {
    let mut world = World::new(SimulationConfig::default());
    let ground = world.add_body(Body::new_static());
    let id = world.add_body(box_at(0.0, 1.5));

    for _ in 0..240 {
        feed(&mut world, ground, id, ContactMaterial::default());
        world.step_fixed().unwrap();
    }

    let body = world.body(id).unwrap();
    assert!((body.position().y - HALF).abs() < 0.02, "y = {}", body.position().y);
    assert!(body.linear_velocity().y.abs() < 0.05);
}

#[test]
fn friction_stops_a_sliding_box() {
    let mut world = World::new(SimulationConfig::default());
    let ground = world.add_body(Body::new_static());
    let id = world.add_body(box_at(0.0, HALF).with_linear_velocity(Vector2::new(2.0, 0.0)));
    let material = ContactMaterial::new(0.5, 0.0);

    for _ in 0..60 {
        feed(&mut world, ground, id, material);
        world.step_fixed().unwrap();
    }

    // v² / (2 μ g) ≈ 0.41
    let body = world.body(id).unwrap();
    assert!(body.linear_velocity().x.abs() < 1e-3);
    assert!(body.position().x > 0.3 && body.position().x < 0.5, "x = {}", body.position().x);
}

#[test]
fn restitution_reverses_fast_impact() {
    let config = SimulationConfig::default();
    let g = config.gravity.y;
    let mut world = World::new(config);
    let ground = world.add_body(Body::new_static());
    let ball = world.add_body(box_at(0.0, 2.0));
    let material = ContactMaterial::new(0.0, 0.8);
    let margin = world.config().solver.linear_slop;

    for _ in 0..120 {
        let body = world.body(ball).unwrap();
        let bottom = body.position().y - HALF;
        let vy = body.linear_velocity().y;
        if bottom < margin {
            let manifold = Manifold::new(Vector2::y())
                .with_point(ManifoldPoint::new(
                    Vector2::new(body.position().x, bottom),
                    Vector2::new(0.0, -HALF),
                    bottom,
                    ContactId(0),
                ))
                .unwrap();
            world.update_manifold(ground, ball, manifold, material).unwrap();
            world.step_fixed().unwrap();

            let approach = vy + g / 60.0;
            assert!(approach < -1.0);
            assert_relative_eq!(
                world.body(ball).unwrap().linear_velocity().y,
                -0.8 * approach,
                epsilon = 1e-9
            );
            return;
        }
        world.step_fixed().unwrap();
    }
    panic!("ball never reached the ground");
}

#[test]
fn contact_dropped_once_pair_separates() {
    let mut world = World::new(SimulationConfig::default());
    let ground = world.add_body(Body::new_static());
    let id = world.add_body(box_at(0.0, HALF));

    for _ in 0..10 {
        feed(&mut world, ground, id, ContactMaterial::default());
        world.step_fixed().unwrap();
    }
    assert_eq!(world.contact_count(), 1);

    // The collaborator stops reporting the pair.
    world.step_fixed().unwrap();
    assert_eq!(world.contact_count(), 0);
    assert!(world.body(id).unwrap().linear_velocity().y < 0.0);
}

//! Persistent contacts for planar rigid bodies.
//!
//! Narrow phase is someone else's job. This crate takes the manifolds it
//! produces and turns each one into an impulse constraint solved alongside
//! the joints:
//!
//! - [`ContactId`] - Feature key that names a point across frames
//! - [`Manifold`] - Up to [`MAX_MANIFOLD_POINTS`] points sharing one normal,
//!   each with its own impulse accumulators
//! - [`ContactMaterial`] - Friction and restitution for the pair
//! - [`ContactConstraint`] - Normal and friction rows per point, plus the
//!   split-impulse and position passes
//!
//! # Warm Starting
//!
//! A point's accumulators survive into the next frame only when the new
//! manifold carries a point with the same id. Everything else starts cold:
//!
//! ```text
//! frame n     [id 7: λn = 3.1] [id 9: λn = 0.4]
//! frame n+1   [id 9: λn = 0.4] [id 2: λn = 0.0]
//! ```
//!
//! # Example
//!
//! ```
//! use sim2d_contact::{ContactConstraint, ContactId, ContactMaterial, Manifold, ManifoldPoint};
//! use sim2d_constraint::Constraint;
//! use sim2d_types::{Body, BodyId, SimulationConfig, TimeStep};
//! use nalgebra::Vector2;
//!
//! let mut ground = Body::new_static();
//! let mut ball = Body::new(1.0, 1.0)
//!     .unwrap()
//!     .with_position(Vector2::new(0.0, 0.5))
//!     .with_linear_velocity(Vector2::new(0.0, -0.5));
//!
//! let manifold = Manifold::new(Vector2::y())
//!     .with_point(ManifoldPoint::new(
//!         Vector2::zeros(),
//!         Vector2::new(0.0, -0.5),
//!         0.0,
//!         ContactId(0),
//!     ))
//!     .unwrap();
//! let mut contact =
//!     ContactConstraint::new(BodyId::new(0), BodyId::new(1), manifold, ContactMaterial::default());
//!
//! let config = SimulationConfig::default();
//! let step = TimeStep::new(config.timestep, 0.0, &config);
//! contact.init_velocity_constraints(&ground, &ball, &step);
//! contact.warm_start(&mut ground, &mut ball, &step);
//! contact.solve_velocity_constraints(&mut ground, &mut ball, &step);
//!
//! assert!(ball.linear_velocity().y.abs() < 1e-12);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::missing_errors_doc)]

mod constraint;
mod id;
mod manifold;
mod material;

pub use constraint::ContactConstraint;
pub use id::{ContactFeatures, ContactId, NULL_FEATURE};
pub use manifold::{MAX_MANIFOLD_POINTS, Manifold, ManifoldPoint};
pub use material::ContactMaterial;

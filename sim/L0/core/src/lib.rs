//! World container and step driver for planar rigid-body simulation.
//!
//! This crate ties the layer-0 pieces together: bodies from
//! [`sim2d_types`], joints from [`sim2d_constraint`] and contacts from
//! [`sim2d_contact`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          World                               │
//! │  Owns: bodies, joints, contacts (registration order)        │
//! │  Does: validation, manifold intake, stale-contact pruning   │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │  &mut [Body], &mut [AnyJoint], ...
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Solver                              │
//! │  forces → init/warm start → velocity passes →               │
//! │  positions → position passes                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A collaborator that keeps its own arenas can drive [`Solver`] directly
//! and skip [`World`].
//!
//! # Pose Updates
//!
//! Nothing is pushed out of a step. [`World::step`] returns the bodies whose
//! pose changed, and [`World::drain_pose_updates`] picks up edits made
//! between steps.
//!
//! # Quick Start
//!
//! ```
//! use sim2d_core::World;
//! use sim2d_constraint::{JointLimits, PrismaticJoint};
//! use sim2d_types::{Body, SimulationConfig};
//! use nalgebra::Vector2;
//!
//! let mut world = World::new(SimulationConfig::default());
//! let ground = world.add_body(Body::new_static());
//! let slider = world.add_body(Body::new(1.0, 1.0).unwrap());
//!
//! let joint = PrismaticJoint::new(
//!     ground,
//!     slider,
//!     Vector2::zeros(),
//!     Vector2::zeros(),
//!     Vector2::x(),
//!     0.0,
//! )
//! .with_limits(JointLimits::new(-1.0, 1.0));
//! world.add_joint(joint).unwrap();
//!
//! for _ in 0..60 {
//!     world.step_fixed().unwrap();
//! }
//!
//! // Gravity is perpendicular to the axis, so the slider stays put.
//! let body = world.body(slider).unwrap();
//! assert!(body.position().norm() < 1e-3);
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero engine or renderer dependencies**.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod solver;
mod world;

pub use solver::{Solver, SolverStats};
pub use world::{StepStats, World};

pub use sim2d_constraint::{AnyJoint, Joint};
pub use sim2d_contact::{ContactConstraint, ContactMaterial, Manifold};
pub use sim2d_types::{Body, BodyId, JointId, PoseUpdate, Result, SimError, SimulationConfig};

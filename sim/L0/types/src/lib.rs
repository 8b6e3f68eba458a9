//! Core types for planar rigid-body simulation.
//!
//! This crate provides the foundational pieces every other `sim2d-*` crate
//! builds on:
//!
//! - [`Body`] - Mass properties, kinematic state and the symplectic Euler
//!   integrator
//! - [`BodyId`], [`JointId`] - Dense ids handed out in registration order
//! - [`SimulationConfig`], [`SolverSettings`], [`TimeStep`] - Step parameters
//!   and solver tolerances
//! - [`SimError`] - Errors raised at configuration boundaries
//! - [`math`] - 2D cross products and small dense solves
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero engine or renderer dependencies**. The
//! only outward signal a body emits is a polled pose update; whoever renders
//! or synchronizes transforms drains those after each step.
//!
//! # Coordinate System
//!
//! - X: right
//! - Y: up
//! - Positive rotation is counter-clockwise
//!
//! # Example
//!
//! ```
//! use sim2d_types::{Body, DragCoefficients};
//! use nalgebra::Vector2;
//!
//! let mut body = Body::new(1.0, 1.0)
//!     .unwrap()
//!     .with_drag(DragCoefficients::none());
//!
//! body.apply_force(Vector2::new(60.0, 0.0));
//! body.integrate_velocity(1.0 / 60.0);
//! body.integrate_position(1.0 / 60.0);
//!
//! assert!((body.linear_velocity().x - 1.0).abs() < 1e-12);
//! assert!(body.take_pose_update().is_some());
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod body;
mod config;
mod error;
mod id;
mod integrate;
pub mod math;

pub use body::{Body, DragCoefficients, PoseUpdate, Sweep, pair_mut};
pub use config::{SimulationConfig, SolverSettings, TimeStep};
pub use error::SimError;
pub use id::{BodyId, JointId};

// Re-export math types for convenience
pub use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

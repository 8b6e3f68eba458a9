//! Joint constraints for planar rigid bodies.
//!
//! This crate provides the constraint framework the step driver runs and
//! the joints built on it.
//!
//! # Constraint Framework
//!
//! Every constraint implements [`Constraint`]: initialize from current
//! poses, warm start, velocity passes, then nonlinear position passes. The
//! [`Joint`] trait adds reaction queries. A world stores joints as the
//! tagged [`AnyJoint`] so dispatch is a `match`, with each kind's
//! accumulators kept in its own variant.
//!
//! # Joint Types
//!
//! - [`PrismaticJoint`]: Translation along an axis with optional limit and
//!   motor, solved as a 3×3 block when the limit is active
//! - [`RevoluteJoint`]: Pin joint holding two anchors together
//!
//! # Limits
//!
//! A limited coordinate is in one [`LimitState`] per step. Entering a bound
//! from a different regime discards the accumulated limit impulse, so a
//! stale impulse never seeds the new regime.
//!
//! # Example
//!
//! ```
//! use sim2d_constraint::{Constraint, JointLimits, JointMotor, PrismaticJoint};
//! use sim2d_types::{Body, BodyId, SimulationConfig, TimeStep};
//! use nalgebra::Vector2;
//!
//! let mut ground = Body::new_static();
//! let mut slider = Body::new(1.0, 1.0).unwrap();
//!
//! let mut joint = PrismaticJoint::new(
//!     BodyId::new(0),
//!     BodyId::new(1),
//!     Vector2::zeros(),
//!     Vector2::zeros(),
//!     Vector2::x(),
//!     0.0,
//! )
//! .with_limits(JointLimits::new(-1.0, 1.0))
//! .with_motor(JointMotor::velocity(0.5, 100.0));
//!
//! let config = SimulationConfig::default();
//! let step = TimeStep::new(config.timestep, 0.0, &config);
//! joint.init_velocity_constraints(&ground, &slider, &step);
//! joint.warm_start(&mut ground, &mut slider, &step);
//! joint.solve_velocity_constraints(&mut ground, &mut slider, &step);
//!
//! assert!((slider.linear_velocity().x - 0.5).abs() < 1e-9);
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero engine dependencies**.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod constraint;
mod joint;
mod limits;
mod motor;
mod prismatic;
mod revolute;

pub use constraint::{Constraint, PositionError};
pub use joint::{AnyJoint, Joint, JointType};
pub use limits::{JointLimits, LimitState};
pub use motor::JointMotor;
pub use prismatic::PrismaticJoint;
pub use revolute::RevoluteJoint;

// Re-export types needed for constraint computation
pub use sim2d_types::{Body, BodyId, SolverSettings, TimeStep};

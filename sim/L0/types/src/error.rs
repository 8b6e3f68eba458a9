//! Error types for simulation operations.

use thiserror::Error;

/// Errors that can occur while configuring or driving a simulation.
///
/// The per-step solve never produces one of these: a degenerate constraint
/// degrades numerically instead of failing. Errors come from configuration
/// boundaries (mass setters, registration, config validation, timestep).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Invalid body ID referenced.
    #[error("invalid body ID: {0}")]
    InvalidBodyId(u64),

    /// Invalid joint ID referenced.
    #[error("invalid joint ID: {0}")]
    InvalidJointId(u64),

    /// Invalid timestep.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// Invalid mass properties.
    #[error("invalid mass properties: {reason}")]
    InvalidMassProperties {
        /// Description of what's wrong.
        reason: String,
    },

    /// Constraint whose effective mass is singular by construction.
    #[error("degenerate constraint: {reason}")]
    DegenerateConstraint {
        /// Why the constraint cannot be solved.
        reason: String,
    },

    /// A fixed-capacity container is full.
    #[error("{resource} capacity exceeded (limit={limit})")]
    CapacityExceeded {
        /// What resource was exhausted.
        resource: &'static str,
        /// The limit that was exceeded.
        limit: usize,
    },

    /// Simulation diverged (`NaN` or `Inf` detected).
    #[error("simulation diverged: {reason}")]
    Diverged {
        /// Description of what went wrong.
        reason: String,
    },
}

impl SimError {
    /// Create a diverged error.
    #[must_use]
    pub fn diverged(reason: impl Into<String>) -> Self {
        Self::Diverged {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an invalid mass properties error.
    #[must_use]
    pub fn invalid_mass(reason: impl Into<String>) -> Self {
        Self::InvalidMassProperties {
            reason: reason.into(),
        }
    }

    /// Create a degenerate constraint error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateConstraint {
            reason: reason.into(),
        }
    }

    /// Check if this is a divergence error.
    #[must_use]
    pub fn is_diverged(&self) -> bool {
        matches!(self, Self::Diverged { .. })
    }

    /// Check if this is a configuration error.
    ///
    /// Mass and degenerate-constraint errors count as configuration errors:
    /// both are caught before a step runs.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::InvalidMassProperties { .. }
                | Self::DegenerateConstraint { .. }
        )
    }
}

//! Configuration types for simulation.
//!
//! This module provides configuration types that control how the simulation
//! runs: fixed timestep, gravity, iteration counts, and the solver tolerances
//! shared by joints and contacts. [`TimeStep`] is the per-step snapshot the
//! solver actually reads.

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Main configuration for a simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Fixed timestep used by `World::step_fixed` (seconds).
    pub timestep: f64,
    /// Gravity acceleration (m/s²), applied as a force in the velocity phase.
    pub gravity: Vector2<f64>,
    /// Velocity passes per step.
    pub velocity_iterations: usize,
    /// Upper bound on position-correction passes per step.
    pub position_iterations: usize,
    /// Reuse accumulated impulses from the previous step.
    pub warm_starting: bool,
    /// Solver tolerances.
    pub solver: SolverSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            gravity: Vector2::new(0.0, -9.81),
            velocity_iterations: 8,
            position_iterations: 4,
            warm_starting: true,
            solver: SolverSettings::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a new simulation config with the given timestep.
    #[must_use]
    pub fn with_timestep(timestep: f64) -> Self {
        Self {
            timestep,
            ..Default::default()
        }
    }

    /// Create a configuration for real-time simulation (60 Hz).
    #[must_use]
    pub fn realtime() -> Self {
        Self::default()
    }

    /// Create a configuration trading speed for accuracy (240 Hz, more passes).
    #[must_use]
    pub fn high_accuracy() -> Self {
        Self {
            timestep: 1.0 / 240.0,
            velocity_iterations: 20,
            position_iterations: 10,
            ..Default::default()
        }
    }

    /// Disable gravity (zero-G environment).
    #[must_use]
    pub fn zero_gravity(mut self) -> Self {
        self.gravity = Vector2::zeros();
        self
    }

    /// Set the gravity.
    #[must_use]
    pub fn gravity(mut self, gravity: Vector2<f64>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the number of solver iterations.
    #[must_use]
    pub fn iterations(mut self, velocity: usize, position: usize) -> Self {
        self.velocity_iterations = velocity;
        self.position_iterations = position;
        self
    }

    /// Enable or disable warm starting.
    #[must_use]
    pub fn warm_starting(mut self, enabled: bool) -> Self {
        self.warm_starting = enabled;
        self
    }

    /// Set the solver tolerances.
    #[must_use]
    pub fn solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(crate::SimError::InvalidTimestep(self.timestep));
        }

        if self.timestep > 1.0 {
            return Err(crate::SimError::invalid_config(
                "timestep > 1 second is likely an error",
            ));
        }

        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(crate::SimError::invalid_config("gravity must be finite"));
        }

        if self.velocity_iterations == 0 {
            return Err(crate::SimError::invalid_config(
                "velocity_iterations must be at least 1",
            ));
        }

        self.solver.validate()
    }

    /// Get the frequency in Hz.
    #[must_use]
    pub fn frequency(&self) -> f64 {
        1.0 / self.timestep
    }
}

/// Tolerances and gains shared by every constraint solve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverSettings {
    /// Positional error tolerated without correction (m).
    pub linear_slop: f64,
    /// Angular error tolerated without correction (rad).
    pub angular_slop: f64,
    /// Largest positional correction applied in one position pass (m).
    pub max_linear_correction: f64,
    /// Largest angular correction applied in one position pass (rad).
    pub max_angular_correction: f64,
    /// Fraction of contact penetration resolved per position pass.
    pub baumgarte: f64,
    /// Approach speed below which restitution is ignored (m/s).
    pub velocity_threshold: f64,
    /// Resolve contact penetration through bias velocities during the
    /// velocity phase.
    pub split_impulse: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            linear_slop: 0.005,
            angular_slop: 2.0_f64.to_radians(),
            max_linear_correction: 0.2,
            max_angular_correction: 8.0_f64.to_radians(),
            baumgarte: 0.2,
            velocity_threshold: 1.0,
            split_impulse: true,
        }
    }
}

impl SolverSettings {
    /// Validate the settings.
    pub fn validate(&self) -> crate::Result<()> {
        let positive = [
            ("linear_slop", self.linear_slop),
            ("angular_slop", self.angular_slop),
            ("max_linear_correction", self.max_linear_correction),
            ("max_angular_correction", self.max_angular_correction),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(crate::SimError::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        if !self.baumgarte.is_finite() || self.baumgarte <= 0.0 || self.baumgarte > 1.0 {
            return Err(crate::SimError::invalid_config(
                "baumgarte must be in (0, 1]",
            ));
        }

        if !self.velocity_threshold.is_finite() || self.velocity_threshold < 0.0 {
            return Err(crate::SimError::invalid_config(
                "velocity_threshold cannot be negative",
            ));
        }

        Ok(())
    }
}

/// Snapshot of everything one step needs.
///
/// `dt_ratio` is `dt * previous_inv_dt`. It rescales warm-start impulses
/// when the step size changes, and is zero on the very first step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep {
    /// Step duration (s).
    pub dt: f64,
    /// Inverse step duration, or zero when `dt` is zero.
    pub inv_dt: f64,
    /// Current dt over previous dt.
    pub dt_ratio: f64,
    /// Reuse accumulated impulses from the previous step.
    pub warm_starting: bool,
    /// Velocity passes.
    pub velocity_iterations: usize,
    /// Upper bound on position passes.
    pub position_iterations: usize,
    /// Solver tolerances.
    pub settings: SolverSettings,
}

impl TimeStep {
    /// Build the step snapshot from the config and the previous step's `inv_dt`.
    #[must_use]
    pub fn new(dt: f64, previous_inv_dt: f64, config: &SimulationConfig) -> Self {
        let inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };
        Self {
            dt,
            inv_dt,
            dt_ratio: dt * previous_inv_dt,
            warm_starting: config.warm_starting,
            velocity_iterations: config.velocity_iterations,
            position_iterations: config.position_iterations,
            settings: config.solver,
        }
    }

    /// Override the dt ratio.
    #[must_use]
    pub fn with_dt_ratio(mut self, dt_ratio: f64) -> Self {
        self.dt_ratio = dt_ratio;
        self
    }

    /// Override warm starting.
    #[must_use]
    pub fn with_warm_starting(mut self, enabled: bool) -> Self {
        self.warm_starting = enabled;
        self
    }
}

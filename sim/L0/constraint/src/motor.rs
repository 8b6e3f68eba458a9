//! Velocity motors for joints.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A velocity motor driving one joint coordinate.
///
/// Each velocity pass the motor applies whatever impulse brings the joint
/// speed to `speed`, with the accumulated impulse per step bounded by
/// `dt * max_force`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointMotor {
    /// Target joint speed (m/s or rad/s).
    speed: f64,

    /// Maximum force/torque the motor can apply (N or Nm).
    max_force: f64,

    /// Whether the motor is currently enabled.
    enabled: bool,
}

impl JointMotor {
    /// Create an enabled velocity motor.
    ///
    /// # Arguments
    ///
    /// * `speed` - Target velocity (m/s or rad/s)
    /// * `max_force` - Maximum force/torque (N or Nm)
    #[must_use]
    pub fn velocity(speed: f64, max_force: f64) -> Self {
        Self {
            speed,
            max_force: max_force.abs(),
            enabled: true,
        }
    }

    /// Create a disabled motor (free joint).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            speed: 0.0,
            max_force: 0.0,
            enabled: false,
        }
    }

    /// Enable or disable the motor.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Check if the motor is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Target speed.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Force limit.
    #[must_use]
    pub fn max_force(&self) -> f64 {
        self.max_force
    }

    /// Enable or disable in place.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Set the target speed.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Set the force limit. Negative values are taken by magnitude.
    pub fn set_max_force(&mut self, max_force: f64) {
        self.max_force = max_force.abs();
    }

    /// Largest accumulated impulse allowed over a step of length `dt`.
    #[must_use]
    pub fn max_impulse(&self, dt: f64) -> f64 {
        dt * self.max_force
    }
}

impl Default for JointMotor {
    fn default() -> Self {
        Self::disabled()
    }
}

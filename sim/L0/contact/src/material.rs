//! Surface material for a contact pair.

use sim2d_types::{Result, SimError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Friction and restitution used by a contact constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactMaterial {
    /// Coulomb friction coefficient (μ).
    pub friction: f64,
    /// Coefficient of restitution (0 = inelastic, 1 = elastic).
    pub restitution: f64,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            friction: 0.2,
            restitution: 0.0,
        }
    }
}

impl ContactMaterial {
    /// Create a material.
    #[must_use]
    pub fn new(friction: f64, restitution: f64) -> Self {
        Self {
            friction,
            restitution,
        }
    }

    /// No friction, no bounce.
    #[must_use]
    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Combine the materials of two shapes.
    ///
    /// Friction is the geometric mean, restitution the larger of the two.
    #[must_use]
    pub fn mix(a: &Self, b: &Self) -> Self {
        Self {
            friction: (a.friction * b.friction).sqrt(),
            restitution: a.restitution.max(b.restitution),
        }
    }

    /// Validate the material.
    pub fn validate(&self) -> Result<()> {
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(SimError::invalid_config("friction cannot be negative"));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(SimError::invalid_config(
                "restitution must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

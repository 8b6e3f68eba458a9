//! Joint limits and the limit state machine.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Translation or angle bounds for one joint coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointLimits {
    /// Lower bound (minimum position).
    lower: f64,

    /// Upper bound (maximum position).
    upper: f64,
}

impl JointLimits {
    /// Create new limits.
    ///
    /// Reversed bounds are swapped here; nothing downstream checks the order.
    #[must_use]
    pub fn new(lower: f64, upper: f64) -> Self {
        let (lower, upper) = if lower <= upper {
            (lower, upper)
        } else {
            (upper, lower)
        };

        Self { lower, upper }
    }

    /// Create symmetric limits around zero.
    #[must_use]
    pub fn symmetric(bound: f64) -> Self {
        Self::new(-bound.abs(), bound.abs())
    }

    /// Get the lower limit.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Get the upper limit.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Get the range of motion.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.upper - self.lower
    }

    /// Check if a position is within limits.
    #[must_use]
    pub fn contains(&self, position: f64) -> bool {
        position >= self.lower && position <= self.upper
    }

    /// Clamp a position to the limits.
    #[must_use]
    pub fn clamp(&self, position: f64) -> f64 {
        position.clamp(self.lower, self.upper)
    }

    /// Whether the bounds are closer than `2 * linear_slop`.
    #[must_use]
    pub fn is_equal(&self, linear_slop: f64) -> bool {
        (self.upper - self.lower).abs() < 2.0 * linear_slop
    }

    /// Regime a coordinate occupies.
    ///
    /// Touching a bound counts as being at it.
    #[must_use]
    pub fn state(&self, position: f64, linear_slop: f64) -> LimitState {
        if self.is_equal(linear_slop) {
            LimitState::Equal
        } else if position <= self.lower {
            LimitState::AtLower
        } else if position >= self.upper {
            LimitState::AtUpper
        } else {
            LimitState::Inactive
        }
    }
}

impl Default for JointLimits {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Which regime a limited coordinate is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LimitState {
    /// Strictly between the bounds, or the limit is disabled.
    #[default]
    Inactive,
    /// At or below the lower bound; limit impulse must be ≥ 0.
    AtLower,
    /// At or above the upper bound; limit impulse must be ≤ 0.
    AtUpper,
    /// Bounds coincide; the limit row is always active and the motor is
    /// ignored.
    Equal,
}

impl LimitState {
    /// Whether the limit row takes part in the solve.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }

    /// Clamp an accumulated limit impulse to the admissible half-line.
    #[must_use]
    pub fn clamp_impulse(self, impulse: f64) -> f64 {
        match self {
            Self::AtLower => impulse.max(0.0),
            Self::AtUpper => impulse.min(0.0),
            Self::Inactive | Self::Equal => impulse,
        }
    }

    /// Move from `self` to `next`, resetting `impulse` when the old value is
    /// not a valid seed for the new regime.
    ///
    /// Entering a bound from elsewhere resets it; staying at the same bound
    /// keeps it; `Inactive` always clears it; `Equal` never does.
    #[must_use]
    pub fn transition(self, next: Self, impulse: &mut f64) -> Self {
        match next {
            Self::Equal => {}
            Self::AtLower | Self::AtUpper => {
                if self != next {
                    *impulse = 0.0;
                }
            }
            Self::Inactive => *impulse = 0.0,
        }
        next
    }
}

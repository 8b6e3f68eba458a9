//! The capability set shared by joints and contacts.

use sim2d_types::{Body, BodyId, SolverSettings, TimeStep};

/// Residual error reported by one position pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionError {
    /// Largest positional error (m).
    pub linear: f64,
    /// Largest angular error (rad).
    pub angular: f64,
}

impl PositionError {
    /// No error.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            linear: 0.0,
            angular: 0.0,
        }
    }

    /// Create an error.
    #[must_use]
    pub const fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self {
            linear: self.linear.max(other.linear),
            angular: self.angular.max(other.angular),
        }
    }

    /// Whether both components are within `tolerance`.
    ///
    /// A `NaN` component is never within tolerance.
    #[must_use]
    pub fn within(&self, tolerance: &PositionError) -> bool {
        self.linear <= tolerance.linear && self.angular <= tolerance.angular
    }
}

/// A two-body constraint driven by the sequential impulse solver.
///
/// The solver calls the methods in a fixed order each step:
///
/// ```text
/// init_velocity_constraints   once
/// warm_start                  once
/// solve_velocity_constraints  velocity_iterations times
/// (positions integrated)
/// solve_position_constraints  until converged or position_iterations
/// ```
///
/// `a` and `b` are always the bodies named by [`Constraint::bodies`], in that
/// order. Nothing here returns an error: a singular effective mass produces
/// non-finite impulses and the step still completes.
pub trait Constraint {
    /// The two bodies this constraint connects.
    fn bodies(&self) -> (BodyId, BodyId);

    /// Recompute anchors, Jacobian terms and effective mass from the current
    /// poses, and refresh any limit state.
    fn init_velocity_constraints(&mut self, a: &Body, b: &Body, step: &TimeStep);

    /// Scale retained impulses by `step.dt_ratio` and apply them, or zero
    /// them when warm starting is off.
    fn warm_start(&mut self, a: &mut Body, b: &mut Body, step: &TimeStep);

    /// One velocity pass.
    fn solve_velocity_constraints(&mut self, a: &mut Body, b: &mut Body, step: &TimeStep);

    /// One nonlinear position pass. Moves the bodies directly and reports
    /// the error measured before the correction.
    fn solve_position_constraints(
        &mut self,
        a: &mut Body,
        b: &mut Body,
        settings: &SolverSettings,
    ) -> PositionError;

    /// Error below which this constraint counts as converged.
    fn position_tolerance(&self, settings: &SolverSettings) -> PositionError {
        PositionError::new(settings.linear_slop, settings.angular_slop)
    }
}

//! The phase driver.
//!
//! [`Solver::step`] runs one step over borrowed arenas in a fixed order:
//!
//! 1. Integrate forces into velocities
//! 2. Initialize and warm start every joint, then every contact
//! 3. Velocity passes (joints, then contacts, in registration order)
//! 4. Integrate velocities into positions
//! 5. Position passes, stopping early once every constraint is in tolerance
//!
//! Nothing here is reordered or parallelized. Two constraints that share a
//! body always apply their deltas in registration order, which is what makes
//! a step bit-for-bit reproducible.

use nalgebra::Vector2;

use sim2d_constraint::{AnyJoint, Constraint};
use sim2d_contact::ContactConstraint;
use sim2d_types::{Body, SolverSettings, TimeStep, pair_mut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What the solver did during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverStats {
    /// Velocity passes run.
    pub velocity_iterations: usize,
    /// Position passes run, including the one that converged.
    pub position_iterations: usize,
    /// Whether a position pass ended with every constraint in tolerance.
    pub position_converged: bool,
}

/// Stateless step driver.
///
/// Holds only the gravity it applies in phase 1; everything that persists
/// between steps lives in the bodies and constraints it is handed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solver {
    gravity: Vector2<f64>,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(Vector2::zeros())
    }
}

impl Solver {
    /// Create a driver that applies `gravity` as an acceleration.
    #[must_use]
    pub fn new(gravity: Vector2<f64>) -> Self {
        Self { gravity }
    }

    /// The gravity applied in phase 1.
    #[must_use]
    pub fn gravity(&self) -> Vector2<f64> {
        self.gravity
    }

    /// Advance `bodies` by one step.
    ///
    /// Constraints refer to bodies by index into `bodies`. A constraint whose
    /// ids are out of range, equal, or name a disabled body is skipped.
    pub fn step(
        &self,
        bodies: &mut [Body],
        joints: &mut [AnyJoint],
        contacts: &mut [ContactConstraint],
        step: &TimeStep,
    ) -> SolverStats {
        let mut stats = SolverStats::default();

        // 1. Forces into velocities
        for body in bodies.iter_mut().filter(|b| b.is_enabled()) {
            if body.is_active() && !body.ignores_gravity() {
                body.apply_force(self.gravity * body.mass());
            }
            body.integrate_velocity(step.dt);
            if body.is_active() {
                body.apply_queued_impulses();
            }
        }

        // 2. Initialize + warm start
        for_each_pair(bodies, joints, |c, a, b| {
            c.init_velocity_constraints(a, b, step);
            c.warm_start(a, b, step);
        });
        for_each_pair(bodies, contacts, |c, a, b| {
            c.init_velocity_constraints(a, b, step);
            c.warm_start(a, b, step);
        });

        // 3. Velocity passes
        for _ in 0..step.velocity_iterations {
            for_each_pair(bodies, joints, |c, a, b| {
                c.solve_velocity_constraints(a, b, step);
            });
            for_each_pair(bodies, contacts, |c, a, b| {
                c.solve_velocity_constraints(a, b, step);
            });
            stats.velocity_iterations += 1;
        }

        // 4. Velocities into positions
        for body in bodies.iter_mut().filter(|b| b.is_enabled()) {
            body.integrate_position(step.dt);
        }
        // Continuous collision would run here: poses are integrated and each
        // sweep holds the start and end of the motion.

        // 5. Position passes
        for _ in 0..step.position_iterations {
            let joints_ok = solve_positions(bodies, joints, &step.settings);
            let contacts_ok = solve_positions(bodies, contacts, &step.settings);
            stats.position_iterations += 1;

            if joints_ok && contacts_ok {
                stats.position_converged = true;
                tracing::debug!(
                    iterations = stats.position_iterations,
                    "position correction converged"
                );
                break;
            }
        }

        stats
    }
}

/// Run `f` on every constraint whose two bodies exist and are enabled.
fn for_each_pair<C, F>(bodies: &mut [Body], constraints: &mut [C], mut f: F)
where
    C: Constraint,
    F: FnMut(&mut C, &mut Body, &mut Body),
{
    for constraint in constraints.iter_mut() {
        let (id_a, id_b) = constraint.bodies();
        let Some((a, b)) = pair_mut(bodies, id_a, id_b) else {
            continue;
        };
        if a.is_enabled() && b.is_enabled() {
            f(constraint, a, b);
        }
    }
}

/// One position pass. Returns whether every constraint is within tolerance.
fn solve_positions<C: Constraint>(
    bodies: &mut [Body],
    constraints: &mut [C],
    settings: &SolverSettings,
) -> bool {
    let mut converged = true;
    for_each_pair(bodies, constraints, |c, a, b| {
        let error = c.solve_position_constraints(a, b, settings);
        converged &= error.within(&c.position_tolerance(settings));
    });
    converged
}

//! Revolute (pin) joint: two anchors held coincident, rotation free.

use nalgebra::{Matrix2, Vector2};
use sim2d_types::math::{cross, solve22};
use sim2d_types::{Body, BodyId, SolverSettings, TimeStep};

use crate::{Constraint, PositionError};

/// Point-to-point constraint with a 2×2 effective mass.
#[derive(Debug, Clone)]
pub struct RevoluteJoint {
    body_a: BodyId,
    body_b: BodyId,
    local_anchor_a: Vector2<f64>,
    local_anchor_b: Vector2<f64>,
    impulse: Vector2<f64>,

    // Per-step values.
    r1: Vector2<f64>,
    r2: Vector2<f64>,
    k: Matrix2<f64>,
}

impl RevoluteJoint {
    /// Create a revolute joint from body-local anchors.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: BodyId,
        local_anchor_a: Vector2<f64>,
        local_anchor_b: Vector2<f64>,
    ) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            impulse: Vector2::zeros(),
            r1: Vector2::zeros(),
            r2: Vector2::zeros(),
            k: Matrix2::zeros(),
        }
    }

    /// Create a revolute joint pinned at a world point.
    #[must_use]
    pub fn from_world(
        id_a: BodyId,
        body_a: &Body,
        id_b: BodyId,
        body_b: &Body,
        world_anchor: Vector2<f64>,
    ) -> Self {
        Self::new(
            id_a,
            id_b,
            body_a.local_point(&world_anchor),
            body_b.local_point(&world_anchor),
        )
    }

    /// Anchor on body A in world space.
    #[must_use]
    pub fn anchor_a(&self, a: &Body) -> Vector2<f64> {
        a.world_point(&self.local_anchor_a)
    }

    /// Anchor on body B in world space.
    #[must_use]
    pub fn anchor_b(&self, b: &Body) -> Vector2<f64> {
        b.world_point(&self.local_anchor_b)
    }

    /// Accumulated point impulse.
    #[must_use]
    pub fn impulse(&self) -> Vector2<f64> {
        self.impulse
    }

    /// Force on body B from the joint over the last step.
    #[must_use]
    pub fn reaction_force(&self, inv_dt: f64) -> Vector2<f64> {
        self.impulse * inv_dt
    }

    /// A pin transmits no torque.
    #[must_use]
    pub fn reaction_torque(&self, _inv_dt: f64) -> f64 {
        0.0
    }

    fn apply(&self, a: &mut Body, b: &mut Body, p: &Vector2<f64>) {
        a.apply_constraint_impulse(-p, -cross(&self.r1, p));
        b.apply_constraint_impulse(*p, cross(&self.r2, p));
    }
}

fn point_mass(a: &Body, b: &Body, r1: &Vector2<f64>, r2: &Vector2<f64>) -> Matrix2<f64> {
    let (m1, i1) = (a.inv_mass(), a.inv_inertia());
    let (m2, i2) = (b.inv_mass(), b.inv_inertia());
    let k11 = m1 + m2 + i1 * r1.y * r1.y + i2 * r2.y * r2.y;
    let k12 = -i1 * r1.x * r1.y - i2 * r2.x * r2.y;
    let k22 = m1 + m2 + i1 * r1.x * r1.x + i2 * r2.x * r2.x;
    Matrix2::new(k11, k12, k12, k22)
}

impl Constraint for RevoluteJoint {
    fn bodies(&self) -> (BodyId, BodyId) {
        (self.body_a, self.body_b)
    }

    fn init_velocity_constraints(&mut self, a: &Body, b: &Body, _step: &TimeStep) {
        self.r1 = a.world_vector(&self.local_anchor_a);
        self.r2 = b.world_vector(&self.local_anchor_b);
        self.k = point_mass(a, b, &self.r1, &self.r2);
    }

    fn warm_start(&mut self, a: &mut Body, b: &mut Body, step: &TimeStep) {
        if step.warm_starting {
            self.impulse *= step.dt_ratio;
            let p = self.impulse;
            self.apply(a, b, &p);
        } else {
            self.impulse = Vector2::zeros();
        }
    }

    fn solve_velocity_constraints(&mut self, a: &mut Body, b: &mut Body, _step: &TimeStep) {
        let cdot = b.velocity_at_world_offset(&self.r2) - a.velocity_at_world_offset(&self.r1);
        let delta = solve22(&self.k, &-cdot);
        self.impulse += delta;
        self.apply(a, b, &delta);
    }

    fn solve_position_constraints(
        &mut self,
        a: &mut Body,
        b: &mut Body,
        _settings: &SolverSettings,
    ) -> PositionError {
        let r1 = a.world_vector(&self.local_anchor_a);
        let r2 = b.world_vector(&self.local_anchor_b);
        let c = b.position() + r2 - a.position() - r1;

        let k = point_mass(a, b, &r1, &r2);
        let p = solve22(&k, &-c);
        a.apply_position_correction(-p, -cross(&r1, &p));
        b.apply_position_correction(p, cross(&r2, &p));

        PositionError::new(c.norm(), 0.0)
    }
}

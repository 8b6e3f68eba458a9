//! Impulse contact constraint.
//!
//! Per manifold point, two rows:
//!
//! ```text
//! normal   λn ≥ 0                  target speed = restitution bias
//! tangent  |λt| ≤ friction · λn    target speed = 0
//! ```
//!
//! With split impulses enabled, a third row per point pushes penetration
//! beyond `linear_slop` out through bias velocities only, at rate
//! `baumgarte / dt`, so the push-out never shows up as real velocity.

use nalgebra::Vector2;
use smallvec::SmallVec;

use sim2d_constraint::{Constraint, PositionError};
use sim2d_types::math::{cross, cross_vs};
use sim2d_types::{Body, BodyId, SolverSettings, TimeStep};

use crate::{ContactMaterial, MAX_MANIFOLD_POINTS, Manifold};

/// Per-point values computed in `init_velocity_constraints`.
#[derive(Debug, Clone, Copy)]
struct PointCache {
    r1: Vector2<f64>,
    r2: Vector2<f64>,
    normal_mass: f64,
    tangent_mass: f64,
    velocity_bias: f64,
    bias_target: f64,
    bias_impulse: f64,
    position_impulse: f64,
}

/// Contact between two bodies, solved like a joint.
#[derive(Debug, Clone)]
pub struct ContactConstraint {
    body_a: BodyId,
    body_b: BodyId,
    manifold: Manifold,
    material: ContactMaterial,
    tangent: Vector2<f64>,
    split_impulse: bool,
    cache: SmallVec<[PointCache; MAX_MANIFOLD_POINTS]>,
}

impl ContactConstraint {
    /// Create a contact. The manifold's accumulators are used as given.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: BodyId,
        manifold: Manifold,
        material: ContactMaterial,
    ) -> Self {
        Self {
            body_a,
            body_b,
            manifold,
            material,
            tangent: Vector2::zeros(),
            split_impulse: false,
            cache: SmallVec::new(),
        }
    }

    /// The manifold with its accumulators.
    #[must_use]
    pub fn manifold(&self) -> &Manifold {
        &self.manifold
    }

    /// The pair's material.
    #[must_use]
    pub fn material(&self) -> &ContactMaterial {
        &self.material
    }

    /// Replace the material.
    pub fn set_material(&mut self, material: ContactMaterial) {
        self.material = material;
    }

    /// Install this frame's manifold, carrying impulses over from the
    /// current one by contact id. Returns the number of matched points.
    pub fn update_manifold(&mut self, mut manifold: Manifold) -> usize {
        let matched = manifold.carry_impulses_from(&self.manifold);
        tracing::trace!(
            body_a = %self.body_a,
            body_b = %self.body_b,
            points = manifold.point_count(),
            matched,
            "contact manifold updated"
        );
        self.manifold = manifold;
        matched
    }

    /// Whether this contact joins `a` and `b`, in either order.
    #[must_use]
    pub fn connects(&self, a: BodyId, b: BodyId) -> bool {
        (self.body_a == a && self.body_b == b) || (self.body_a == b && self.body_b == a)
    }

    /// Normal force over the last step.
    #[must_use]
    pub fn normal_force(&self, inv_dt: f64) -> f64 {
        self.manifold.total_normal_impulse() * inv_dt
    }

    fn apply(a: &mut Body, b: &mut Body, c: &PointCache, p: &Vector2<f64>) {
        a.apply_constraint_impulse(-p, -cross(&c.r1, p));
        b.apply_constraint_impulse(*p, cross(&c.r2, p));
    }
}

fn row_mass(a: &Body, b: &Body, r1: &Vector2<f64>, r2: &Vector2<f64>, dir: &Vector2<f64>) -> f64 {
    let rn1 = cross(r1, dir);
    let rn2 = cross(r2, dir);
    let k = a.inv_mass() + b.inv_mass() + a.inv_inertia() * rn1 * rn1 + b.inv_inertia() * rn2 * rn2;
    1.0 / k
}

impl Constraint for ContactConstraint {
    fn bodies(&self) -> (BodyId, BodyId) {
        (self.body_a, self.body_b)
    }

    fn init_velocity_constraints(&mut self, a: &Body, b: &Body, step: &TimeStep) {
        let settings = &step.settings;
        let normal = self.manifold.normal;
        self.tangent = cross_vs(&normal, 1.0);
        self.split_impulse = settings.split_impulse;

        self.cache.clear();
        for point in self.manifold.points() {
            let r1 = a.world_vector(&point.local_point_a);
            let r2 = b.world_vector(&point.local_point_b);

            let approach = normal
                .dot(&(b.velocity_at_world_offset(&r2) - a.velocity_at_world_offset(&r1)));
            let velocity_bias = if approach < -settings.velocity_threshold {
                -self.material.restitution * approach
            } else {
                0.0
            };

            let penetration = (-point.separation - settings.linear_slop).max(0.0);

            self.cache.push(PointCache {
                r1,
                r2,
                normal_mass: row_mass(a, b, &r1, &r2, &normal),
                tangent_mass: row_mass(a, b, &r1, &r2, &self.tangent),
                velocity_bias,
                bias_target: settings.baumgarte * step.inv_dt * penetration,
                bias_impulse: 0.0,
                position_impulse: 0.0,
            });
        }
    }

    fn warm_start(&mut self, a: &mut Body, b: &mut Body, step: &TimeStep) {
        let normal = self.manifold.normal;
        let tangent = self.tangent;
        for (point, c) in self.manifold.points_mut().iter_mut().zip(&self.cache) {
            if step.warm_starting {
                point.normal_impulse *= step.dt_ratio;
                point.tangent_impulse *= step.dt_ratio;
                let p = normal * point.normal_impulse + tangent * point.tangent_impulse;
                Self::apply(a, b, c, &p);
            } else {
                point.normal_impulse = 0.0;
                point.tangent_impulse = 0.0;
            }
        }
    }

    fn solve_velocity_constraints(&mut self, a: &mut Body, b: &mut Body, _step: &TimeStep) {
        let normal = self.manifold.normal;
        let tangent = self.tangent;
        let friction = self.material.friction;
        let split = self.split_impulse;

        for (point, c) in self.manifold.points_mut().iter_mut().zip(self.cache.iter_mut()) {
            // Normal row.
            let dv = b.velocity_at_world_offset(&c.r2) - a.velocity_at_world_offset(&c.r1);
            let vn = dv.dot(&normal);
            let lambda = -c.normal_mass * (vn - c.velocity_bias);
            let old = point.normal_impulse;
            point.normal_impulse = (old + lambda).max(0.0);
            Self::apply(a, b, c, &(normal * (point.normal_impulse - old)));

            // Friction row, bounded by the updated normal impulse.
            let dv = b.velocity_at_world_offset(&c.r2) - a.velocity_at_world_offset(&c.r1);
            let vt = dv.dot(&tangent);
            let lambda = -c.tangent_mass * vt;
            let max_friction = friction * point.normal_impulse;
            let old = point.tangent_impulse;
            point.tangent_impulse = (old + lambda).clamp(-max_friction, max_friction);
            Self::apply(a, b, c, &(tangent * (point.tangent_impulse - old)));

            // Split-impulse row.
            if split {
                let dvb = b.bias_velocity_at_world_offset(&c.r2)
                    - a.bias_velocity_at_world_offset(&c.r1);
                let lambda = -c.normal_mass * (dvb.dot(&normal) - c.bias_target);
                let old = c.bias_impulse;
                c.bias_impulse = (old + lambda).max(0.0);
                let p = normal * (c.bias_impulse - old);
                a.apply_bias_impulse(-p, -cross(&c.r1, &p));
                b.apply_bias_impulse(p, cross(&c.r2, &p));
            }
        }
    }

    fn solve_position_constraints(
        &mut self,
        a: &mut Body,
        b: &mut Body,
        settings: &SolverSettings,
    ) -> PositionError {
        let normal = self.manifold.normal;
        let mut min_separation = 0.0_f64;

        for (point, c) in self.manifold.points().iter().zip(self.cache.iter_mut()) {
            let r1 = a.world_vector(&point.local_point_a);
            let r2 = b.world_vector(&point.local_point_b);

            // Separation re-estimated from how far the two contact points
            // have moved apart along the normal since detection.
            let dp = (b.position() + r2) - (a.position() + r1);
            let separation = dp.dot(&normal) + point.separation;
            min_separation = min_separation.min(separation);

            let correction = settings.baumgarte
                * (separation + settings.linear_slop).clamp(-settings.max_linear_correction, 0.0);
            let lambda = -row_mass(a, b, &r1, &r2, &normal) * correction;

            let old = c.position_impulse;
            c.position_impulse = (old + lambda).max(0.0);
            let p = normal * (c.position_impulse - old);
            a.apply_position_correction(-p, -cross(&r1, &p));
            b.apply_position_correction(p, cross(&r2, &p));
        }

        PositionError::new(-min_separation, 0.0)
    }

    fn position_tolerance(&self, settings: &SolverSettings) -> PositionError {
        PositionError::new(1.5 * settings.linear_slop, settings.angular_slop)
    }
}

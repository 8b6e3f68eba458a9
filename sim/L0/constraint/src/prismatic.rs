//! Prismatic (translational) joint.
//!
//! Body B may slide along an axis fixed in body A and may not rotate
//! relative to A. Three rows:
//!
//! ```text
//! row 0  perpendicular   perp · d           = 0
//! row 1  angular         θb - θa - θref     = 0
//! row 2  limit / motor   axis · d           ∈ [lower, upper]
//! ```
//!
//! where `d` is the separation of the two anchors. Rows 0-1 are always
//! solved as a 2×2 block. When the limit is active, all three are solved as
//! a 3×3 block with the limit impulse clamped to its half-line, and the
//! first two rows are re-solved against the clamped value. The motor is a
//! separate scalar row on the axis, solved first.

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};
use sim2d_types::math::{cross, cross_sv, rotate, solve22, solve33};
use sim2d_types::{Body, BodyId, SolverSettings, TimeStep};

use crate::{Constraint, JointLimits, JointMotor, LimitState, PositionError};

/// Anchor geometry at the current poses.
#[derive(Debug, Clone, Copy)]
struct Frame {
    r1: Vector2<f64>,
    r2: Vector2<f64>,
    d: Vector2<f64>,
    axis: Vector2<f64>,
    perp: Vector2<f64>,
    a1: f64,
    a2: f64,
    s1: f64,
    s2: f64,
}

/// Per-step values computed in `init_velocity_constraints`.
#[derive(Debug, Clone, Copy)]
struct StepCache {
    axis: Vector2<f64>,
    perp: Vector2<f64>,
    a1: f64,
    a2: f64,
    s1: f64,
    s2: f64,
    k: Matrix3<f64>,
    motor_mass: f64,
}

impl StepCache {
    fn zeroed() -> Self {
        Self {
            axis: Vector2::zeros(),
            perp: Vector2::zeros(),
            a1: 0.0,
            a2: 0.0,
            s1: 0.0,
            s2: 0.0,
            k: Matrix3::zeros(),
            motor_mass: 0.0,
        }
    }
}

/// Prismatic joint with optional limit and motor.
#[derive(Debug, Clone)]
pub struct PrismaticJoint {
    body_a: BodyId,
    body_b: BodyId,
    local_anchor_a: Vector2<f64>,
    local_anchor_b: Vector2<f64>,
    local_x_axis: Vector2<f64>,
    local_y_axis: Vector2<f64>,
    reference_angle: f64,

    limit_enabled: bool,
    limits: JointLimits,
    limit_state: LimitState,
    motor: JointMotor,

    /// Accumulated (perpendicular, angular, limit) impulse.
    impulse: Vector3<f64>,
    motor_impulse: f64,

    cache: StepCache,
}

impl PrismaticJoint {
    /// Create a prismatic joint from body-local frames.
    ///
    /// `local_axis_a` is normalized. `reference_angle` is the relative angle
    /// `θb - θa` the joint holds.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: BodyId,
        local_anchor_a: Vector2<f64>,
        local_anchor_b: Vector2<f64>,
        local_axis_a: Vector2<f64>,
        reference_angle: f64,
    ) -> Self {
        let local_x_axis = local_axis_a
            .try_normalize(f64::EPSILON)
            .unwrap_or(local_axis_a);
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            local_x_axis,
            local_y_axis: cross_sv(1.0, &local_x_axis),
            reference_angle,
            limit_enabled: false,
            limits: JointLimits::default(),
            limit_state: LimitState::Inactive,
            motor: JointMotor::disabled(),
            impulse: Vector3::zeros(),
            motor_impulse: 0.0,
            cache: StepCache::zeroed(),
        }
    }

    /// Create a prismatic joint from a world anchor and axis at the bodies'
    /// current poses.
    #[must_use]
    pub fn from_world(
        id_a: BodyId,
        body_a: &Body,
        id_b: BodyId,
        body_b: &Body,
        world_anchor: Vector2<f64>,
        world_axis: Vector2<f64>,
    ) -> Self {
        Self::new(
            id_a,
            id_b,
            body_a.local_point(&world_anchor),
            body_b.local_point(&world_anchor),
            body_a.local_vector(&world_axis),
            body_b.total_rotation() - body_a.total_rotation(),
        )
    }

    /// Set and enable translation limits.
    #[must_use]
    pub fn with_limits(mut self, limits: JointLimits) -> Self {
        self.limits = limits;
        self.limit_enabled = true;
        self
    }

    /// Set the motor.
    #[must_use]
    pub fn with_motor(mut self, motor: JointMotor) -> Self {
        self.motor = motor;
        self
    }

    /// Anchor on body A, in A's frame.
    #[must_use]
    pub fn local_anchor_a(&self) -> Vector2<f64> {
        self.local_anchor_a
    }

    /// Anchor on body B, in B's frame.
    #[must_use]
    pub fn local_anchor_b(&self) -> Vector2<f64> {
        self.local_anchor_b
    }

    /// Unit slide axis in A's frame.
    #[must_use]
    pub fn local_axis_a(&self) -> Vector2<f64> {
        self.local_x_axis
    }

    /// Held relative angle.
    #[must_use]
    pub fn reference_angle(&self) -> f64 {
        self.reference_angle
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

    /// Signed anchor separation along the axis.
    #[must_use]
    pub fn joint_translation(&self, a: &Body, b: &Body) -> f64 {
        let d = self.anchor_b(b) - self.anchor_a(a);
        d.dot(&a.world_vector(&self.local_x_axis))
    }

    /// Rate of change of [`PrismaticJoint::joint_translation`].
    #[must_use]
    pub fn joint_speed(&self, a: &Body, b: &Body) -> f64 {
        let f = self.frame(a, b);
        let w1 = a.angular_velocity();
        f.d.dot(&cross_sv(w1, &f.axis))
            + f.axis.dot(
                &(b.velocity_at_world_offset(&f.r2) - a.velocity_at_world_offset(&f.r1)),
            )
    }

    /// Whether the limit is enforced.
    #[must_use]
    pub fn is_limit_enabled(&self) -> bool {
        self.limit_enabled
    }

    /// Enable or disable the limit.
    pub fn enable_limit(&mut self, enabled: bool) {
        self.limit_enabled = enabled;
    }

    /// Translation limits.
    #[must_use]
    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }

    /// Replace the translation limits.
    pub fn set_limits(&mut self, lower: f64, upper: f64) {
        self.limits = JointLimits::new(lower, upper);
    }

    /// Current limit regime, refreshed each step.
    #[must_use]
    pub fn limit_state(&self) -> LimitState {
        self.limit_state
    }

    /// The motor.
    #[must_use]
    pub fn motor(&self) -> &JointMotor {
        &self.motor
    }

    /// Whether the motor is enabled.
    #[must_use]
    pub fn is_motor_enabled(&self) -> bool {
        self.motor.is_enabled()
    }

    /// Enable or disable the motor.
    pub fn enable_motor(&mut self, enabled: bool) {
        self.motor.set_enabled(enabled);
    }

    /// Target motor speed.
    #[must_use]
    pub fn motor_speed(&self) -> f64 {
        self.motor.speed()
    }

    /// Set the target motor speed.
    pub fn set_motor_speed(&mut self, speed: f64) {
        self.motor.set_speed(speed);
    }

    /// Motor force limit.
    #[must_use]
    pub fn max_motor_force(&self) -> f64 {
        self.motor.max_force()
    }

    /// Set the motor force limit.
    pub fn set_max_motor_force(&mut self, force: f64) {
        self.motor.set_max_force(force);
    }

    /// Accumulated (perpendicular, angular, limit) impulse.
    #[must_use]
    pub fn impulse(&self) -> Vector3<f64> {
        self.impulse
    }

    /// Accumulated motor impulse.
    #[must_use]
    pub fn motor_impulse(&self) -> f64 {
        self.motor_impulse
    }

    /// Motor force over the last step.
    #[must_use]
    pub fn motor_force(&self, inv_dt: f64) -> f64 {
        inv_dt * self.motor_impulse
    }

    /// Force on body B from the joint over the last step.
    #[must_use]
    pub fn reaction_force(&self, inv_dt: f64) -> Vector2<f64> {
        let c = &self.cache;
        (c.perp * self.impulse.x + c.axis * (self.motor_impulse + self.impulse.z)) * inv_dt
    }

    /// Torque on body B from the joint over the last step.
    #[must_use]
    pub fn reaction_torque(&self, inv_dt: f64) -> f64 {
        inv_dt * self.impulse.y
    }

    fn frame(&self, a: &Body, b: &Body) -> Frame {
        let r1 = a.world_vector(&self.local_anchor_a);
        let r2 = b.world_vector(&self.local_anchor_b);
        let d = b.position() + r2 - a.position() - r1;
        let axis = rotate(a.rotation(), &self.local_x_axis);
        let perp = rotate(a.rotation(), &self.local_y_axis);
        let arm = d + r1;
        Frame {
            r1,
            r2,
            d,
            axis,
            perp,
            a1: cross(&arm, &axis),
            a2: cross(&r2, &axis),
            s1: cross(&arm, &perp),
            s2: cross(&r2, &perp),
        }
    }

    /// Apply an impulse in row space to both bodies.
    fn apply(a: &mut Body, b: &mut Body, f: &Frame, impulse: &Vector3<f64>) {
        let p = f.perp * impulse.x + f.axis * impulse.z;
        let l1 = impulse.x * f.s1 + impulse.y + impulse.z * f.a1;
        let l2 = impulse.x * f.s2 + impulse.y + impulse.z * f.a2;
        a.apply_constraint_impulse(-p, -l1);
        b.apply_constraint_impulse(p, l2);
    }

    fn cached_frame(&self) -> Frame {
        let c = &self.cache;
        Frame {
            r1: Vector2::zeros(),
            r2: Vector2::zeros(),
            d: Vector2::zeros(),
            axis: c.axis,
            perp: c.perp,
            a1: c.a1,
            a2: c.a2,
            s1: c.s1,
            s2: c.s2,
        }
    }
}

/// Effective mass of the three rows.
fn effective_mass(m1: f64, i1: f64, m2: f64, i2: f64, f: &Frame) -> Matrix3<f64> {
    let k11 = m1 + m2 + i1 * f.s1 * f.s1 + i2 * f.s2 * f.s2;
    let k12 = i1 * f.s1 + i2 * f.s2;
    let k13 = i1 * f.s1 * f.a1 + i2 * f.s2 * f.a2;
    let k22 = i1 + i2;
    let k23 = i1 * f.a1 + i2 * f.a2;
    let k33 = m1 + m2 + i1 * f.a1 * f.a1 + i2 * f.a2 * f.a2;
    Matrix3::new(k11, k12, k13, k12, k22, k23, k13, k23, k33)
}

fn upper_block(k: &Matrix3<f64>) -> Matrix2<f64> {
    Matrix2::new(k[(0, 0)], k[(0, 1)], k[(1, 0)], k[(1, 1)])
}

impl Constraint for PrismaticJoint {
    fn bodies(&self) -> (BodyId, BodyId) {
        (self.body_a, self.body_b)
    }

    fn init_velocity_constraints(&mut self, a: &Body, b: &Body, step: &TimeStep) {
        let f = self.frame(a, b);
        let (m1, i1) = (a.inv_mass(), a.inv_inertia());
        let (m2, i2) = (b.inv_mass(), b.inv_inertia());

        let k = effective_mass(m1, i1, m2, i2, &f);
        self.cache = StepCache {
            axis: f.axis,
            perp: f.perp,
            a1: f.a1,
            a2: f.a2,
            s1: f.s1,
            s2: f.s2,
            k,
            motor_mass: 1.0 / k[(2, 2)],
        };

        let previous = self.limit_state;
        let next = if self.limit_enabled {
            let translation = f.axis.dot(&f.d);
            self.limits.state(translation, step.settings.linear_slop)
        } else {
            LimitState::Inactive
        };
        self.limit_state = previous.transition(next, &mut self.impulse.z);
        if previous != self.limit_state {
            tracing::trace!(?previous, next = ?self.limit_state, "prismatic limit state changed");
        }

        if !self.motor.is_enabled() {
            self.motor_impulse = 0.0;
        }
    }

    fn warm_start(&mut self, a: &mut Body, b: &mut Body, step: &TimeStep) {
        if !step.warm_starting {
            self.impulse = Vector3::zeros();
            self.motor_impulse = 0.0;
            return;
        }

        self.impulse *= step.dt_ratio;
        self.motor_impulse *= step.dt_ratio;

        let f = self.cached_frame();
        let mut applied = self.impulse;
        applied.z += self.motor_impulse;
        Self::apply(a, b, &f, &applied);
    }

    fn solve_velocity_constraints(&mut self, a: &mut Body, b: &mut Body, step: &TimeStep) {
        let f = self.cached_frame();
        let c = self.cache;

        let axial_speed = |a: &Body, b: &Body| {
            c.axis.dot(&(b.linear_velocity() - a.linear_velocity()))
                + c.a2 * b.angular_velocity()
                - c.a1 * a.angular_velocity()
        };

        // Motor row.
        if self.motor.is_enabled() && self.limit_state != LimitState::Equal {
            let cdot = axial_speed(a, b);
            let impulse = c.motor_mass * (self.motor.speed() - cdot);
            let old = self.motor_impulse;
            let max = self.motor.max_impulse(step.dt);
            self.motor_impulse = (old + impulse).clamp(-max, max);
            let delta = self.motor_impulse - old;
            Self::apply(a, b, &f, &Vector3::new(0.0, 0.0, delta));
        }

        let cdot1 = Vector2::new(
            c.perp.dot(&(b.linear_velocity() - a.linear_velocity())) + c.s2 * b.angular_velocity()
                - c.s1 * a.angular_velocity(),
            b.angular_velocity() - a.angular_velocity(),
        );

        if self.limit_enabled && self.limit_state.is_active() {
            // Block solve, clamp the limit row, then re-solve the first two
            // rows against the clamped limit impulse.
            let cdot = Vector3::new(cdot1.x, cdot1.y, axial_speed(a, b));
            let f1 = self.impulse;
            self.impulse += solve33(&c.k, &-cdot);
            self.impulse.z = self.limit_state.clamp_impulse(self.impulse.z);

            let col3 = Vector2::new(c.k[(0, 2)], c.k[(1, 2)]);
            let rhs = -cdot1 - col3 * (self.impulse.z - f1.z);
            let f2r = solve22(&upper_block(&c.k), &rhs) + f1.xy();
            self.impulse.x = f2r.x;
            self.impulse.y = f2r.y;

            let delta = self.impulse - f1;
            Self::apply(a, b, &f, &delta);
        } else {
            let delta = solve22(&upper_block(&c.k), &-cdot1);
            self.impulse.x += delta.x;
            self.impulse.y += delta.y;
            Self::apply(a, b, &f, &Vector3::new(delta.x, delta.y, 0.0));
        }
    }

    fn solve_position_constraints(
        &mut self,
        a: &mut Body,
        b: &mut Body,
        settings: &SolverSettings,
    ) -> PositionError {
        let f = self.frame(a, b);
        let max_correction = settings.max_linear_correction;
        let slop = settings.linear_slop;

        let mut linear_error = 0.0_f64;
        let mut limit_c = None;
        if self.limit_enabled {
            let translation = f.axis.dot(&f.d);
            let (lower, upper) = (self.limits.lower(), self.limits.upper());
            match self.limits.state(translation, slop) {
                LimitState::Equal => {
                    let c = translation - lower;
                    limit_c = Some(c.clamp(-max_correction, max_correction));
                    linear_error = c.abs();
                }
                LimitState::AtLower => {
                    limit_c = Some((translation - lower + slop).clamp(-max_correction, 0.0));
                    linear_error = lower - translation;
                }
                LimitState::AtUpper => {
                    limit_c = Some((translation - upper - slop).clamp(0.0, max_correction));
                    linear_error = translation - upper;
                }
                LimitState::Inactive => {}
            }
        }

        let c1 = Vector2::new(
            f.perp.dot(&f.d),
            b.total_rotation() - a.total_rotation() - self.reference_angle,
        );
        let error = PositionError::new(linear_error.max(c1.x.abs()), c1.y.abs());
        let max_angle = settings.max_angular_correction;
        let c1 = Vector2::new(c1.x, c1.y.clamp(-max_angle, max_angle));

        let k = effective_mass(a.inv_mass(), a.inv_inertia(), b.inv_mass(), b.inv_inertia(), &f);
        let impulse = match limit_c {
            Some(c2) => solve33(&k, &-Vector3::new(c1.x, c1.y, c2)),
            None => {
                let i = solve22(&upper_block(&k), &-c1);
                Vector3::new(i.x, i.y, 0.0)
            }
        };

        let p = f.perp * impulse.x + f.axis * impulse.z;
        let l1 = impulse.x * f.s1 + impulse.y + impulse.z * f.a1;
        let l2 = impulse.x * f.s2 + impulse.y + impulse.z * f.a2;
        a.apply_position_correction(-p, -l1);
        b.apply_position_correction(p, l2);

        error
    }
}

//! Planar rigid body.
//!
//! A [`Body`] owns its mass properties and kinematic state. Rotation is stored
//! wrapped into `(0, 2π]` next to a revolution counter, so
//! [`Body::total_rotation`] stays continuous however far the body spins.
//!
//! Every mutation of position or rotation marks the body; the owner polls the
//! mark with [`Body::take_pose_update`] instead of registering a callback.
//!
//! Integration lives in `integrate.rs`.

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::math::{TWO_PI, cross, cross_sv, rotate, rotate_inv};
use crate::{BodyId, Result, SimError};

/// Largest whole-turn count an `f64` holds exactly (2^53).
const MAX_EXACT_TURNS: f64 = 9_007_199_254_740_992.0;

/// Drag applied during velocity integration.
///
/// Linear drag is `-linear * v`, plus `-quadratic * |v| * v` when
/// `quadratic_enabled`. Rotational drag is `-rotational * w * |w|`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DragCoefficients {
    /// Linear drag coefficient.
    pub linear: f64,
    /// Quadratic drag coefficient.
    pub quadratic: f64,
    /// Rotational drag coefficient.
    pub rotational: f64,
    /// Whether quadratic drag is applied.
    pub quadratic_enabled: bool,
}

impl Default for DragCoefficients {
    /// Coefficients tuned for a unit-mass body.
    fn default() -> Self {
        Self {
            linear: 0.001,
            quadratic: 0.001,
            rotational: 0.001,
            quadratic_enabled: false,
        }
    }
}

impl DragCoefficients {
    /// No drag at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            linear: 0.0,
            quadratic: 0.0,
            rotational: 0.0,
            quadratic_enabled: false,
        }
    }

    /// Enable quadratic drag.
    #[must_use]
    pub const fn with_quadratic(mut self, coefficient: f64) -> Self {
        self.quadratic = coefficient;
        self.quadratic_enabled = true;
        self
    }
}

/// Previous and current center position and (unwrapped) angle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sweep {
    /// Center at the start of the last position integration.
    pub c0: Vector2<f64>,
    /// Angle at the start of the last position integration.
    pub a0: f64,
    /// Current center.
    pub c: Vector2<f64>,
    /// Current angle.
    pub a: f64,
}

impl Sweep {
    fn at(position: Vector2<f64>, angle: f64) -> Self {
        Self {
            c0: position,
            a0: angle,
            c: position,
            a: angle,
        }
    }
}

/// Pose after a mutation, drained by [`Body::take_pose_update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseUpdate {
    /// New position.
    pub position: Vector2<f64>,
    /// New wrapped rotation.
    pub rotation: f64,
}

/// A rigid body in the plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub(crate) position: Vector2<f64>,
    pub(crate) rotation: f64,
    pub(crate) revolutions: i64,

    pub(crate) linear_velocity: Vector2<f64>,
    pub(crate) angular_velocity: f64,
    pub(crate) linear_bias_velocity: Vector2<f64>,
    pub(crate) angular_bias_velocity: f64,

    pub(crate) force: Vector2<f64>,
    pub(crate) torque: f64,
    pub(crate) queued_impulse: Vector2<f64>,
    pub(crate) queued_angular_impulse: f64,

    mass: f64,
    inv_mass: f64,
    inertia: f64,
    inv_inertia: f64,
    is_static: bool,

    enabled: bool,
    ignore_gravity: bool,
    pub(crate) drag: DragCoefficients,

    pub(crate) previous_linear_velocity: Vector2<f64>,
    pub(crate) previous_angular_velocity: f64,
    pub(crate) sweep: Sweep,

    pose_dirty: bool,
}

impl Body {
    /// Create a dynamic body.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidMassProperties`] if `mass` or `inertia` is
    /// not strictly positive and finite.
    pub fn new(mass: f64, inertia: f64) -> Result<Self> {
        check_positive("mass", mass)?;
        check_positive("moment of inertia", inertia)?;
        Ok(Self::with_mass_properties(mass, inertia, false))
    }

    /// Create a static body. Its nominal mass and inertia are 1.
    #[must_use]
    pub fn new_static() -> Self {
        Self::with_mass_properties(1.0, 1.0, true)
    }

    fn with_mass_properties(mass: f64, inertia: f64, is_static: bool) -> Self {
        let mut body = Self {
            position: Vector2::zeros(),
            rotation: 0.0,
            revolutions: 0,
            linear_velocity: Vector2::zeros(),
            angular_velocity: 0.0,
            linear_bias_velocity: Vector2::zeros(),
            angular_bias_velocity: 0.0,
            force: Vector2::zeros(),
            torque: 0.0,
            queued_impulse: Vector2::zeros(),
            queued_angular_impulse: 0.0,
            mass,
            inv_mass: 0.0,
            inertia,
            inv_inertia: 0.0,
            is_static,
            enabled: true,
            ignore_gravity: false,
            drag: DragCoefficients::default(),
            previous_linear_velocity: Vector2::zeros(),
            previous_angular_velocity: 0.0,
            sweep: Sweep::default(),
            pose_dirty: false,
        };
        body.refresh_inverse_mass();
        body
    }

    /// Set the initial position.
    #[must_use]
    pub fn with_position(mut self, position: Vector2<f64>) -> Self {
        self.set_position(position);
        self
    }

    /// Set the initial rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// Set the initial linear velocity.
    #[must_use]
    pub fn with_linear_velocity(mut self, velocity: Vector2<f64>) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Set the initial angular velocity.
    #[must_use]
    pub fn with_angular_velocity(mut self, velocity: f64) -> Self {
        self.angular_velocity = velocity;
        self
    }

    /// Set the drag coefficients.
    #[must_use]
    pub fn with_drag(mut self, drag: DragCoefficients) -> Self {
        self.drag = drag;
        self
    }

    /// Exclude the body from world gravity.
    #[must_use]
    pub fn with_ignore_gravity(mut self, ignore: bool) -> Self {
        self.ignore_gravity = ignore;
        self
    }

    // ------------------------------------------------------------------
    // Pose
    // ------------------------------------------------------------------

    /// Center position.
    #[must_use]
    pub fn position(&self) -> Vector2<f64> {
        self.position
    }

    /// Rotation wrapped into `(0, 2π]`. A body never rotated reports 0.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Full turns accumulated by wrapping.
    #[must_use]
    pub fn revolutions(&self) -> i64 {
        self.revolutions
    }

    /// Unwrapped rotation: `rotation + revolutions * 2π`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_rotation(&self) -> f64 {
        self.rotation + self.revolutions as f64 * TWO_PI
    }

    /// Position and angle history.
    #[must_use]
    pub fn sweep(&self) -> &Sweep {
        &self.sweep
    }

    /// Move the body.
    pub fn set_position(&mut self, position: Vector2<f64>) {
        self.position = position;
        self.sweep.c0 = position;
        self.sweep.c = position;
        self.pose_dirty = true;
    }

    /// Set the rotation, keeping the revolution count continuous.
    ///
    /// The value is wrapped into `(0, 2π]`; every full turn removed is added
    /// to [`Body::revolutions`]. Setting `2π + 0.1` on a fresh body stores
    /// `0.1` with one revolution.
    ///
    /// Angles more than 2^53 turns from zero are stored unwrapped, with a
    /// warning, since the turn count is no longer exact.
    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.wrap_rotation();
        let angle = self.total_rotation();
        self.sweep.a0 = angle;
        self.sweep.a = angle;
        self.pose_dirty = true;
    }

    /// Move `rotation` into `(0, 2π]`, carrying whole turns into `revolutions`.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn wrap_rotation(&mut self) {
        if !self.rotation.is_finite() {
            return;
        }

        // Bulk step for large values, then exact fix-up at the boundaries.
        let turns = (self.rotation / TWO_PI).ceil() - 1.0;
        if turns.abs() > MAX_EXACT_TURNS {
            tracing::warn!(rotation = self.rotation, "rotation too large to wrap");
            return;
        }
        if turns != 0.0 {
            self.rotation -= turns * TWO_PI;
            self.revolutions += turns as i64;
        }
        while self.rotation > TWO_PI {
            self.rotation -= TWO_PI;
            self.revolutions += 1;
        }
        while self.rotation <= 0.0 {
            self.rotation += TWO_PI;
            self.revolutions -= 1;
        }
    }

    /// Drain the pending pose-changed mark.
    ///
    /// Returns the current pose if position or rotation changed since the
    /// last call, otherwise `None`.
    pub fn take_pose_update(&mut self) -> Option<PoseUpdate> {
        if !std::mem::take(&mut self.pose_dirty) {
            return None;
        }
        Some(PoseUpdate {
            position: self.position,
            rotation: self.rotation,
        })
    }

    /// Whether a pose change is waiting to be drained.
    #[must_use]
    pub fn has_pose_update(&self) -> bool {
        self.pose_dirty
    }

    pub(crate) fn mark_pose_changed(&mut self) {
        self.pose_dirty = true;
    }

    // ------------------------------------------------------------------
    // Velocity
    // ------------------------------------------------------------------

    /// Linear velocity of the center.
    #[must_use]
    pub fn linear_velocity(&self) -> Vector2<f64> {
        self.linear_velocity
    }

    /// Angular velocity.
    #[must_use]
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// Set the linear velocity.
    pub fn set_linear_velocity(&mut self, velocity: Vector2<f64>) {
        self.linear_velocity = velocity;
    }

    /// Set the angular velocity.
    pub fn set_angular_velocity(&mut self, velocity: f64) {
        self.angular_velocity = velocity;
    }

    /// Split-impulse linear bias velocity. Zero outside a step.
    #[must_use]
    pub fn linear_bias_velocity(&self) -> Vector2<f64> {
        self.linear_bias_velocity
    }

    /// Split-impulse angular bias velocity. Zero outside a step.
    #[must_use]
    pub fn angular_bias_velocity(&self) -> f64 {
        self.angular_bias_velocity
    }

    /// Linear velocity before the last velocity integration.
    #[must_use]
    pub fn previous_linear_velocity(&self) -> Vector2<f64> {
        self.previous_linear_velocity
    }

    /// Angular velocity before the last velocity integration.
    #[must_use]
    pub fn previous_angular_velocity(&self) -> f64 {
        self.previous_angular_velocity
    }

    // ------------------------------------------------------------------
    // Mass properties
    // ------------------------------------------------------------------

    /// Nominal mass.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Inverse mass. Always 0 for static bodies.
    #[must_use]
    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    /// Nominal moment of inertia.
    #[must_use]
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Inverse moment of inertia. Always 0 for static bodies.
    #[must_use]
    pub fn inv_inertia(&self) -> f64 {
        self.inv_inertia
    }

    /// Whether the body is static.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Set the mass.
    ///
    /// # Errors
    ///
    /// Dynamic bodies reject a mass that is not strictly positive and finite.
    /// Static bodies store any value without touching the inverse mass.
    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        if !self.is_static {
            check_positive("mass", mass)?;
        }
        self.mass = mass;
        self.refresh_inverse_mass();
        Ok(())
    }

    /// Set the moment of inertia.
    ///
    /// # Errors
    ///
    /// Same rules as [`Body::set_mass`].
    pub fn set_inertia(&mut self, inertia: f64) -> Result<()> {
        if !self.is_static {
            check_positive("moment of inertia", inertia)?;
        }
        self.inertia = inertia;
        self.refresh_inverse_mass();
        Ok(())
    }

    /// Make the body static or dynamic.
    ///
    /// # Errors
    ///
    /// Turning a body dynamic fails if its nominal mass or inertia is not a
    /// valid dynamic value; the body stays static.
    pub fn set_static(&mut self, is_static: bool) -> Result<()> {
        if !is_static {
            check_positive("mass", self.mass)?;
            check_positive("moment of inertia", self.inertia)?;
        }
        self.is_static = is_static;
        self.refresh_inverse_mass();
        Ok(())
    }

    fn refresh_inverse_mass(&mut self) {
        if self.is_static {
            self.inv_mass = 0.0;
            self.inv_inertia = 0.0;
        } else {
            self.inv_mass = 1.0 / self.mass;
            self.inv_inertia = 1.0 / self.inertia;
        }
    }

    // ------------------------------------------------------------------
    // Flags and drag
    // ------------------------------------------------------------------

    /// Whether the body takes part in the simulation.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the body. Disabled bodies are neither integrated
    /// nor touched by constraints.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether world gravity is skipped for this body.
    #[must_use]
    pub fn ignores_gravity(&self) -> bool {
        self.ignore_gravity
    }

    /// Exclude or include the body in world gravity.
    pub fn set_ignore_gravity(&mut self, ignore: bool) {
        self.ignore_gravity = ignore;
    }

    /// Dynamic body that is enabled: the only kind integrated by a step.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.is_static
    }

    /// Drag coefficients.
    #[must_use]
    pub fn drag(&self) -> &DragCoefficients {
        &self.drag
    }

    /// Replace the drag coefficients.
    pub fn set_drag(&mut self, drag: DragCoefficients) {
        self.drag = drag;
    }

    // ------------------------------------------------------------------
    // Forces and impulses (public queue)
    // ------------------------------------------------------------------

    /// Accumulated force.
    #[must_use]
    pub fn force(&self) -> Vector2<f64> {
        self.force
    }

    /// Accumulated torque.
    #[must_use]
    pub fn torque(&self) -> f64 {
        self.torque
    }

    /// Add a force through the center.
    pub fn apply_force(&mut self, force: Vector2<f64>) {
        self.force += force;
    }

    /// Add a force at a world-space point, producing torque about the center.
    pub fn apply_force_at_world_point(&mut self, force: Vector2<f64>, point: Vector2<f64>) {
        let arm = point - self.position;
        self.torque += cross(&arm, &force);
        self.force += force;
    }

    /// Add a force at a body-space point.
    pub fn apply_force_at_local_point(&mut self, force: Vector2<f64>, local_point: Vector2<f64>) {
        let point = self.world_point(&local_point);
        self.apply_force_at_world_point(force, point);
    }

    /// Add a torque.
    pub fn apply_torque(&mut self, torque: f64) {
        self.torque += torque;
    }

    /// Discard the accumulated force.
    pub fn clear_force(&mut self) {
        self.force = Vector2::zeros();
    }

    /// Discard the accumulated torque.
    pub fn clear_torque(&mut self) {
        self.torque = 0.0;
    }

    /// Queue a linear impulse, applied after the next velocity integration.
    pub fn apply_impulse(&mut self, impulse: Vector2<f64>) {
        self.queued_impulse += impulse;
    }

    /// Queue an angular impulse, applied after the next velocity integration.
    pub fn apply_angular_impulse(&mut self, impulse: f64) {
        self.queued_angular_impulse += impulse;
    }

    /// Pending queued linear impulse.
    #[must_use]
    pub fn queued_impulse(&self) -> Vector2<f64> {
        self.queued_impulse
    }

    /// Pending queued angular impulse.
    #[must_use]
    pub fn queued_angular_impulse(&self) -> f64 {
        self.queued_angular_impulse
    }

    /// Discard queued impulses.
    pub fn clear_impulse(&mut self) {
        self.queued_impulse = Vector2::zeros();
        self.queued_angular_impulse = 0.0;
    }

    /// Fold the queued impulses into velocity and clear the queue.
    pub fn apply_queued_impulses(&mut self) {
        let linear = self.queued_impulse;
        let angular = self.queued_angular_impulse;
        self.clear_impulse();
        self.apply_constraint_impulse(linear, angular);
    }

    // ------------------------------------------------------------------
    // Solver-facing immediate mutators
    // ------------------------------------------------------------------

    /// Change velocity immediately by `impulse * inverse mass`.
    ///
    /// Used by constraints inside an iteration; bypasses the public queue.
    pub fn apply_constraint_impulse(&mut self, linear: Vector2<f64>, angular: f64) {
        self.linear_velocity += linear * self.inv_mass;
        self.angular_velocity += angular * self.inv_inertia;
    }

    /// Change the split-impulse bias velocity.
    pub fn apply_bias_impulse(&mut self, linear: Vector2<f64>, angular: f64) {
        self.linear_bias_velocity += linear * self.inv_mass;
        self.angular_bias_velocity += angular * self.inv_inertia;
    }

    /// Move the body directly by a position-level impulse.
    pub fn apply_position_correction(&mut self, linear: Vector2<f64>, angular: f64) {
        if self.is_static {
            return;
        }
        self.position += linear * self.inv_mass;
        self.rotation += angular * self.inv_inertia;
        self.wrap_rotation();
        self.sweep.c = self.position;
        self.sweep.a = self.total_rotation();
        self.pose_dirty = true;
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Body-space point to world space.
    #[must_use]
    pub fn world_point(&self, local: &Vector2<f64>) -> Vector2<f64> {
        self.position + rotate(self.rotation, local)
    }

    /// World-space point to body space.
    #[must_use]
    pub fn local_point(&self, world: &Vector2<f64>) -> Vector2<f64> {
        rotate_inv(self.rotation, &(world - self.position))
    }

    /// Body-space direction to world space.
    #[must_use]
    pub fn world_vector(&self, local: &Vector2<f64>) -> Vector2<f64> {
        rotate(self.rotation, local)
    }

    /// World-space direction to body space.
    #[must_use]
    pub fn local_vector(&self, world: &Vector2<f64>) -> Vector2<f64> {
        rotate_inv(self.rotation, world)
    }

    /// Velocity of the material point currently at `world`.
    #[must_use]
    pub fn velocity_at_world_point(&self, world: &Vector2<f64>) -> Vector2<f64> {
        self.velocity_at_world_offset(&(world - self.position))
    }

    /// Velocity of a body-space point.
    #[must_use]
    pub fn velocity_at_local_point(&self, local: &Vector2<f64>) -> Vector2<f64> {
        self.velocity_at_world_offset(&self.world_vector(local))
    }

    /// Velocity of the point at world-space offset `r` from the center.
    #[must_use]
    pub fn velocity_at_world_offset(&self, r: &Vector2<f64>) -> Vector2<f64> {
        self.linear_velocity + cross_sv(self.angular_velocity, r)
    }

    /// Bias velocity of the point at world-space offset `r` from the center.
    #[must_use]
    pub fn bias_velocity_at_world_offset(&self, r: &Vector2<f64>) -> Vector2<f64> {
        self.linear_bias_velocity + cross_sv(self.angular_bias_velocity, r)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Linear momentum. Zero for static bodies.
    #[must_use]
    pub fn linear_momentum(&self) -> Vector2<f64> {
        if self.is_static {
            return Vector2::zeros();
        }
        self.linear_velocity * self.mass
    }

    /// Angular momentum about the body's own center. Zero for static bodies.
    #[must_use]
    pub fn angular_momentum(&self) -> f64 {
        if self.is_static {
            return 0.0;
        }
        self.angular_velocity * self.inertia
    }

    /// Kinetic energy. Zero for static bodies.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        if self.is_static {
            return 0.0;
        }
        0.5 * (self.mass * self.linear_velocity.norm_squared()
            + self.inertia * self.angular_velocity * self.angular_velocity)
    }

    /// Whether pose and velocities are all finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|x| x.is_finite())
            && self.rotation.is_finite()
            && self.linear_velocity.iter().all(|x| x.is_finite())
            && self.angular_velocity.is_finite()
    }

    /// Zero pose, velocities, accumulators, history and revolutions.
    ///
    /// Mass properties, flags and drag are kept.
    pub fn reset_dynamics(&mut self) {
        self.position = Vector2::zeros();
        self.rotation = 0.0;
        self.revolutions = 0;
        self.linear_velocity = Vector2::zeros();
        self.angular_velocity = 0.0;
        self.linear_bias_velocity = Vector2::zeros();
        self.angular_bias_velocity = 0.0;
        self.force = Vector2::zeros();
        self.torque = 0.0;
        self.clear_impulse();
        self.previous_linear_velocity = Vector2::zeros();
        self.previous_angular_velocity = 0.0;
        self.sweep = Sweep::at(Vector2::zeros(), 0.0);
        self.pose_dirty = true;
    }
}

fn check_positive(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        tracing::warn!(value, "rejected {what} for dynamic body");
        Err(SimError::invalid_mass(format!(
            "{what} must be positive and finite for a dynamic body, got {value}"
        )))
    }
}

/// Borrow two distinct bodies mutably.
///
/// Returns `None` if either id is out of range or both ids are equal.
pub fn pair_mut(bodies: &mut [Body], a: BodyId, b: BodyId) -> Option<(&mut Body, &mut Body)> {
    let (ia, ib) = (a.index(), b.index());
    if ia == ib || ia >= bodies.len() || ib >= bodies.len() {
        return None;
    }
    if ia < ib {
        let (lo, hi) = bodies.split_at_mut(ib);
        Some((&mut lo[ia], &mut hi[0]))
    } else {
        let (lo, hi) = bodies.split_at_mut(ia);
        Some((&mut hi[0], &mut lo[ib]))
    }
}

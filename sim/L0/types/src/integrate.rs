//! Symplectic Euler integration for [`Body`].
//!
//! Velocity is advanced first from the accumulated force, then position from
//! the new velocity. The constraint solver runs between the two halves, so
//! the order matters: position integration sees the constraint-corrected
//! velocity plus whatever bias velocity the split-impulse pass injected.

use crate::Body;

impl Body {
    /// Advance velocity by one step of accumulated force and torque.
    ///
    /// Drag is folded into the accumulators first. Force and torque are
    /// consumed (cleared). Static bodies only have their accumulators cleared.
    pub fn integrate_velocity(&mut self, dt: f64) {
        if self.is_static() {
            self.clear_force();
            self.clear_torque();
            self.clear_impulse();
            return;
        }

        self.apply_drag();

        self.previous_linear_velocity = self.linear_velocity;
        self.linear_velocity += self.force * (self.inv_mass() * dt);

        self.previous_angular_velocity = self.angular_velocity;
        self.angular_velocity += self.torque * self.inv_inertia() * dt;

        self.clear_force();
        self.clear_torque();
    }

    /// Advance position and rotation by `(velocity + bias) * dt`.
    ///
    /// Bias velocities are reset afterwards; rotation is re-wrapped and the
    /// pose is marked changed. Static bodies do not move.
    pub fn integrate_position(&mut self, dt: f64) {
        if self.is_static() {
            self.reset_bias();
            return;
        }

        self.sweep.c0 = self.position;
        self.sweep.a0 = self.total_rotation();

        self.position += (self.linear_velocity + self.linear_bias_velocity) * dt;
        self.rotation += (self.angular_velocity + self.angular_bias_velocity) * dt;
        self.wrap_rotation();
        self.reset_bias();

        self.sweep.c = self.position;
        self.sweep.a = self.total_rotation();
        self.mark_pose_changed();
    }

    fn apply_drag(&mut self) {
        let drag = self.drag;
        let v = self.linear_velocity;

        let mut linear = -v * drag.linear;
        if drag.quadratic_enabled {
            linear -= v * (drag.quadratic * v.norm());
        }
        self.apply_force(linear);

        let w = self.angular_velocity;
        self.apply_torque(-drag.rotational * w * w.abs());
    }

    fn reset_bias(&mut self) {
        self.linear_bias_velocity.fill(0.0);
        self.angular_bias_velocity = 0.0;
    }
}

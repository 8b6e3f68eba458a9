//! World container: body, joint and contact arenas in registration order.
//!
//! Ids are dense indices handed out in insertion order. Every arena is a
//! `Vec`, so iteration order is registration order and a step is
//! reproducible bit for bit.

use nalgebra::Vector2;

use sim2d_constraint::{AnyJoint, Constraint, Joint};
use sim2d_contact::{ContactConstraint, ContactMaterial, Manifold};
use sim2d_types::{
    Body, BodyId, JointId, PoseUpdate, Result, SimError, SimulationConfig, TimeStep,
};

use crate::solver::{Solver, SolverStats};

/// Result of one [`World::step`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepStats {
    /// Velocity passes run.
    pub velocity_iterations: usize,
    /// Position passes run.
    pub position_iterations: usize,
    /// Whether position correction converged before the iteration cap.
    pub position_converged: bool,
    /// Bodies whose pose changed during the step, in body order.
    pub pose_updates: Vec<(BodyId, PoseUpdate)>,
}

impl StepStats {
    fn new(solver: SolverStats, pose_updates: Vec<(BodyId, PoseUpdate)>) -> Self {
        Self {
            velocity_iterations: solver.velocity_iterations,
            position_iterations: solver.position_iterations,
            position_converged: solver.position_converged,
            pose_updates,
        }
    }
}

/// The simulation world.
#[derive(Debug, Clone)]
pub struct World {
    config: SimulationConfig,
    time: f64,
    step_count: u64,
    /// Inverse dt of the previous step, zero before the first.
    inv_dt0: f64,
    bodies: Vec<Body>,
    joints: Vec<AnyJoint>,
    contacts: Vec<ContactConstraint>,
    /// Parallel to `contacts`: refreshed since the last step.
    refreshed: Vec<bool>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            time: 0.0,
            step_count: 0,
            inv_dt0: 0.0,
            bodies: Vec::new(),
            joints: Vec::new(),
            contacts: Vec::new(),
            refreshed: Vec::new(),
        }
    }

    /// Get the simulation configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Mutable access to the configuration. Checked on the next step.
    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    /// Simulated time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Steps taken.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Inverse dt of the last step, for turning impulses into forces.
    #[must_use]
    pub fn last_inv_dt(&self) -> f64 {
        self.inv_dt0
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    /// Add a body and return its id.
    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = BodyId::new(self.bodies.len() as u64);
        self.bodies.push(body);
        id
    }

    /// Get a body by id.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    /// Get a body mutably by id.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.index())
    }

    /// All bodies in id order.
    #[must_use]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Number of bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // =========================================================================
    // Joints
    // =========================================================================

    /// Register a joint.
    ///
    /// # Errors
    ///
    /// - [`SimError::InvalidBodyId`] if either body does not exist
    /// - [`SimError::DegenerateConstraint`] if the joint connects a body to
    ///   itself, connects two static bodies, or fails [`Joint::validate`]
    pub fn add_joint(&mut self, joint: impl Into<AnyJoint>) -> Result<JointId> {
        let joint = joint.into();
        let (a, b) = joint.bodies();

        let checked = self.check_pair(a, b).and_then(|()| {
            if self.bodies[a.index()].is_static() && self.bodies[b.index()].is_static() {
                return Err(SimError::degenerate("joint connects two static bodies"));
            }
            joint.validate()
        });
        if let Err(err) = checked {
            tracing::warn!(body_a = %a, body_b = %b, %err, "joint rejected");
            return Err(err);
        }

        let id = JointId::new(self.joints.len() as u64);
        self.joints.push(joint);
        Ok(id)
    }

    /// Get a joint by id.
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<&AnyJoint> {
        self.joints.get(id.index())
    }

    /// Get a joint mutably by id.
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut AnyJoint> {
        self.joints.get_mut(id.index())
    }

    /// All joints in id order.
    #[must_use]
    pub fn joints(&self) -> &[AnyJoint] {
        &self.joints
    }

    /// Number of joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Retarget the motor of a prismatic joint.
    ///
    /// # Errors
    ///
    /// - [`SimError::InvalidJointId`] if the joint does not exist
    /// - [`SimError::InvalidConfig`] if the joint has no motor
    pub fn set_motor_speed(&mut self, id: JointId, speed: f64) -> Result<()> {
        let joint = self
            .joints
            .get_mut(id.index())
            .ok_or(SimError::InvalidJointId(id.raw()))?;
        let prismatic = joint
            .as_prismatic_mut()
            .ok_or_else(|| SimError::invalid_config(format!("joint {id} has no motor")))?;
        prismatic.set_motor_speed(speed);
        Ok(())
    }

    // =========================================================================
    // Contacts
    // =========================================================================

    /// Hand this frame's manifold for the pair `(a, b)` to the world.
    ///
    /// A new pair is appended with the manifold's accumulators zeroed. For a
    /// pair already in contact the accumulators carry over by contact id
    /// before the manifold is replaced. The pair may be given in either
    /// order; the normal must point from `a` to `b`.
    ///
    /// A contact that is not refreshed before the next step is dropped at
    /// the start of that step.
    ///
    /// # Errors
    ///
    /// - [`SimError::InvalidBodyId`] if either body does not exist
    /// - [`SimError::DegenerateConstraint`] if `a == b` or the normal is not
    ///   a finite unit vector
    /// - [`SimError::InvalidConfig`] if the material is invalid
    pub fn update_manifold(
        &mut self,
        a: BodyId,
        b: BodyId,
        mut manifold: Manifold,
        material: ContactMaterial,
    ) -> Result<()> {
        let checked = self
            .check_pair(a, b)
            .and_then(|()| check_normal(&manifold.normal))
            .and_then(|()| material.validate());
        if let Err(err) = checked {
            tracing::warn!(body_a = %a, body_b = %b, %err, "manifold rejected");
            return Err(err);
        }

        if let Some(index) = self.contact_index(a, b) {
            let contact = &mut self.contacts[index];
            if contact.bodies() != (a, b) {
                manifold.swap_bodies();
            }
            contact.update_manifold(manifold);
            contact.set_material(material);
            self.refreshed[index] = true;
        } else {
            for point in manifold.points_mut() {
                point.normal_impulse = 0.0;
                point.tangent_impulse = 0.0;
            }
            self.contacts
                .push(ContactConstraint::new(a, b, manifold, material));
            self.refreshed.push(true);
        }
        Ok(())
    }

    /// Drop the contact between `a` and `b`, if any.
    pub fn remove_contact(&mut self, a: BodyId, b: BodyId) -> Option<ContactConstraint> {
        let index = self.contact_index(a, b)?;
        self.refreshed.remove(index);
        Some(self.contacts.remove(index))
    }

    /// The manifold between `a` and `b`, with its accumulators.
    #[must_use]
    pub fn contact(&self, a: BodyId, b: BodyId) -> Option<&Manifold> {
        self.contact_index(a, b)
            .map(|index| self.contacts[index].manifold())
    }

    /// All contacts in registration order.
    #[must_use]
    pub fn contacts(&self) -> &[ContactConstraint] {
        &self.contacts
    }

    /// Number of contacts.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    fn contact_index(&self, a: BodyId, b: BodyId) -> Option<usize> {
        self.contacts.iter().position(|c| c.connects(a, b))
    }

    fn check_pair(&self, a: BodyId, b: BodyId) -> Result<()> {
        for id in [a, b] {
            if id.index() >= self.bodies.len() {
                return Err(SimError::InvalidBodyId(id.raw()));
            }
        }
        if a == b {
            return Err(SimError::degenerate(format!(
                "constraint connects body {a} to itself"
            )));
        }
        Ok(())
    }

    /// Drop contacts that were not refreshed since the previous step.
    fn prune_stale_contacts(&mut self) {
        if self.refreshed.iter().all(|&r| r) {
            return;
        }
        let before = self.contacts.len();
        let mut flags = self.refreshed.iter();
        self.contacts
            .retain(|_| flags.next().copied().unwrap_or(false));
        self.refreshed.retain(|&r| r);
        tracing::trace!(
            pruned = before - self.contacts.len(),
            remaining = self.contacts.len(),
            "stale contacts pruned"
        );
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Advance the world by `dt`.
    ///
    /// # Errors
    ///
    /// - [`SimError::InvalidTimestep`] if `dt` is not finite and positive
    /// - Any error from [`SimulationConfig::validate`]
    ///
    /// Numerical trouble inside the solve is not an error; use
    /// [`World::validate`] to check for it.
    pub fn step(&mut self, dt: f64) -> Result<StepStats> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidTimestep(dt));
        }
        self.config.validate()?;

        self.prune_stale_contacts();

        let step = TimeStep::new(dt, self.inv_dt0, &self.config);
        let solver = Solver::new(self.config.gravity);
        let stats = solver.step(&mut self.bodies, &mut self.joints, &mut self.contacts, &step);

        self.inv_dt0 = step.inv_dt;
        self.refreshed.fill(false);
        self.time += dt;
        self.step_count += 1;

        Ok(StepStats::new(stats, self.drain_pose_updates()))
    }

    /// Advance the world by the configured timestep.
    ///
    /// # Errors
    ///
    /// Same as [`World::step`].
    pub fn step_fixed(&mut self) -> Result<StepStats> {
        self.step(self.config.timestep)
    }

    /// Collect pose changes made since the last drain, in body order.
    pub fn drain_pose_updates(&mut self) -> Vec<(BodyId, PoseUpdate)> {
        self.bodies
            .iter_mut()
            .enumerate()
            .filter_map(|(i, body)| {
                body.take_pose_update()
                    .map(|update| (BodyId::new(i as u64), update))
            })
            .collect()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Total linear momentum of enabled bodies.
    #[must_use]
    pub fn linear_momentum(&self) -> Vector2<f64> {
        self.enabled_bodies().map(Body::linear_momentum).sum()
    }

    /// Total angular momentum of enabled bodies about the world origin.
    #[must_use]
    pub fn angular_momentum(&self) -> f64 {
        self.enabled_bodies()
            .map(|b| {
                b.angular_momentum() + sim2d_types::math::cross(&b.position(), &b.linear_momentum())
            })
            .sum()
    }

    /// Total kinetic energy of enabled bodies.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        self.enabled_bodies().map(Body::kinetic_energy).sum()
    }

    /// Check every body for non-finite state.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Diverged`] naming the first bad body.
    pub fn validate(&self) -> Result<()> {
        for (i, body) in self.bodies.iter().enumerate() {
            if !body.is_finite() {
                return Err(SimError::diverged(format!(
                    "body {} has non-finite state",
                    BodyId::new(i as u64)
                )));
            }
        }
        Ok(())
    }

    fn enabled_bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.is_enabled())
    }
}

fn check_normal(normal: &Vector2<f64>) -> Result<()> {
    if !normal.iter().all(|c| c.is_finite()) || (normal.norm() - 1.0).abs() > 1e-6 {
        return Err(SimError::degenerate("contact normal must be a unit vector"));
    }
    Ok(())
}

//! Joint trait and the tagged joint variant stored by a world.

use nalgebra::Vector2;
use sim2d_types::{Body, BodyId, Result, SimError, SolverSettings, TimeStep};

use crate::{Constraint, PositionError, PrismaticJoint, RevoluteJoint};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trait for all joint types.
pub trait Joint: Constraint {
    /// Get the joint type.
    fn joint_type(&self) -> JointType;

    /// Force on body B over the last step.
    fn reaction_force(&self, inv_dt: f64) -> Vector2<f64>;

    /// Torque on body B over the last step.
    fn reaction_torque(&self, inv_dt: f64) -> f64;

    /// Reject geometry the solver cannot handle.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Type of joint constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointType {
    /// Revolute joint (1 DOF) - rotation about a pin.
    Revolute,
    /// Prismatic joint (1 DOF) - translation along an axis.
    Prismatic,
}

impl Joint for PrismaticJoint {
    fn joint_type(&self) -> JointType {
        JointType::Prismatic
    }

    fn reaction_force(&self, inv_dt: f64) -> Vector2<f64> {
        PrismaticJoint::reaction_force(self, inv_dt)
    }

    fn reaction_torque(&self, inv_dt: f64) -> f64 {
        PrismaticJoint::reaction_torque(self, inv_dt)
    }

    fn validate(&self) -> Result<()> {
        let axis = self.local_axis_a();
        if !axis.iter().all(|c| c.is_finite()) || (axis.norm() - 1.0).abs() > 1e-9 {
            return Err(SimError::degenerate(
                "prismatic axis must be a finite, non-zero vector",
            ));
        }
        Ok(())
    }
}

impl Joint for RevoluteJoint {
    fn joint_type(&self) -> JointType {
        JointType::Revolute
    }

    fn reaction_force(&self, inv_dt: f64) -> Vector2<f64> {
        RevoluteJoint::reaction_force(self, inv_dt)
    }

    fn reaction_torque(&self, inv_dt: f64) -> f64 {
        RevoluteJoint::reaction_torque(self, inv_dt)
    }
}

/// Any joint kind, dispatched by tag.
///
/// Per-kind state (accumulators, limit state) stays inside each variant.
#[derive(Debug, Clone)]
pub enum AnyJoint {
    /// A prismatic joint.
    Prismatic(PrismaticJoint),
    /// A revolute joint.
    Revolute(RevoluteJoint),
}

impl AnyJoint {
    /// The prismatic joint, if this is one.
    #[must_use]
    pub fn as_prismatic(&self) -> Option<&PrismaticJoint> {
        match self {
            Self::Prismatic(j) => Some(j),
            Self::Revolute(_) => None,
        }
    }

    /// The prismatic joint, mutably, if this is one.
    pub fn as_prismatic_mut(&mut self) -> Option<&mut PrismaticJoint> {
        match self {
            Self::Prismatic(j) => Some(j),
            Self::Revolute(_) => None,
        }
    }

    /// The revolute joint, if this is one.
    #[must_use]
    pub fn as_revolute(&self) -> Option<&RevoluteJoint> {
        match self {
            Self::Revolute(j) => Some(j),
            Self::Prismatic(_) => None,
        }
    }

    /// The revolute joint, mutably, if this is one.
    pub fn as_revolute_mut(&mut self) -> Option<&mut RevoluteJoint> {
        match self {
            Self::Revolute(j) => Some(j),
            Self::Prismatic(_) => None,
        }
    }
}

impl From<PrismaticJoint> for AnyJoint {
    fn from(joint: PrismaticJoint) -> Self {
        Self::Prismatic(joint)
    }
}

impl From<RevoluteJoint> for AnyJoint {
    fn from(joint: RevoluteJoint) -> Self {
        Self::Revolute(joint)
    }
}

macro_rules! dispatch {
    ($self:ident, $j:ident => $body:expr) => {
        match $self {
            AnyJoint::Prismatic($j) => $body,
            AnyJoint::Revolute($j) => $body,
        }
    };
}

impl Constraint for AnyJoint {
    fn bodies(&self) -> (BodyId, BodyId) {
        dispatch!(self, j => j.bodies())
    }

    fn init_velocity_constraints(&mut self, a: &Body, b: &Body, step: &TimeStep) {
        dispatch!(self, j => j.init_velocity_constraints(a, b, step));
    }

    fn warm_start(&mut self, a: &mut Body, b: &mut Body, step: &TimeStep) {
        dispatch!(self, j => j.warm_start(a, b, step));
    }

    fn solve_velocity_constraints(&mut self, a: &mut Body, b: &mut Body, step: &TimeStep) {
        dispatch!(self, j => j.solve_velocity_constraints(a, b, step));
    }

    fn solve_position_constraints(
        &mut self,
        a: &mut Body,
        b: &mut Body,
        settings: &SolverSettings,
    ) -> PositionError {
        dispatch!(self, j => j.solve_position_constraints(a, b, settings))
    }

    fn position_tolerance(&self, settings: &SolverSettings) -> PositionError {
        dispatch!(self, j => j.position_tolerance(settings))
    }
}

impl Joint for AnyJoint {
    fn joint_type(&self) -> JointType {
        dispatch!(self, j => j.joint_type())
    }

    fn reaction_force(&self, inv_dt: f64) -> Vector2<f64> {
        dispatch!(self, j => Joint::reaction_force(j, inv_dt))
    }

    fn reaction_torque(&self, inv_dt: f64) -> f64 {
        dispatch!(self, j => Joint::reaction_torque(j, inv_dt))
    }

    fn validate(&self) -> Result<()> {
        dispatch!(self, j => j.validate())
    }
}

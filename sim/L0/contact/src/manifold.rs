//! Contact manifolds supplied by the collision pipeline.

use nalgebra::Vector2;
use smallvec::SmallVec;

use sim2d_types::{Result, SimError};

use crate::ContactId;

/// Most points a planar manifold can hold.
pub const MAX_MANIFOLD_POINTS: usize = 2;

/// One contact point.
///
/// `local_point_a` and `local_point_b` are the same world point at detection
/// time, expressed in each body's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManifoldPoint {
    /// Contact point in body A's frame.
    pub local_point_a: Vector2<f64>,
    /// Contact point in body B's frame.
    pub local_point_b: Vector2<f64>,
    /// Signed distance along the normal; negative when overlapping.
    pub separation: f64,
    /// Accumulated normal impulse.
    pub normal_impulse: f64,
    /// Accumulated tangent impulse.
    pub tangent_impulse: f64,
    /// Feature key used to match the point across frames.
    pub id: ContactId,
}

impl ManifoldPoint {
    /// A point with zeroed accumulators.
    #[must_use]
    pub fn new(
        local_point_a: Vector2<f64>,
        local_point_b: Vector2<f64>,
        separation: f64,
        id: ContactId,
    ) -> Self {
        Self {
            local_point_a,
            local_point_b,
            separation,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            id,
        }
    }
}

/// The contact points between one pair of shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifold {
    /// Unit normal pointing from body A to body B.
    pub normal: Vector2<f64>,
    points: SmallVec<[ManifoldPoint; MAX_MANIFOLD_POINTS]>,
}

impl Manifold {
    /// An empty manifold with the given normal.
    #[must_use]
    pub fn new(normal: Vector2<f64>) -> Self {
        Self {
            normal,
            points: SmallVec::new(),
        }
    }

    /// Add a point.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CapacityExceeded`] if the manifold already holds
    /// [`MAX_MANIFOLD_POINTS`] points.
    pub fn push_point(&mut self, point: ManifoldPoint) -> Result<()> {
        if self.points.len() >= MAX_MANIFOLD_POINTS {
            return Err(SimError::CapacityExceeded {
                resource: "manifold points",
                limit: MAX_MANIFOLD_POINTS,
            });
        }
        self.points.push(point);
        Ok(())
    }

    /// Add a point, builder style.
    ///
    /// # Errors
    ///
    /// Same as [`Manifold::push_point`].
    pub fn with_point(mut self, point: ManifoldPoint) -> Result<Self> {
        self.push_point(point)?;
        Ok(self)
    }

    /// The points in insertion order.
    #[must_use]
    pub fn points(&self) -> &[ManifoldPoint] {
        &self.points
    }

    /// The points, mutably.
    pub fn points_mut(&mut self) -> &mut [ManifoldPoint] {
        &mut self.points
    }

    /// Number of points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Seed this manifold's accumulators from the previous frame.
    ///
    /// Each point takes both accumulators from the first previous point
    /// with the same id; points with no match start cold. Returns the
    /// number of matched points.
    pub fn carry_impulses_from(&mut self, previous: &Manifold) -> usize {
        let mut matched = 0;
        for point in &mut self.points {
            match previous.points.iter().find(|old| old.id == point.id) {
                Some(old) => {
                    point.normal_impulse = old.normal_impulse;
                    point.tangent_impulse = old.tangent_impulse;
                    matched += 1;
                }
                None => {
                    point.normal_impulse = 0.0;
                    point.tangent_impulse = 0.0;
                }
            }
        }
        matched
    }

    /// Re-express the manifold with the two bodies exchanged.
    ///
    /// The normal flips and each point's local coordinates trade places.
    /// Accumulators are untouched: the impulse magnitudes along the new
    /// normal are the same.
    pub fn swap_bodies(&mut self) {
        self.normal = -self.normal;
        for point in &mut self.points {
            std::mem::swap(&mut point.local_point_a, &mut point.local_point_b);
        }
    }

    /// Sum of normal impulses.
    #[must_use]
    pub fn total_normal_impulse(&self) -> f64 {
        self.points.iter().map(|p| p.normal_impulse).sum()
    }
}

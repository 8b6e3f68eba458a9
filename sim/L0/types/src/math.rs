//! Planar math helpers.
//!
//! nalgebra covers vectors and matrices; this module adds the 2D cross
//! products used by every constraint row and the small dense solves used to
//! invert effective-mass matrices.
//!
//! The solves apply Cramer's rule directly. A singular matrix yields
//! non-finite components rather than an error, so degenerate constraint
//! configurations must be rejected before they reach the solver.

use nalgebra::{Matrix2, Matrix3, Rotation2, Vector2, Vector3};

/// Full turn in radians.
pub const TWO_PI: f64 = std::f64::consts::TAU;

/// Scalar cross product `a × b` of two planar vectors.
#[inline]
#[must_use]
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Cross product `s × v` of a scalar (out-of-plane) and a planar vector.
#[inline]
#[must_use]
pub fn cross_sv(s: f64, v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-s * v.y, s * v.x)
}

/// Cross product `v × s` of a planar vector and a scalar (out-of-plane).
#[inline]
#[must_use]
pub fn cross_vs(v: &Vector2<f64>, s: f64) -> Vector2<f64> {
    Vector2::new(s * v.y, -s * v.x)
}

/// Rotate `v` by `angle` radians.
#[inline]
#[must_use]
pub fn rotate(angle: f64, v: &Vector2<f64>) -> Vector2<f64> {
    Rotation2::new(angle) * v
}

/// Rotate `v` by `-angle` radians.
#[inline]
#[must_use]
pub fn rotate_inv(angle: f64, v: &Vector2<f64>) -> Vector2<f64> {
    Rotation2::new(angle).inverse() * v
}

/// Solve `k * x = b` for a 2×2 system.
#[must_use]
pub fn solve22(k: &Matrix2<f64>, b: &Vector2<f64>) -> Vector2<f64> {
    let (a11, a12, a21, a22) = (k[(0, 0)], k[(0, 1)], k[(1, 0)], k[(1, 1)]);
    let inv_det = 1.0 / (a11 * a22 - a12 * a21);
    Vector2::new(
        inv_det * (a22 * b.x - a12 * b.y),
        inv_det * (a11 * b.y - a21 * b.x),
    )
}

/// Solve `k * x = b` for a 3×3 system.
#[must_use]
pub fn solve33(k: &Matrix3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    let c1: Vector3<f64> = k.column(0).into_owned();
    let c2: Vector3<f64> = k.column(1).into_owned();
    let c3: Vector3<f64> = k.column(2).into_owned();

    let inv_det = 1.0 / c1.dot(&c2.cross(&c3));
    Vector3::new(
        inv_det * b.dot(&c2.cross(&c3)),
        inv_det * c1.dot(&b.cross(&c3)),
        inv_det * c1.dot(&c2.cross(b)),
    )
}

//! Scalar and vector type aliases shared across the crate.
//!
//! A single `Real` alias keeps the crate's numeric precision in one place.
//! This crate fixes `Real = f64`: IPC barrier solves are normally run in
//! double precision because the log-barrier's curvature blows up near
//! `d -> 0`.

/// The floating-point scalar used throughout the crate.
pub type Real = f64;

pub use nalgebra::{DMatrix, DVector, Point2, Point3, Vector2, Vector3};

/// A point in either 2 or 3 dimensions, generalized over the crate's two
/// supported dimensionalities. Internally, all narrow-phase geometry is
/// done in 3D; 2D callers are lifted by appending `z = 0`.
pub fn lift_2d_to_3d(p: Point2<Real>) -> Point3<Real> {
    Point3::new(p.x, p.y, 0.0)
}

//! # geometry
//!
//! Geometric operations for box projection and frame changes.

/// Pinhole camera and box visibility.
pub mod camera;
/// Oriented cuboids.
pub mod polytope;
/// Rigid transforms and sensor/ego poses.
pub mod se3;
/// Scalar-first quaternion rotations.
pub mod so3;

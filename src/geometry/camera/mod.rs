//! # camera
//!
//! Camera models.

/// Pinhole camera model and box visibility.
pub mod pinhole_camera;

//! # polytope
//!
//! Oriented 3D cuboids and their vertices.

use ndarray::{arr1, Array, Array2, Ix2};
use once_cell::sync::Lazy;

use super::{
    se3::{Pose, SE3},
    so3::{quat_inverse, quat_multiply, QuatWxyz},
};

/// Unit cuboid vertices, scaled by half the (length, width, height).
///
/// Vertices 0..4 are the front face (+x), 4..8 the back face (-x):
/// ```text
///     4------5        0------1
///     |back  |        |front |
///     7------6        3------2
/// ```
static VERTS: Lazy<Array<f64, Ix2>> = Lazy::new(|| {
    ndarray::arr2(&[
        [1., 1., 1.],
        [1., -1., 1.],
        [1., -1., -1.],
        [1., 1., -1.],
        [-1., 1., 1.],
        [-1., -1., 1.],
        [-1., -1., -1.],
        [-1., 1., -1.],
    ])
});

/// Number of cuboid vertices.
pub const NUM_CUBOID_VERTICES: usize = 8;

/// Labelled oriented cuboid.
#[derive(Clone, Debug, PartialEq)]
pub struct Cuboid {
    /// Category name.
    pub label: String,
    /// Center in meters.
    pub center: [f64; 3],
    /// Width, length, height in meters (nuScenes `size` order).
    pub wlh: [f64; 3],
    /// Orientation (scalar-first quaternion).
    pub orientation: QuatWxyz,
}

impl Cuboid {
    /// Length, width, height in meters.
    pub fn lwh(&self) -> [f64; 3] {
        let [w, l, h] = self.wlh;
        [l, w, h]
    }

    /// (8,3) vertices in the cuboid's reference frame, ordered as [`VERTS`].
    pub fn vertices(&self) -> Array2<f64> {
        let verts = &*VERTS * &(arr1(&self.lwh()) / 2.);
        SE3::from_quat(&self.center, &self.orientation).transform_from(&verts.view())
    }

    /// Re-express the cuboid in the frame described by `frame` (frame pose in
    /// the cuboid's current reference frame).
    pub fn express_in(&self, frame: &Pose) -> Cuboid {
        let frame_se3_ref = frame.se3().inverse();
        Cuboid {
            label: self.label.clone(),
            center: frame_se3_ref.transform_point(&self.center),
            wlh: self.wlh,
            orientation: quat_multiply(&quat_inverse(&frame.rotation), &self.orientation),
        }
    }
}

//! # SE(3)
//!
//! Special Euclidean Group 3.

use ndarray::{arr1, Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::so3::{quat_to_mat3, QuatWxyz};

/// Special Euclidean Group 3.
/// Rigid transformation parameterized by a rotation and translation in $R^3$.
#[derive(Clone, Debug)]
pub struct SE3 {
    /// (3,3) Orthonormal rotation matrix.
    pub rotation: Array2<f64>,
    /// (3,) Translation vector.
    pub translation: Array1<f64>,
}

impl SE3 {
    /// Build from a translation and a scalar-first quaternion.
    pub fn from_quat(translation: &[f64; 3], quat_wxyz: &QuatWxyz) -> Self {
        Self {
            rotation: quat_to_mat3(quat_wxyz),
            translation: arr1(translation),
        }
    }

    /// Transform the (N,3) point cloud from its reference frame to the SE(3) destination.
    pub fn transform_from(&self, point_cloud: &ArrayView2<f64>) -> Array2<f64> {
        point_cloud.dot(&self.rotation.t()) + &self.translation
    }

    /// Transform a single point.
    pub fn transform_point(&self, point: &[f64; 3]) -> [f64; 3] {
        let transformed = self.rotation.dot(&arr1(point)) + &self.translation;
        [transformed[0], transformed[1], transformed[2]]
    }

    /// Invert the SE(3) transformation.
    pub fn inverse(&self) -> SE3 {
        let rotation = self.rotation.t().as_standard_layout().to_owned();
        let translation = rotation.dot(&(-&self.translation));
        Self {
            rotation,
            translation,
        }
    }
}

/// Translation plus scalar-first rotation, as stored in the calibration and
/// ego-pose tables. Expresses a child frame inside its parent frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Child origin in parent coordinates (meters).
    pub translation: [f64; 3],
    /// Child orientation in the parent frame.
    pub rotation: QuatWxyz,
}

impl Pose {
    /// `parent_SE3_child`.
    pub fn se3(&self) -> SE3 {
        SE3::from_quat(&self.translation, &self.rotation)
    }
}

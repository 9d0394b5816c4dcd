use anyhow::{ensure, Result};
use ndarray::{s, Array, Array2, ArrayView2, Ix2};
use serde::{Deserialize, Serialize};

use crate::geometry::polytope::{Cuboid, NUM_CUBOID_VERTICES};

/// Minimum depth (meters) of a cuboid vertex counted as visible.
const MIN_VISIBLE_DEPTH_M: f64 = 1.0;
/// Every vertex of a kept cuboid must be at least this far (meters) in front
/// of the camera.
const MIN_FRONT_DEPTH_M: f64 = 0.1;

/// How many vertices of a cuboid must land in the image for it to be kept.
/// `All` and `Any` also drop cuboids that reach behind the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxVisibility {
    /// Every vertex is visible.
    All,
    /// At least one vertex is visible.
    Any,
    /// No filtering.
    None,
}

/// Parameterizes a pinhole camera with zero skew.
#[derive(Clone, Debug)]
pub struct PinholeCamera {
    /// (3,3) camera intrinsic matrix.
    pub intrinsic: Array2<f64>,
    /// Width of image in pixels.
    pub width_px: u32,
    /// Height of image in pixels.
    pub height_px: u32,
}

impl PinholeCamera {
    /// Construct from a (3,3) intrinsic matrix given as rows.
    pub fn from_rows(rows: &[Vec<f64>], width_px: u32, height_px: u32) -> Result<Self> {
        ensure!(
            rows.len() == 3 && rows.iter().all(|row| row.len() == 3),
            "Camera intrinsic must be 3x3, got {rows:?}."
        );
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let intrinsic = Array2::from_shape_vec((3, 3), flat)?;
        Ok(Self {
            intrinsic,
            width_px,
            height_px,
        })
    }

    /// Row-major intrinsic matrix (9 values).
    pub fn flat_intrinsics(&self) -> Vec<f64> {
        self.intrinsic.iter().copied().collect()
    }

    /// Project (N,3) camera-frame points to the image plane.
    /// Returns (N,3) rows of `(u, v, depth)` in pixels / meters.
    pub fn project(&self, points_camera: &ArrayView2<f64>) -> Array<f64, Ix2> {
        view_points(points_camera, &self.intrinsic.view())
    }

    /// Flag, per projected point, whether it lies in the image and in front of the camera.
    pub fn cull_to_view_frustum(&self, uvz: &ArrayView2<f64>) -> Vec<bool> {
        uvz.rows()
            .into_iter()
            .map(|row| {
                let is_within_frustum_x = row[0] > 0. && row[0] < self.width_px as f64;
                let is_within_frustum_y = row[1] > 0. && row[1] < self.height_px as f64;
                let is_within_frustum_z = row[2] > MIN_VISIBLE_DEPTH_M;
                is_within_frustum_x && is_within_frustum_y && is_within_frustum_z
            })
            .collect()
    }

    /// Whether a camera-frame cuboid passes the visibility policy.
    pub fn is_visible(&self, cuboid: &Cuboid, visibility: BoxVisibility) -> bool {
        if visibility == BoxVisibility::None {
            return true;
        }
        let uvz = self.project(&cuboid.vertices().view());
        let is_valid = self.cull_to_view_frustum(&uvz.view());
        let is_in_front = uvz.column(2).iter().all(|z| *z > MIN_FRONT_DEPTH_M);
        match visibility {
            BoxVisibility::All => is_in_front && is_valid.iter().all(|v| *v),
            BoxVisibility::Any => is_in_front && is_valid.iter().any(|v| *v),
            BoxVisibility::None => true,
        }
    }

    /// Image-plane vertices of a camera-frame cuboid, as fractions of the image size.
    /// Depth is dropped; nothing is clipped.
    pub fn normalized_vertices(&self, cuboid: &Cuboid) -> [[f64; 2]; NUM_CUBOID_VERTICES] {
        let uvz = self.project(&cuboid.vertices().view());
        let mut vertices = [[0.; 2]; NUM_CUBOID_VERTICES];
        for (vertex, row) in vertices.iter_mut().zip(uvz.rows()) {
            *vertex = [
                row[0] / self.width_px as f64,
                row[1] / self.height_px as f64,
            ];
        }
        vertices
    }
}

/// Apply a (3,3) projection to (N,3) points and divide the image coordinates
/// by depth. The third column keeps the depth.
pub fn view_points(points: &ArrayView2<f64>, view: &ArrayView2<f64>) -> Array<f64, Ix2> {
    let depth = points.slice(s![.., 2..3]).to_owned();
    let mut uvz = points.dot(&view.t());
    let mut uv = uvz.slice_mut(s![.., ..2]);
    uv /= &depth;
    uvz.slice_mut(s![.., 2..3]).assign(&depth);
    uvz
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    use super::*;
    use crate::geometry::so3::IDENTITY_QUAT;

    fn camera() -> PinholeCamera {
        PinholeCamera::from_rows(
            &[
                vec![100., 0., 50.],
                vec![0., 100., 40.],
                vec![0., 0., 1.],
            ],
            100,
            80,
        )
        .unwrap()
    }

    fn cuboid_at(center: [f64; 3]) -> Cuboid {
        Cuboid {
            label: "vehicle.car".into(),
            center,
            wlh: [1., 1., 1.],
            orientation: IDENTITY_QUAT,
        }
    }

    /// Cuboid with its length along the optical axis.
    fn long_cuboid_at(center: [f64; 3], length: f64) -> Cuboid {
        let half_turn_about_y = std::f64::consts::FRAC_1_SQRT_2;
        Cuboid {
            wlh: [1., length, 1.],
            orientation: [half_turn_about_y, 0., half_turn_about_y, 0.],
            ..cuboid_at(center)
        }
    }

    #[test]
    fn view_points_divides_by_depth() {
        let points = arr2(&[[1., -1., 10.], [0., 0., 2.]]);
        let uvz = camera().project(&points.view());
        assert_abs_diff_eq!(
            uvz,
            arr2(&[[60., 30., 10.], [50., 40., 2.]]),
            epsilon = 1e-12
        );
    }

    #[test]
    fn from_rows_rejects_non_square() {
        assert!(PinholeCamera::from_rows(&[vec![1., 0.], vec![0., 1.]], 10, 10).is_err());
    }

    #[test]
    fn flat_intrinsics_are_row_major() {
        assert_eq!(
            camera().flat_intrinsics(),
            vec![100., 0., 50., 0., 100., 40., 0., 0., 1.]
        );
    }

    #[test]
    fn visibility_policies() {
        let camera = camera();
        let ahead = cuboid_at([0., 0., 10.]);
        let behind = cuboid_at([0., 0., -10.]);
        // Straddles the right image border at 10 m.
        let partial = cuboid_at([5., 0., 10.]);

        assert!(camera.is_visible(&ahead, BoxVisibility::All));
        assert!(!camera.is_visible(&behind, BoxVisibility::Any));
        assert!(camera.is_visible(&behind, BoxVisibility::None));
        assert!(camera.is_visible(&partial, BoxVisibility::Any));
        assert!(!camera.is_visible(&partial, BoxVisibility::All));
    }

    #[test]
    fn cuboids_reaching_behind_the_camera_are_dropped() {
        let camera = camera();
        // Spans z = -0.5 .. 3.5: the far face is in the image, the near face is behind.
        let straddling = long_cuboid_at([0., 0., 1.5], 4.);
        let depths = straddling.vertices().column(2).to_vec();
        assert!(depths.iter().any(|z| *z > 3.));
        assert!(depths.iter().any(|z| *z < 0.));

        assert!(!camera.is_visible(&straddling, BoxVisibility::Any));
        assert!(!camera.is_visible(&straddling, BoxVisibility::All));
        assert!(camera.is_visible(&straddling, BoxVisibility::None));
        assert!(camera.is_visible(&long_cuboid_at([0., 0., 4.], 4.), BoxVisibility::Any));
    }

    #[test]
    fn normalized_vertices_within_unit_square() {
        let vertices = camera().normalized_vertices(&cuboid_at([0., 0., 10.]));
        for [x, y] in vertices {
            assert!((0. ..=1.).contains(&x));
            assert!((0. ..=1.).contains(&y));
        }
    }
}

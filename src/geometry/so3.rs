//! # SO(3)
//!
//! Special Orthogonal Group 3 (SO(3)).
//!
//! Quaternions are scalar-first (`[w, x, y, z]`), the layout used by the
//! nuScenes tables.

use glam::DQuat;
use ndarray::{arr2, Array2};

/// Scalar-first quaternion.
pub type QuatWxyz = [f64; 4];

/// Identity rotation.
pub const IDENTITY_QUAT: QuatWxyz = [1., 0., 0., 0.];

/// Scale a quaternion to unit length.
/// A zero quaternion maps to the identity.
pub fn normalize_quat(quat_wxyz: &QuatWxyz) -> QuatWxyz {
    let norm = quat_wxyz.iter().map(|q| q * q).sum::<f64>().sqrt();
    if norm == 0. {
        return IDENTITY_QUAT;
    }
    quat_wxyz.map(|q| q / norm)
}

/// Convert a quaternion in scalar-first format to a 3x3 rotation matrix.
pub fn quat_to_mat3(quat_wxyz: &QuatWxyz) -> Array2<f64> {
    let [w, x, y, z] = normalize_quat(quat_wxyz);

    let e_00 = 1. - 2. * y.powi(2) - 2. * z.powi(2);
    let e_01 = 2. * x * y - 2. * z * w;
    let e_02 = 2. * x * z + 2. * y * w;

    let e_10 = 2. * x * y + 2. * z * w;
    let e_11 = 1. - 2. * x.powi(2) - 2. * z.powi(2);
    let e_12 = 2. * y * z - 2. * x * w;

    let e_20 = 2. * x * z - 2. * y * w;
    let e_21 = 2. * y * z + 2. * x * w;
    let e_22 = 1. - 2. * x.powi(2) - 2. * y.powi(2);

    arr2(&[[e_00, e_01, e_02], [e_10, e_11, e_12], [e_20, e_21, e_22]])
}

fn to_glam(quat_wxyz: &QuatWxyz) -> DQuat {
    let [w, x, y, z] = *quat_wxyz;
    DQuat::from_xyzw(x, y, z, w)
}

fn from_glam(quat: DQuat) -> QuatWxyz {
    [quat.w, quat.x, quat.y, quat.z]
}

/// Hamilton product `left * right`.
pub fn quat_multiply(left: &QuatWxyz, right: &QuatWxyz) -> QuatWxyz {
    from_glam(to_glam(left) * to_glam(right))
}

/// Inverse rotation of a quaternion.
pub fn quat_inverse(quat_wxyz: &QuatWxyz) -> QuatWxyz {
    from_glam(to_glam(&normalize_quat(quat_wxyz)).inverse())
}

/// Convert a scalar-first quaternion to `(yaw, pitch, roll)` in radians.
///
/// Yaw is about +z, pitch about +y and roll about +x, with the same formulas
/// (and sign conventions) as the nuScenes devkit's quaternion library.
pub fn yaw_pitch_roll(quat_wxyz: &QuatWxyz) -> (f64, f64, f64) {
    let [q0, q1, q2, q3] = normalize_quat(quat_wxyz);
    let yaw = (2. * (q0 * q3 - q1 * q2)).atan2(1. - 2. * (q2.powi(2) + q3.powi(2)));
    let pitch = (2. * (q0 * q2 + q3 * q1)).clamp(-1., 1.).asin();
    let roll = (2. * (q0 * q1 - q2 * q3)).atan2(1. - 2. * (q1.powi(2) + q2.powi(2)));
    (yaw, pitch, roll)
}

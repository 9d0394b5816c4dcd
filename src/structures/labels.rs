use serde::{Deserialize, Serialize};

use crate::geometry::{polytope::Cuboid, so3::yaw_pitch_roll};

/// Image-plane outline of a projected cuboid.
///
/// Coordinates are fractions of the image width and height. `points` holds
/// the front face, the back face, then the top and bottom faces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    /// Category name.
    pub label: String,
    /// Faces, each a closed list of `(x, y)` vertices.
    pub points: Vec<Vec<[f64; 2]>>,
    /// Faces are closed shapes.
    pub closed: bool,
    /// Faces are not filled.
    pub filled: bool,
}

impl Polyline {
    /// Build the outline from 8 projected cuboid vertices (front 4, then back 4).
    pub fn from_cuboid(vertices: [[f64; 2]; 8], label: impl Into<String>) -> Self {
        let v = vertices;
        let front = v[..4].to_vec();
        let back = v[4..].to_vec();
        let top = vec![v[0], v[1], v[5], v[4]];
        let bottom = vec![v[3], v[2], v[6], v[7]];
        Self {
            label: label.into(),
            points: vec![front, back, top, bottom],
            closed: true,
            filled: false,
        }
    }

    /// The 8 vertices: front face then back face.
    pub fn vertices(&self) -> Vec<[f64; 2]> {
        self.points.iter().take(2).flatten().copied().collect()
    }
}

/// Oriented 3D box in a sensor frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection3D {
    /// Category name.
    pub label: String,
    /// Box center (meters).
    pub location: [f64; 3],
    /// `[roll, pitch, yaw]` (radians).
    pub rotation: [f64; 3],
    /// `[length, width, height]` (meters).
    pub dimensions: [f64; 3],
}

impl Detection3D {
    /// Detection for a sensor-frame cuboid.
    pub fn from_cuboid(cuboid: &Cuboid) -> Self {
        let (yaw, pitch, roll) = yaw_pitch_roll(&cuboid.orientation);
        Self {
            label: cuboid.label.clone(),
            location: cuboid.center,
            rotation: [roll, pitch, yaw],
            dimensions: cuboid.lwh(),
        }
    }
}

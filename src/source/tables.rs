//! Rows of the nuScenes JSON tables. Only the columns this crate reads are declared.

use serde::Deserialize;

use crate::{constants::SensorModality, geometry::so3::QuatWxyz};

/// `scene.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct SceneRow {
    /// Token.
    pub token: String,
    /// Scene name.
    pub name: String,
    /// First key frame.
    pub first_sample_token: String,
    /// Number of key frames.
    #[serde(default)]
    pub nbr_samples: usize,
}

/// `sample.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct SampleRow {
    /// Token.
    pub token: String,
    /// Microsecond epoch timestamp.
    pub timestamp: i64,
    /// Next key frame, empty at the end of a scene.
    pub next: String,
    /// Owning scene.
    pub scene_token: String,
}

/// `sample_data.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct SampleDataRow {
    /// Token.
    pub token: String,
    /// Key frame this reading belongs to (or is closest to).
    pub sample_token: String,
    /// Ego pose at the reading's timestamp.
    pub ego_pose_token: String,
    /// Sensor calibration.
    pub calibrated_sensor_token: String,
    /// Microsecond epoch timestamp.
    pub timestamp: i64,
    /// Whether the reading is part of its key frame.
    pub is_key_frame: bool,
    /// Image height in pixels (0 for non-cameras).
    #[serde(default)]
    pub height: u32,
    /// Image width in pixels (0 for non-cameras).
    #[serde(default)]
    pub width: u32,
    /// Path relative to the dataset root.
    pub filename: String,
}

/// `calibrated_sensor.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct CalibratedSensorRow {
    /// Token.
    pub token: String,
    /// Sensor.
    pub sensor_token: String,
    /// Sensor origin in the ego frame.
    pub translation: [f64; 3],
    /// Sensor orientation in the ego frame.
    pub rotation: QuatWxyz,
    /// Intrinsic rows; empty for non-cameras.
    #[serde(default)]
    pub camera_intrinsic: Vec<Vec<f64>>,
}

/// `sensor.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct SensorRow {
    /// Token.
    pub token: String,
    /// Channel name (e.g., `CAM_FRONT`).
    pub channel: String,
    /// Modality.
    pub modality: SensorModality,
}

/// `ego_pose.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct EgoPoseRow {
    /// Token.
    pub token: String,
    /// Microsecond epoch timestamp.
    pub timestamp: i64,
    /// Ego origin in the global frame.
    pub translation: [f64; 3],
    /// Ego orientation in the global frame.
    pub rotation: QuatWxyz,
}

/// `sample_annotation.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct SampleAnnotationRow {
    /// Token.
    pub token: String,
    /// Annotated key frame.
    pub sample_token: String,
    /// Tracked instance.
    pub instance_token: String,
    /// Box center in the global frame.
    pub translation: [f64; 3],
    /// Width, length, height.
    pub size: [f64; 3],
    /// Box orientation in the global frame.
    pub rotation: QuatWxyz,
}

/// `instance.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct InstanceRow {
    /// Token.
    pub token: String,
    /// Category.
    pub category_token: String,
}

/// `category.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct CategoryRow {
    /// Token.
    pub token: String,
    /// Category name (e.g., `vehicle.car`).
    pub name: String,
}

//! # constants
//!
//! Common constants used throughout the library.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Name of the group field on every sample.
pub const GROUP_FIELD: &str = "group";

/// Group slice shown by default.
pub const DEFAULT_GROUP_SLICE: SensorChannel = SensorChannel::CamFront;

/// Sensor slots of a nuScenes key frame, in ingestion order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorChannel {
    /// Front-left camera.
    CamFrontLeft,
    /// Front camera.
    CamFront,
    /// Front-right camera.
    CamFrontRight,
    /// Back-left camera.
    CamBackLeft,
    /// Back camera.
    CamBack,
    /// Back-right camera.
    CamBackRight,
    /// Roof LiDAR.
    LidarTop,
    /// Front radar.
    RadarFront,
    /// Front-left radar.
    RadarFrontLeft,
    /// Front-right radar.
    RadarFrontRight,
    /// Back-left radar.
    RadarBackLeft,
    /// Back-right radar.
    RadarBackRight,
}

impl SensorChannel {
    /// Radar channels are never ingested.
    pub fn is_radar(&self) -> bool {
        self.as_ref().starts_with("RADAR")
    }

    /// Camera channel.
    pub fn is_camera(&self) -> bool {
        self.as_ref().starts_with("CAM")
    }
}

/// Camera channels exported per group, in lookup order.
pub const CAMERA_CHANNELS: [SensorChannel; 6] = [
    SensorChannel::CamFrontLeft,
    SensorChannel::CamFront,
    SensorChannel::CamFrontRight,
    SensorChannel::CamBackLeft,
    SensorChannel::CamBack,
    SensorChannel::CamBackRight,
];

/// Sensor modality of a reading, from the `sensor` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SensorModality {
    /// Image.
    Camera,
    /// Point cloud.
    Lidar,
    /// Radar returns.
    Radar,
    /// Anything else.
    #[serde(other)]
    Other,
}

/// Dataset partition of a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Training scenes.
    Train,
    /// Validation scenes.
    Validation,
}

/// Table files of a nuScenes release, under `<dataroot>/<version>/`.
pub const SCENE_TABLE: &str = "scene.json";
/// Key frames.
pub const SAMPLE_TABLE: &str = "sample.json";
/// Sensor readings.
pub const SAMPLE_DATA_TABLE: &str = "sample_data.json";
/// Sensor extrinsics/intrinsics.
pub const CALIBRATED_SENSOR_TABLE: &str = "calibrated_sensor.json";
/// Sensor channel and modality.
pub const SENSOR_TABLE: &str = "sensor.json";
/// Ego-vehicle poses.
pub const EGO_POSE_TABLE: &str = "ego_pose.json";
/// Ground-truth boxes.
pub const SAMPLE_ANNOTATION_TABLE: &str = "sample_annotation.json";
/// Tracked object instances.
pub const INSTANCE_TABLE: &str = "instance.json";
/// Object categories.
pub const CATEGORY_TABLE: &str = "category.json";
/// Optional train/validation scene-name override.
pub const SPLITS_FILE: &str = "splits.json";

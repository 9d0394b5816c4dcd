//! # source
//!
//! Read access to a raw multi-sensor release: scenes, key frames, per-channel
//! readings, calibration, ego pose and annotated boxes.

use std::{collections::BTreeMap, path::Path};

use anyhow::Result;

use crate::{
    constants::SensorModality,
    geometry::{camera::pinhole_camera::BoxVisibility, polytope::Cuboid, se3::Pose},
};

/// Fixture release for unit tests.
#[cfg(test)]
pub(crate) mod fixtures;
/// nuScenes JSON-table reader.
pub mod nuscenes;
/// Train/validation scene assignment.
pub mod splits;
/// Row types of the nuScenes tables.
pub mod tables;

pub use nuscenes::NuScenes;
pub use splits::SceneSplits;

/// A named sequence of key frames.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneRecord {
    /// Scene token.
    pub token: String,
    /// Scene name (e.g., `scene-0061`).
    pub name: String,
    /// Token of the first key frame.
    pub first_sample_token: String,
}

/// One synchronized capture instant.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleInstant {
    /// Sample token.
    pub token: String,
    /// Microsecond epoch timestamp.
    pub timestamp: i64,
    /// Token of the next key frame; empty at the end of the scene.
    pub next: String,
    /// Channel name -> key-frame reading token.
    pub data: BTreeMap<String, String>,
}

impl SampleInstant {
    /// Whether this is the last key frame of its scene.
    pub fn is_last(&self) -> bool {
        self.next.is_empty()
    }
}

/// One sensor reading.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorReading {
    /// Reading token, unique per sensor reading.
    pub token: String,
    /// Channel name.
    pub channel: String,
    /// Sensor modality.
    pub modality: SensorModality,
    /// File path relative to the dataset root.
    pub filename: String,
    /// Microsecond epoch timestamp.
    pub timestamp: i64,
}

/// Sensor extrinsics (and intrinsics for cameras).
#[derive(Clone, Debug, PartialEq)]
pub struct Calibration {
    /// Sensor pose in the ego frame.
    pub sensor_pose: Pose,
    /// (3,3) intrinsic rows; empty for non-camera sensors.
    pub camera_intrinsic: Vec<Vec<f64>>,
}

/// Read access to a raw release.
pub trait SensorSource {
    /// Root directory that reading file names are relative to.
    fn dataroot(&self) -> &Path;

    /// All scenes, in table order.
    fn scenes(&self) -> &[SceneRecord];

    /// Key frame by token.
    fn sample(&self, token: &str) -> Result<SampleInstant>;

    /// Sensor reading by token.
    fn sample_data(&self, token: &str) -> Result<SensorReading>;

    /// Calibration of the sensor that produced a reading.
    fn calibration(&self, sample_data_token: &str) -> Result<Calibration>;

    /// Ego pose at the reading's own timestamp.
    fn ego_pose(&self, sample_data_token: &str) -> Result<Pose>;

    /// Ground-truth boxes of the reading's key frame, expressed in the sensor
    /// frame. For cameras, boxes are filtered by `visibility`.
    fn sensor_boxes(&self, sample_data_token: &str, visibility: BoxVisibility)
        -> Result<Vec<Cuboid>>;

    /// Train/validation scene assignment.
    fn splits(&self) -> &SceneSplits;
}

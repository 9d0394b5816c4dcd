use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{
    group::GroupElement,
    labels::{Detection3D, Polyline},
};
use crate::{constants::Split, geometry::so3::QuatWxyz};

/// Field name of the camera polylines.
pub const IMAGE_CUBOIDS_FIELD: &str = "image_gt_cuboids";
/// Field name of the LiDAR detections.
pub const LIDAR_CUBOIDS_FIELD: &str = "lidar_gt_cuboids";

/// Declared type of a dataset field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Record id.
    Id,
    /// Filesystem path.
    Path,
    /// Group membership.
    Group,
    /// Text.
    String,
    /// UTC date-time.
    DateTime,
    /// List of floats.
    FloatList,
    /// Image-plane polylines.
    Polylines,
    /// 3D detections.
    Detections,
}

/// Camera-specific fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraFields {
    /// Row-major (3,3) intrinsic matrix.
    pub intrinsics: Vec<f64>,
    /// Camera origin in the ego frame.
    pub camera_translation: [f64; 3],
    /// Camera orientation in the ego frame.
    pub camera_rotation: QuatWxyz,
    /// Ego origin in the global frame at the image timestamp.
    pub ego_translation: [f64; 3],
    /// Ego orientation in the global frame at the image timestamp.
    pub ego_rotation: QuatWxyz,
    /// Projected ground-truth boxes.
    pub image_gt_cuboids: Vec<Polyline>,
}

/// LiDAR-specific fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LidarFields {
    /// LiDAR origin in the ego frame.
    pub lidar_translation: [f64; 3],
    /// LiDAR orientation in the ego frame.
    pub lidar_rotation: QuatWxyz,
    /// Ego origin in the global frame at the sweep timestamp.
    pub ego_translation: [f64; 3],
    /// Ego orientation in the global frame at the sweep timestamp.
    pub ego_rotation: QuatWxyz,
    /// Ground-truth boxes in the LiDAR frame.
    pub lidar_gt_cuboids: Vec<Detection3D>,
}

/// Modality-specific payload of a record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modality", rename_all = "lowercase")]
pub enum SensorFields {
    /// Camera image.
    Camera(CameraFields),
    /// LiDAR point cloud.
    Lidar(LidarFields),
    /// Any other sensor: no extra fields.
    Other,
}

/// One sensor's observation within a group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Record id.
    pub id: Uuid,
    /// Media file.
    pub filepath: PathBuf,
    /// Group membership.
    pub group: GroupElement,
    /// Dataset partition.
    #[serde(default)]
    pub split: Option<Split>,
    /// Scene name.
    #[serde(default)]
    pub scene_name: Option<String>,
    /// Source reading token.
    #[serde(default)]
    pub sample_token: Option<String>,
    /// Capture time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// File name up to its first `.`.
    #[serde(default)]
    pub frame_index: Option<String>,
    /// Modality payload.
    pub sensor: SensorFields,
}

impl Sample {
    /// Bare record; common fields are stamped afterwards.
    pub fn new(filepath: &Path, group: GroupElement, sensor: SensorFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            filepath: filepath.to_path_buf(),
            group,
            split: None,
            scene_name: None,
            sample_token: None,
            timestamp: None,
            frame_index: None,
            sensor,
        }
    }

    /// Capture time as microseconds since the epoch.
    pub fn epoch_micros(&self) -> Option<i64> {
        self.timestamp.map(|t| t.timestamp_micros())
    }

    /// Flattened intrinsics (cameras only).
    pub fn intrinsics(&self) -> Option<&[f64]> {
        match &self.sensor {
            SensorFields::Camera(camera) => Some(&camera.intrinsics),
            _ => None,
        }
    }

    /// Camera origin in the ego frame (cameras only).
    pub fn camera_translation(&self) -> Option<[f64; 3]> {
        match &self.sensor {
            SensorFields::Camera(camera) => Some(camera.camera_translation),
            _ => None,
        }
    }

    /// Camera orientation in the ego frame (cameras only).
    pub fn camera_rotation(&self) -> Option<QuatWxyz> {
        match &self.sensor {
            SensorFields::Camera(camera) => Some(camera.camera_rotation),
            _ => None,
        }
    }

    /// Ego origin at this record's timestamp.
    pub fn ego_translation(&self) -> Option<[f64; 3]> {
        match &self.sensor {
            SensorFields::Camera(camera) => Some(camera.ego_translation),
            SensorFields::Lidar(lidar) => Some(lidar.ego_translation),
            SensorFields::Other => None,
        }
    }

    /// Ego orientation at this record's timestamp.
    pub fn ego_rotation(&self) -> Option<QuatWxyz> {
        match &self.sensor {
            SensorFields::Camera(camera) => Some(camera.ego_rotation),
            SensorFields::Lidar(lidar) => Some(lidar.ego_rotation),
            SensorFields::Other => None,
        }
    }

    /// Number of labels in a label field, if this record has it.
    pub fn label_count(&self, field: &str) -> Option<usize> {
        match (&self.sensor, field) {
            (SensorFields::Camera(camera), IMAGE_CUBOIDS_FIELD) => {
                Some(camera.image_gt_cuboids.len())
            }
            (SensorFields::Lidar(lidar), LIDAR_CUBOIDS_FIELD) => {
                Some(lidar.lidar_gt_cuboids.len())
            }
            _ => None,
        }
    }

    /// JSON value of a field by name; `None` when the record lacks it.
    pub fn get_field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => json!(self.id),
            "filepath" => json!(self.filepath),
            "group.id" => json!(self.group.id),
            "group.name" => json!(self.group.name),
            "split" => json!(self.split?),
            "scene_name" => json!(self.scene_name.as_ref()?),
            "sample_token" => json!(self.sample_token.as_ref()?),
            "timestamp" => json!(self.timestamp?),
            "frame_index" => json!(self.frame_index.as_ref()?),
            "modality" => return None,
            _ => serde_json::to_value(&self.sensor).ok()?.get(name)?.clone(),
        };
        Some(value)
    }

    /// Fields this record carries, with their kinds.
    pub fn field_kinds(&self) -> Vec<(&'static str, FieldKind)> {
        let mut kinds = vec![
            ("id", FieldKind::Id),
            ("filepath", FieldKind::Path),
            ("group", FieldKind::Group),
        ];
        let optional = [
            ("split", self.split.is_some(), FieldKind::String),
            ("scene_name", self.scene_name.is_some(), FieldKind::String),
            ("sample_token", self.sample_token.is_some(), FieldKind::String),
            ("timestamp", self.timestamp.is_some(), FieldKind::DateTime),
            ("frame_index", self.frame_index.is_some(), FieldKind::String),
        ];
        kinds.extend(
            optional
                .into_iter()
                .filter(|(_, present, _)| *present)
                .map(|(name, _, kind)| (name, kind)),
        );
        match &self.sensor {
            SensorFields::Camera(_) => kinds.extend([
                ("intrinsics", FieldKind::FloatList),
                ("camera_translation", FieldKind::FloatList),
                ("camera_rotation", FieldKind::FloatList),
                ("ego_translation", FieldKind::FloatList),
                ("ego_rotation", FieldKind::FloatList),
                (IMAGE_CUBOIDS_FIELD, FieldKind::Polylines),
            ]),
            SensorFields::Lidar(_) => kinds.extend([
                ("lidar_translation", FieldKind::FloatList),
                ("lidar_rotation", FieldKind::FloatList),
                ("ego_translation", FieldKind::FloatList),
                ("ego_rotation", FieldKind::FloatList),
                (LIDAR_CUBOIDS_FIELD, FieldKind::Detections),
            ]),
            SensorFields::Other => {}
        }
        kinds
    }
}

//! # config
//!
//! Hardcoded run configuration, gathered into context objects.
//! Constants can be changed to fit your directory structure.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use serde_json::json;

use crate::{
    constants::{SensorChannel, CAMERA_CHANNELS},
    store::ViewStage,
    structures::LIDAR_CUBOIDS_FIELD,
};

/// Root directory of the raw nuScenes release.
static DATASET_ROOT: Lazy<PathBuf> = Lazy::new(|| PathBuf::from("/datastore/nuScenes/"));

/// nuScenes release version.
static DATASET_VERSION: &str = "v1.0-trainval";

/// Name of the grouped dataset in the store. Its presence makes ingestion a no-op.
static DATASET_NAME: &str = "nuscenes";

/// Saved view exported by `export_data`.
static EXPORT_VIEW_NAME: &str = "top 5 fewer dymanic objects";

/// Stages of the export view: the five LiDAR sweeps with the fewest annotated objects.
static EXPORT_VIEW: Lazy<Vec<ViewStage>> = Lazy::new(|| {
    vec![
        ViewStage::Match {
            field: "group.name".to_string(),
            value: json!(SensorChannel::LidarTop),
        },
        ViewStage::SortByLabelCount {
            field: LIDAR_CUBOIDS_FIELD.to_string(),
            reverse: false,
        },
        ViewStage::Limit { count: 5 },
    ]
});

/// Output root of `export_data`.
static EXPORT_ROOT: Lazy<PathBuf> = Lazy::new(|| PathBuf::from("./export"));

/// Dataset store directory.
static STORE_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nuscenes_prep/datasets")
});

/// Settings of the ingestion pipeline.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Root directory of the raw release.
    pub dataset_root: PathBuf,
    /// Release version (e.g., `v1.0-trainval`).
    pub version: String,
    /// Destination dataset name.
    pub dataset_name: String,
    /// Dataset store directory.
    pub store_root: PathBuf,
    /// Name of the view saved for `export_data`.
    pub export_view_name: String,
    /// Stages of that view.
    pub export_view: Vec<ViewStage>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            dataset_root: DATASET_ROOT.clone(),
            version: DATASET_VERSION.to_string(),
            dataset_name: DATASET_NAME.to_string(),
            store_root: STORE_ROOT.clone(),
            export_view_name: EXPORT_VIEW_NAME.to_string(),
            export_view: EXPORT_VIEW.clone(),
        }
    }
}

/// Settings of the export pipeline.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// Dataset store directory.
    pub store_root: PathBuf,
    /// Source dataset name.
    pub dataset_name: String,
    /// Saved view to export.
    pub view_name: String,
    /// Output root.
    pub export_root: PathBuf,
    /// Camera channels to export, in timestamp lookup order.
    pub camera_channels: Vec<SensorChannel>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            store_root: STORE_ROOT.clone(),
            dataset_name: DATASET_NAME.to_string(),
            view_name: EXPORT_VIEW_NAME.to_string(),
            export_root: EXPORT_ROOT.clone(),
            camera_channels: CAMERA_CHANNELS.to_vec(),
        }
    }
}

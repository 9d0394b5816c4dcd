//! # export
//!
//! Re-exports the camera images and pose metadata of a saved view onto a
//! plain directory tree:
//!
//! ```text
//! <export_root>/camera_parameters.json
//! <export_root>/<scene_name>/<epoch_micros>/<CHANNEL>.jpg
//! <export_root>/<scene_name>/<epoch_micros>/ego_pose.json
//! ```

use std::{fmt, fs, path::Path};

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

use crate::{
    config::ExportConfig,
    constants::SensorChannel,
    io::write_json_pretty,
    store::{Dataset, DatasetStore, DatasetView},
};

/// Shared camera calibration file.
pub const CAMERA_PARAMETERS_FILE: &str = "camera_parameters.json";
/// Per-group ego pose file.
pub const EGO_POSE_FILE: &str = "ego_pose.json";

/// Counts reported by an export run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Scenes in the view.
    pub num_scenes: usize,
    /// Group folders written.
    pub num_groups: usize,
    /// Groups without any camera record.
    pub skipped_groups: usize,
    /// Images copied.
    pub num_images: usize,
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exported {} images in {} groups across {} scenes ({} groups skipped).",
            self.num_images, self.num_groups, self.num_scenes, self.skipped_groups
        )
    }
}

/// Export the saved view named in `config`.
pub fn run(config: &ExportConfig) -> Result<ExportReport> {
    let store = DatasetStore::new(&config.store_root);
    let dataset = store.load_dataset(&config.dataset_name)?;
    let view = dataset.load_saved_view(&config.view_name)?;
    if view.is_empty() {
        warn!("View `{}` selects no samples.", config.view_name);
    }
    info!(
        "Exporting view `{}` ({} samples) to {:?}.",
        config.view_name,
        view.len(),
        config.export_root
    );
    export_view(&dataset, &view, &config.export_root, &config.camera_channels)
}

/// Export the groups of `view`.
///
/// Camera parameters are taken from the first record of each channel in the
/// whole dataset, not the view.
pub fn export_view(
    dataset: &Dataset,
    view: &DatasetView,
    export_root: &Path,
    channels: &[SensorChannel],
) -> Result<ExportReport> {
    fs::create_dir_all(export_root)
        .with_context(|| format!("Cannot create {export_root:?}."))?;
    write_json_pretty(
        &export_root.join(CAMERA_PARAMETERS_FILE),
        &camera_parameters(dataset, channels)?,
    )?;

    let mut report = ExportReport::default();
    for scene_name in view.distinct_scene_names() {
        info!("Exporting scene: {scene_name}");
        let scene_dir = export_root.join(&scene_name);
        fs::create_dir_all(&scene_dir).with_context(|| format!("Cannot create {scene_dir:?}."))?;
        report.num_scenes += 1;

        for group_id in view.match_scene(&scene_name).group_ids() {
            let group = dataset.get_group(group_id)?;
            let cameras: Vec<_> = channels
                .iter()
                .filter_map(|channel| Some((channel, group.get(channel.as_ref())?)))
                .collect();

            let Some(timestamp) = cameras.first().and_then(|(_, s)| s.epoch_micros()) else {
                debug!("Skipping group {group_id}: no timestamped camera record.");
                report.skipped_groups += 1;
                continue;
            };

            let group_dir = scene_dir.join(timestamp.to_string());
            fs::create_dir_all(&group_dir)
                .with_context(|| format!("Cannot create {group_dir:?}."))?;

            let mut ego_poses = Map::new();
            for (channel, sample) in cameras {
                let destination = group_dir.join(format!("{channel}.jpg"));
                fs::copy(&sample.filepath, &destination).with_context(|| {
                    format!("Cannot copy {:?} to {destination:?}.", sample.filepath)
                })?;
                report.num_images += 1;
                // Each camera fires at its own time, so its ego pose differs slightly.
                ego_poses.insert(
                    channel.to_string(),
                    json!({
                        "ego_translation": sample.ego_translation(),
                        "ego_rotation": sample.ego_rotation(),
                    }),
                );
            }
            write_json_pretty(&group_dir.join(EGO_POSE_FILE), &Value::Object(ego_poses))?;
            report.num_groups += 1;
        }
    }
    Ok(report)
}

/// Channel -> intrinsics and camera-to-ego pose, from the first record of
/// each channel. Channels without records are left out.
fn camera_parameters(dataset: &Dataset, channels: &[SensorChannel]) -> Result<Value> {
    let mut parameters = Map::new();
    for channel in channels {
        let slice = dataset.select_group_slice(channel.as_ref())?;
        let Some(sample) = slice.first() else {
            continue;
        };
        parameters.insert(
            channel.to_string(),
            json!({
                "intrinsics": sample.intrinsics(),
                "camera_translation_relative_to_ego": sample.camera_translation(),
                "camera_rotation_relative_to_ego": sample.camera_rotation(),
            }),
        );
    }
    Ok(Value::Object(parameters))
}

//! # ingest
//!
//! Builds the grouped dataset from a sensor source: one group per key frame,
//! one record per non-radar channel, flushed to the store once per scene.

use std::{fmt, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use strum::IntoEnumIterator;

use crate::{
    builder::RecordBuilder,
    config::IngestConfig,
    constants::{SensorChannel, Split, DEFAULT_GROUP_SLICE, GROUP_FIELD},
    path::frame_index,
    source::{NuScenes, SensorReading, SensorSource},
    store::{Dataset, DatasetStore, SidebarGroup, ViewStage},
    structures::{FieldKind, Group, Sample},
};

/// What a run does, decided once from the store catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineMode {
    /// No dataset of that name yet: build it.
    Create,
    /// The dataset exists: open it as is.
    Load,
}

impl PipelineMode {
    /// `Load` if `dataset_name` is in the catalog, `Create` otherwise.
    pub fn decide(store: &DatasetStore, dataset_name: &str) -> Result<Self> {
        if store.dataset_exists(dataset_name)? {
            Ok(Self::Load)
        } else {
            Ok(Self::Create)
        }
    }
}

/// Counts reported by an ingestion run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records in the dataset.
    pub num_samples: usize,
    /// Records in the train split.
    pub num_train: usize,
    /// Records in the validation split.
    pub num_validation: usize,
    /// Groups created by this run.
    pub num_groups: usize,
    /// Scenes in neither split.
    pub skipped_scenes: usize,
    /// Radar readings left out.
    pub skipped_radar: usize,
    /// Channels absent from a key frame.
    pub missing_channels: usize,
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} samples", self.num_samples)?;
        writeln!(f, "{} train samples", self.num_train)?;
        write!(f, "{} validation samples", self.num_validation)
    }
}

/// Everything an ingestion run reads from and writes to.
pub struct IngestContext<'a, S: ?Sized> {
    /// Raw release.
    pub source: &'a S,
    /// Destination catalog.
    pub store: DatasetStore,
    /// Destination dataset name.
    pub dataset_name: String,
    /// Name of the view saved for export.
    pub export_view_name: String,
    /// Stages of the view saved for export.
    pub export_view: Vec<ViewStage>,
}

impl<'a, S: SensorSource + ?Sized> IngestContext<'a, S> {
    /// Context for `source` with the destination settings of `config`.
    pub fn new(source: &'a S, config: &IngestConfig) -> Self {
        Self {
            source,
            store: DatasetStore::new(&config.store_root),
            dataset_name: config.dataset_name.clone(),
            export_view_name: config.export_view_name.clone(),
            export_view: config.export_view.clone(),
        }
    }
}

/// Run ingestion against the nuScenes release named in `config`.
/// The release is only opened when the dataset has to be built.
pub fn run(config: &IngestConfig) -> Result<(Dataset, IngestReport)> {
    let store = DatasetStore::new(&config.store_root);
    match PipelineMode::decide(&store, &config.dataset_name)? {
        PipelineMode::Create => {
            let nusc = NuScenes::new(&config.version, &config.dataset_root)?;
            build(&IngestContext::new(&nusc, config))
        }
        PipelineMode::Load => load(&store, &config.dataset_name),
    }
}

/// Build or load, depending on the catalog.
pub fn ingest<S: SensorSource + ?Sized>(
    context: &IngestContext<S>,
) -> Result<(Dataset, IngestReport)> {
    match PipelineMode::decide(&context.store, &context.dataset_name)? {
        PipelineMode::Create => build(context),
        PipelineMode::Load => load(&context.store, &context.dataset_name),
    }
}

/// Open an existing dataset and count its records.
pub fn load(store: &DatasetStore, dataset_name: &str) -> Result<(Dataset, IngestReport)> {
    let dataset = store.load_dataset(dataset_name)?;
    let report = count(&dataset, IngestReport::default())?;
    info!("Loaded dataset `{dataset_name}` with {} samples.", report.num_samples);
    Ok((dataset, report))
}

/// Build the dataset from scratch.
///
/// A failure mid-way leaves the scenes flushed so far in the store; a later
/// run will load them as they are.
pub fn build<S: SensorSource + ?Sized>(
    context: &IngestContext<S>,
) -> Result<(Dataset, IngestReport)> {
    let source = context.source;
    let mut dataset = context.store.create_dataset(&context.dataset_name, true)?;
    dataset.add_group_field(GROUP_FIELD, DEFAULT_GROUP_SLICE)?;
    dataset.add_sample_field("split", FieldKind::String)?;

    let builder = RecordBuilder::new(source);
    let mut report = IngestReport::default();
    let mut batch: Vec<Sample> = vec![];

    info!("Loading dataset...");
    let scenes = source.scenes();
    let bar = ProgressBar::new(scenes.len() as u64);
    for scene in scenes {
        bar.inc(1);
        let Some(split) = source.splits().assign(&scene.name) else {
            debug!("Skipping {}: in neither split.", scene.name);
            report.skipped_scenes += 1;
            continue;
        };

        let mut token = scene.first_sample_token.clone();
        loop {
            let instant = source.sample(&token)?;
            let group = Group::new();
            for channel in SensorChannel::iter() {
                let Some(sample_data_token) = instant.data.get(channel.as_ref()) else {
                    if !channel.is_radar() {
                        report.missing_channels += 1;
                    }
                    continue;
                };
                if channel.is_radar() {
                    report.skipped_radar += 1;
                    continue;
                }

                let reading = source.sample_data(sample_data_token)?;
                let filepath = source.dataroot().join(&reading.filename);
                let mut sample = builder.build(
                    &group,
                    &filepath,
                    channel.as_ref(),
                    reading.modality,
                    sample_data_token,
                )?;
                stamp(&mut sample, split, &scene.name, &reading)?;
                batch.push(sample);
            }
            report.num_groups += 1;

            if instant.is_last() {
                break;
            }
            token = instant.next;
        }

        if !batch.is_empty() {
            dataset.add_samples(&batch)?;
            batch.clear();
        }
    }
    bar.finish();

    let mut sidebar_groups = dataset.default_sidebar_groups();
    sidebar_groups.extend(custom_sidebar_groups());
    dataset.set_sidebar_groups(sidebar_groups);
    dataset.save()?;
    dataset.save_view(&context.export_view_name, context.export_view.clone())?;

    let report = count(&dataset, report)?;
    info!(
        "Created dataset `{}` with {} samples in {} groups.",
        context.dataset_name, report.num_samples, report.num_groups
    );
    Ok((dataset, report))
}

/// Common fields of every record.
fn stamp(sample: &mut Sample, split: Split, scene_name: &str, reading: &SensorReading) -> Result<()> {
    let timestamp = DateTime::<Utc>::from_timestamp_micros(reading.timestamp)
        .with_context(|| format!("Timestamp {} is out of range.", reading.timestamp))?;
    sample.split = Some(split);
    sample.scene_name = Some(scene_name.to_string());
    sample.sample_token = Some(reading.token.clone());
    sample.timestamp = Some(timestamp);
    sample.frame_index = Some(frame_index(Path::new(&reading.filename))?);
    Ok(())
}

fn custom_sidebar_groups() -> Vec<SidebarGroup> {
    vec![
        SidebarGroup::new(
            "Scene Info",
            &["split", "scene_name", "sample_token", "timestamp", "frame_index"],
        ),
        SidebarGroup::new("Camera Extrinsics", &["camera_translation", "camera_rotation"]),
        SidebarGroup::new("Ego Pose", &["ego_translation", "ego_rotation"]),
        SidebarGroup::new("LiDAR Extrinsics", &["lidar_translation", "lidar_rotation"]),
        SidebarGroup::new("Intrinsics", &["intrinsics"]),
    ]
}

fn count(dataset: &Dataset, report: IngestReport) -> Result<IngestReport> {
    Ok(IngestReport {
        num_samples: dataset.len(),
        num_train: dataset.match_split(Split::Train)?.len(),
        num_validation: dataset.match_split(Split::Validation)?.len(),
        ..report
    })
}

//! # import_nuscenes
//!
//! Imports a nuScenes release into the dataset store, one group per key frame.
//! Runs again as a no-op: an existing dataset is loaded and reported.

use anyhow::Result;
use nuscenes_prep::{config::IngestConfig, ingest};

#[macro_use]
extern crate log;

/// Script entrypoint.
pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = IngestConfig::default();
    info!(
        "Importing {} from {:?} into dataset `{}`.",
        config.version, config.dataset_root, config.dataset_name
    );
    let (dataset, report) = ingest::run(&config)?;
    if report.skipped_scenes > 0 {
        warn!("Skipped {} scenes in neither split.", report.skipped_scenes);
    }
    if report.missing_channels > 0 {
        warn!("{} channels were missing from key frames.", report.missing_channels);
    }

    println!("{report}");
    println!("{dataset}");
    Ok(())
}

//! # export_data
//!
//! Exports the camera images and ego poses of a saved view, organized by
//! scene and timestamp.

use anyhow::Result;
use nuscenes_prep::{config::ExportConfig, export};

#[macro_use]
extern crate log;

/// Script entrypoint.
pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ExportConfig::default();
    let report = export::run(&config)?;
    if report.skipped_groups > 0 {
        warn!("Skipped {} groups without camera records.", report.skipped_groups);
    }
    println!("{report}");
    Ok(())
}

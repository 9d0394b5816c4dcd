//! # path
//!
//! File path utilities.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Extension of point clouds in the output format.
pub const PCD_EXTENSION: &str = "pcd";

/// Frame index of a sensor file: its file name up to the first `.`.
/// E.g., `n015-...__CAM_FRONT__1532402927612460.jpg` -> `n015-...__CAM_FRONT__1532402927612460`.
pub fn frame_index(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .context("Cannot parse file name.")?
        .to_str()
        .context("Cannot convert file name to string.")?;
    let index = file_name.split('.').next().unwrap_or(file_name);
    Ok(index.to_string())
}

/// Whether a point cloud is already stored as `.pcd`.
pub fn is_pcd(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(PCD_EXTENSION)
}

/// The path with its final extension removed.
/// E.g., `sweep.pcd.bin` -> `sweep.pcd`.
pub fn strip_extension(path: &Path) -> PathBuf {
    path.with_extension("")
}

//! # store
//!
//! File-backed catalog of grouped datasets.
//!
//! Each dataset lives in `<root>/<name>/` as `dataset.json` (metadata,
//! schema, sidebar layout, saved views) and `samples.jsonl` (one record per
//! line, appended batch by batch).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};

/// Dataset metadata and sample batches.
pub mod dataset;
/// Filtered views over a dataset.
pub mod view;

pub use dataset::{Dataset, DatasetInfo, SidebarGroup};
pub use view::{DatasetView, ViewStage};

/// Metadata file of a dataset.
pub const METADATA_FILE: &str = "dataset.json";
/// Record file of a dataset.
pub const SAMPLES_FILE: &str = "samples.jsonl";

/// Catalog of datasets under one directory.
#[derive(Clone, Debug)]
pub struct DatasetStore {
    root: PathBuf,
}

impl DatasetStore {
    /// Catalog rooted at `root`. The directory is created on first write.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Catalog directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all datasets, sorted.
    pub fn list_datasets(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(vec![]);
        }
        let mut names = vec![];
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Cannot list {:?}.", self.root))?
        {
            let path = entry?.path();
            if !path.join(METADATA_FILE).is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Whether a dataset named `name` exists.
    pub fn dataset_exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_datasets()?.iter().any(|n| n == name))
    }

    /// Create an empty dataset. With `overwrite`, an existing one is replaced.
    pub fn create_dataset(&self, name: &str, overwrite: bool) -> Result<Dataset> {
        let dir = self.root.join(name);
        if self.dataset_exists(name)? {
            if !overwrite {
                bail!("Dataset `{name}` already exists.");
            }
            warn!("Overwriting dataset `{name}`.");
        }
        if dir.exists() {
            fs::remove_dir_all(&dir).with_context(|| format!("Cannot remove {dir:?}."))?;
        }
        fs::create_dir_all(&dir).with_context(|| format!("Cannot create {dir:?}."))?;
        Dataset::create(&dir, name)
    }

    /// Open an existing dataset.
    pub fn load_dataset(&self, name: &str) -> Result<Dataset> {
        if !self.dataset_exists(name)? {
            bail!("Dataset `{name}` not found in {:?}.", self.root);
        }
        Dataset::open(&self.root.join(name))
    }
}

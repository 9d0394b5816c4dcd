use std::{
    collections::{BTreeMap, HashSet},
    fmt,
    fs::{File, OpenOptions},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, ensure, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{
    view::{DatasetView, ViewStage},
    METADATA_FILE, SAMPLES_FILE,
};
use crate::{
    constants::{SensorChannel, Split},
    io::{read_json, write_json_pretty},
    structures::{FieldKind, Sample},
};

/// Named list of field paths shown together in the sidebar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SidebarGroup {
    /// Section title.
    pub name: String,
    /// Field paths in the section.
    pub paths: Vec<String>,
}

impl SidebarGroup {
    /// Section with the given title and fields.
    pub fn new(name: &str, paths: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Persisted dataset metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Dataset name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Name of the group field, once declared.
    pub group_field: Option<String>,
    /// Slice shown by default.
    pub default_group_slice: Option<String>,
    /// Declared field kinds.
    pub schema: BTreeMap<String, FieldKind>,
    /// Sidebar layout.
    pub sidebar_groups: Vec<SidebarGroup>,
    /// Saved views by name.
    pub saved_views: BTreeMap<String, Vec<ViewStage>>,
}

/// A grouped dataset on disk.
///
/// Records are appended to `samples.jsonl` batch by batch and read back on
/// demand; only `(group id, element)` keys are held in memory.
#[derive(Debug)]
pub struct Dataset {
    dir: PathBuf,
    info: DatasetInfo,
    elements: HashSet<(Uuid, String)>,
}

impl Dataset {
    /// Initialize an empty dataset in an existing directory.
    pub(crate) fn create(dir: &Path, name: &str) -> Result<Self> {
        let dataset = Self {
            dir: dir.to_path_buf(),
            info: DatasetInfo {
                name: name.to_string(),
                created_at: Utc::now(),
                group_field: None,
                default_group_slice: None,
                schema: BTreeMap::new(),
                sidebar_groups: vec![],
                saved_views: BTreeMap::new(),
            },
            elements: HashSet::new(),
        };
        File::create(dataset.samples_path())
            .with_context(|| format!("Cannot create {:?}.", dataset.samples_path()))?;
        dataset.save()?;
        Ok(dataset)
    }

    /// Open a dataset directory.
    pub(crate) fn open(dir: &Path) -> Result<Self> {
        let info: DatasetInfo = read_json(&dir.join(METADATA_FILE))?;
        let mut dataset = Self {
            dir: dir.to_path_buf(),
            info,
            elements: HashSet::new(),
        };
        for sample in dataset.samples()? {
            dataset.elements.insert((sample.group.id, sample.group.name));
        }
        debug!(
            "Opened dataset `{}` with {} samples.",
            dataset.name(),
            dataset.len()
        );
        Ok(dataset)
    }

    fn samples_path(&self) -> PathBuf {
        self.dir.join(SAMPLES_FILE)
    }

    /// Dataset name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Persisted metadata.
    pub fn info(&self) -> &DatasetInfo {
        &self.info
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of groups.
    pub fn num_groups(&self) -> usize {
        self.elements
            .iter()
            .map(|(id, _)| id)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Declare the group field and its default slice.
    pub fn add_group_field(&mut self, name: &str, default_slice: SensorChannel) -> Result<()> {
        self.add_sample_field(name, FieldKind::Group)?;
        self.info.group_field = Some(name.to_string());
        self.info.default_group_slice = Some(default_slice.to_string());
        Ok(())
    }

    /// Declare a field. Redeclaring it with another kind is an error.
    pub fn add_sample_field(&mut self, name: &str, kind: FieldKind) -> Result<()> {
        match self.info.schema.get(name) {
            Some(existing) if *existing != kind => bail!(
                "Field `{name}` is declared as {existing:?}, cannot redeclare it as {kind:?}."
            ),
            _ => {
                self.info.schema.insert(name.to_string(), kind);
            }
        }
        Ok(())
    }

    /// Append a batch of records.
    ///
    /// The whole batch is validated before anything is written: each group
    /// holds at most one record per element, and field kinds must agree with
    /// the schema. Earlier batches are never touched.
    pub fn add_samples(&mut self, samples: &[Sample]) -> Result<usize> {
        ensure!(
            self.info.group_field.is_some(),
            "Dataset `{}` has no group field.",
            self.name()
        );

        let mut batch_elements = HashSet::new();
        let mut new_fields = BTreeMap::new();
        for sample in samples {
            let key = (sample.group.id, sample.group.name.clone());
            if self.elements.contains(&key) || !batch_elements.insert(key) {
                bail!(
                    "Group {} already has a `{}` element.",
                    sample.group.id,
                    sample.group.name
                );
            }
            for (field, kind) in sample.field_kinds() {
                let declared = self.info.schema.get(field).or(new_fields.get(field));
                match declared {
                    Some(existing) if *existing != kind => bail!(
                        "Field `{field}` is declared as {existing:?}, sample {} has {kind:?}.",
                        sample.id
                    ),
                    Some(_) => {}
                    None => {
                        new_fields.insert(field, kind);
                    }
                }
            }
        }

        let file = OpenOptions::new()
            .append(true)
            .open(self.samples_path())
            .with_context(|| format!("Cannot open {:?}.", self.samples_path()))?;
        let mut writer = BufWriter::new(file);
        for sample in samples {
            serde_json::to_writer(&mut writer, sample)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        self.elements.extend(batch_elements);
        self.info
            .schema
            .extend(new_fields.into_iter().map(|(f, k)| (f.to_string(), k)));
        debug!("Added {} samples to `{}`.", samples.len(), self.name());
        Ok(samples.len())
    }

    /// Persist metadata.
    pub fn save(&self) -> Result<()> {
        write_json_pretty(&self.dir.join(METADATA_FILE), &self.info)
    }

    /// All records, in insertion order.
    pub fn samples(&self) -> Result<Vec<Sample>> {
        let path = self.samples_path();
        let file = File::open(&path).with_context(|| format!("File not found: {path:?}."))?;
        let mut samples = vec![];
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let sample = serde_json::from_str(&line)
                .with_context(|| format!("Malformed record on line {} of {path:?}.", i + 1))?;
            samples.push(sample);
        }
        Ok(samples)
    }

    /// View over all records.
    pub fn view(&self) -> Result<DatasetView> {
        Ok(DatasetView::new(self.samples()?))
    }

    /// Records of one split.
    pub fn match_split(&self, split: Split) -> Result<DatasetView> {
        Ok(self.view()?.apply(&ViewStage::Match {
            field: "split".to_string(),
            value: json!(split),
        }))
    }

    /// Records occupying the `slice` element of their group.
    pub fn select_group_slice(&self, slice: &str) -> Result<DatasetView> {
        Ok(self.view()?.apply(&ViewStage::Match {
            field: "group.name".to_string(),
            value: json!(slice),
        }))
    }

    /// Records of one group, keyed by element name.
    pub fn get_group(&self, id: Uuid) -> Result<BTreeMap<String, Sample>> {
        Ok(self
            .samples()?
            .into_iter()
            .filter(|s| s.group.id == id)
            .map(|s| (s.group.name.clone(), s))
            .collect())
    }

    /// Default sidebar layout: record metadata, then labels, then primitives.
    pub fn default_sidebar_groups(&self) -> Vec<SidebarGroup> {
        let mut metadata = vec![];
        let mut labels = vec![];
        let mut primitives = vec![];
        for (field, kind) in &self.info.schema {
            match kind {
                FieldKind::Id | FieldKind::Path | FieldKind::Group => metadata.push(field.clone()),
                FieldKind::Polylines | FieldKind::Detections => labels.push(field.clone()),
                _ => primitives.push(field.clone()),
            }
        }
        vec![
            SidebarGroup {
                name: "metadata".to_string(),
                paths: metadata,
            },
            SidebarGroup {
                name: "labels".to_string(),
                paths: labels,
            },
            SidebarGroup {
                name: "primitives".to_string(),
                paths: primitives,
            },
        ]
    }

    /// Replace the sidebar layout.
    pub fn set_sidebar_groups(&mut self, groups: Vec<SidebarGroup>) {
        self.info.sidebar_groups = groups;
    }

    /// Save (or replace) a named view and persist metadata.
    pub fn save_view(&mut self, name: &str, stages: Vec<ViewStage>) -> Result<()> {
        self.info.saved_views.insert(name.to_string(), stages);
        self.save()
    }

    /// Evaluate a saved view.
    pub fn load_saved_view(&self, name: &str) -> Result<DatasetView> {
        let stages = self
            .info
            .saved_views
            .get(name)
            .with_context(|| format!("Dataset `{}` has no saved view `{name}`.", self.name()))?;
        Ok(self.view()?.apply_all(stages))
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name:          {}", self.info.name)?;
        writeln!(f, "Media type:    group")?;
        writeln!(
            f,
            "Group slice:   {}",
            self.info.default_group_slice.as_deref().unwrap_or("-")
        )?;
        writeln!(f, "Num groups:    {}", self.num_groups())?;
        writeln!(f, "Num samples:   {}", self.len())?;
        writeln!(f, "Saved views:   {}", self.info.saved_views.len())?;
        writeln!(f, "Sample fields:")?;
        for (field, kind) in &self.info.schema {
            writeln!(f, "    {field:<20} {kind:?}")?;
        }
        Ok(())
    }
}

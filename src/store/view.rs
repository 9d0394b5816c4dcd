use std::cmp::Reverse;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::structures::Sample;

/// One filtering or ordering step of a view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ViewStage {
    /// Keep records whose field equals `value`.
    Match {
        /// Field name (e.g., `scene_name`, `group.name`).
        field: String,
        /// Expected JSON value.
        value: Value,
    },
    /// Order records by the number of labels in `field`, fewest first.
    /// Records without the field go last.
    SortByLabelCount {
        /// Label field name.
        field: String,
        /// Most labels first.
        #[serde(default)]
        reverse: bool,
    },
    /// Keep the first `count` records.
    Limit {
        /// Maximum number of records.
        count: usize,
    },
}

/// Ordered selection of records.
#[derive(Clone, Debug, Default)]
pub struct DatasetView {
    samples: Vec<Sample>,
}

impl DatasetView {
    /// View over the given records, in order.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Apply one stage.
    pub fn apply(mut self, stage: &ViewStage) -> Self {
        match stage {
            ViewStage::Match { field, value } => {
                self.samples
                    .retain(|s| s.get_field(field).as_ref() == Some(value));
            }
            ViewStage::SortByLabelCount { field, reverse } => {
                // `sort_by_key` is stable: ties keep insertion order.
                let reverse = *reverse;
                self.samples.sort_by_key(|s| match s.label_count(field) {
                    Some(n) if reverse => (0, Reverse(n), 0),
                    Some(n) => (0, Reverse(0), n),
                    None => (1, Reverse(0), 0),
                });
            }
            ViewStage::Limit { count } => self.samples.truncate(*count),
        }
        self
    }

    /// Apply stages in order.
    pub fn apply_all(self, stages: &[ViewStage]) -> Self {
        stages.iter().fold(self, |view, stage| view.apply(stage))
    }

    /// Records with `scene_name == name`.
    pub fn match_scene(&self, name: &str) -> Self {
        self.clone().apply(&ViewStage::Match {
            field: "scene_name".to_string(),
            value: json!(name),
        })
    }

    /// Distinct scene names, sorted.
    pub fn distinct_scene_names(&self) -> Vec<String> {
        self.samples
            .iter()
            .filter_map(|s| s.scene_name.clone())
            .unique()
            .sorted()
            .collect()
    }

    /// Distinct group ids, in first-seen order.
    pub fn group_ids(&self) -> Vec<Uuid> {
        self.samples.iter().map(|s| s.group.id).unique().collect()
    }

    /// Records in view order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// First record, if any.
    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

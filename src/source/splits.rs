//! Scene-name split assignment.

use std::{collections::HashSet, path::Path};

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::{constants::Split, io::read_json};

/// Mini release.
pub const MINI_VERSION: &str = "v1.0-mini";
/// Full train/validation release.
pub const TRAINVAL_VERSION: &str = "v1.0-trainval";

const MINI_TRAIN: [&str; 8] = [
    "scene-0061",
    "scene-0553",
    "scene-0655",
    "scene-0757",
    "scene-0796",
    "scene-1077",
    "scene-1094",
    "scene-1100",
];

const MINI_VAL: [&str; 2] = ["scene-0103", "scene-0916"];

/// The 150 validation scenes of `v1.0-trainval`. The other 700 scenes of the
/// release are training scenes.
#[rustfmt::skip]
const TRAINVAL_VAL: [&str; 150] = [
    "scene-0003", "scene-0012", "scene-0013", "scene-0014", "scene-0015", "scene-0016", "scene-0017", "scene-0018",
    "scene-0035", "scene-0036", "scene-0038", "scene-0039", "scene-0092", "scene-0093", "scene-0094", "scene-0095",
    "scene-0096", "scene-0097", "scene-0098", "scene-0099", "scene-0100", "scene-0101", "scene-0102", "scene-0103",
    "scene-0104", "scene-0105", "scene-0106", "scene-0107", "scene-0108", "scene-0109", "scene-0110", "scene-0221",
    "scene-0268", "scene-0269", "scene-0270", "scene-0271", "scene-0272", "scene-0273", "scene-0274", "scene-0275",
    "scene-0276", "scene-0277", "scene-0278", "scene-0329", "scene-0330", "scene-0331", "scene-0332", "scene-0344",
    "scene-0345", "scene-0346", "scene-0519", "scene-0520", "scene-0521", "scene-0522", "scene-0523", "scene-0524",
    "scene-0552", "scene-0553", "scene-0554", "scene-0555", "scene-0556", "scene-0557", "scene-0558", "scene-0559",
    "scene-0560", "scene-0561", "scene-0562", "scene-0563", "scene-0564", "scene-0565", "scene-0625", "scene-0626",
    "scene-0627", "scene-0629", "scene-0630", "scene-0632", "scene-0633", "scene-0634", "scene-0635", "scene-0636",
    "scene-0637", "scene-0638", "scene-0770", "scene-0771", "scene-0775", "scene-0777", "scene-0778", "scene-0780",
    "scene-0781", "scene-0782", "scene-0783", "scene-0784", "scene-0794", "scene-0795", "scene-0796", "scene-0797",
    "scene-0798", "scene-0799", "scene-0800", "scene-0802", "scene-0904", "scene-0905", "scene-0906", "scene-0907",
    "scene-0908", "scene-0909", "scene-0910", "scene-0911", "scene-0912", "scene-0913", "scene-0914", "scene-0915",
    "scene-0916", "scene-0917", "scene-0919", "scene-0920", "scene-0921", "scene-0922", "scene-0923", "scene-0924",
    "scene-0925", "scene-0926", "scene-0927", "scene-0928", "scene-0929", "scene-0930", "scene-0931", "scene-0962",
    "scene-0963", "scene-0966", "scene-0967", "scene-0968", "scene-0969", "scene-0971", "scene-0972", "scene-1059",
    "scene-1060", "scene-1061", "scene-1062", "scene-1063", "scene-1064", "scene-1065", "scene-1066", "scene-1067",
    "scene-1068", "scene-1069", "scene-1070", "scene-1071", "scene-1072", "scene-1073",
];

/// On-disk layout of a split file.
#[derive(Deserialize)]
struct SplitsFile {
    train: Vec<String>,
    val: Vec<String>,
}

/// Train and validation scene-name sets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneSplits {
    /// Training scene names.
    pub train: HashSet<String>,
    /// Validation scene names.
    pub val: HashSet<String>,
    /// Split of scenes listed in neither set; `None` skips them.
    pub rest: Option<Split>,
}

impl SceneSplits {
    /// Build from scene-name lists.
    pub fn new<I, J, S, T>(train: I, val: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            train: train.into_iter().map(Into::into).collect(),
            val: val.into_iter().map(Into::into).collect(),
            rest: None,
        }
    }

    /// `mini_train` / `mini_val`.
    pub fn mini() -> Self {
        Self::new(MINI_TRAIN, MINI_VAL)
    }

    /// `train` / `val` of the full release.
    pub fn trainval() -> Self {
        Self {
            rest: Some(Split::Train),
            ..Self::new(Vec::<String>::new(), TRAINVAL_VAL)
        }
    }

    /// Split of a release. A `{"train": [...], "val": [...]}` file at
    /// `splits_path` takes precedence over the built-in lists.
    pub fn for_version(version: &str, splits_path: &Path) -> Result<Self> {
        if splits_path.is_file() {
            let file: SplitsFile = read_json(splits_path)?;
            return Ok(Self::new(file.train, file.val));
        }
        match version {
            MINI_VERSION => Ok(Self::mini()),
            TRAINVAL_VERSION => Ok(Self::trainval()),
            _ => bail!("No scene split for `{version}`: {splits_path:?} not found."),
        }
    }

    /// Exact-name membership; training wins if a name is in both.
    pub fn assign(&self, scene_name: &str) -> Option<Split> {
        if self.train.contains(scene_name) {
            Some(Split::Train)
        } else if self.val.contains(scene_name) {
            Some(Split::Validation)
        } else {
            self.rest
        }
    }
}

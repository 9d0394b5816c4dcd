//! nuScenes release reader.
//!
//! Loads the JSON tables of `<dataroot>/<version>/` once and answers
//! token lookups from in-memory indexes.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;

use super::{
    splits::SceneSplits,
    tables::{
        CalibratedSensorRow, CategoryRow, EgoPoseRow, InstanceRow, SampleAnnotationRow,
        SampleDataRow, SampleRow, SceneRow, SensorRow,
    },
    Calibration, SampleInstant, SceneRecord, SensorReading, SensorSource,
};
use crate::{
    constants::{
        SensorModality, CALIBRATED_SENSOR_TABLE, CATEGORY_TABLE, EGO_POSE_TABLE, INSTANCE_TABLE,
        SAMPLE_ANNOTATION_TABLE, SAMPLE_DATA_TABLE, SAMPLE_TABLE, SCENE_TABLE, SENSOR_TABLE,
        SPLITS_FILE,
    },
    geometry::{
        camera::pinhole_camera::{BoxVisibility, PinholeCamera},
        polytope::Cuboid,
        se3::Pose,
    },
    io::read_table,
};

/// In-memory nuScenes release.
pub struct NuScenes {
    /// Root dataset directory.
    dataroot: PathBuf,
    /// Release version (e.g., `v1.0-mini`).
    version: String,
    scenes: Vec<SceneRecord>,
    samples: HashMap<String, SampleRow>,
    sample_data: HashMap<String, SampleDataRow>,
    calibrated_sensors: HashMap<String, CalibratedSensorRow>,
    sensors: HashMap<String, SensorRow>,
    ego_poses: HashMap<String, EgoPoseRow>,
    /// Sample token -> channel -> key-frame reading token.
    sample_channels: HashMap<String, BTreeMap<String, String>>,
    /// Sample token -> ground-truth boxes in the global frame.
    sample_boxes: HashMap<String, Vec<Cuboid>>,
    splits: SceneSplits,
}

impl NuScenes {
    /// Load a release and build the lookup indexes.
    pub fn new(version: &str, dataroot: &Path) -> Result<Self> {
        let table_dir = dataroot.join(version);
        info!("Loading nuScenes tables from {table_dir:?}.");

        let scene_rows: Vec<SceneRow> = read_table(&table_dir.join(SCENE_TABLE))?;
        let samples = index_by_token(load(&table_dir, SAMPLE_TABLE)?, |r: &SampleRow| &r.token);
        let sample_data = index_by_token(load(&table_dir, SAMPLE_DATA_TABLE)?, |r: &SampleDataRow| {
            &r.token
        });
        let calibrated_sensors = index_by_token(
            load(&table_dir, CALIBRATED_SENSOR_TABLE)?,
            |r: &CalibratedSensorRow| &r.token,
        );
        let sensors = index_by_token(load(&table_dir, SENSOR_TABLE)?, |r: &SensorRow| &r.token);
        let ego_poses = index_by_token(load(&table_dir, EGO_POSE_TABLE)?, |r: &EgoPoseRow| {
            &r.token
        });
        let instances = index_by_token(load(&table_dir, INSTANCE_TABLE)?, |r: &InstanceRow| {
            &r.token
        });
        let categories = index_by_token(load(&table_dir, CATEGORY_TABLE)?, |r: &CategoryRow| {
            &r.token
        });
        let annotations: Vec<SampleAnnotationRow> =
            read_table(&table_dir.join(SAMPLE_ANNOTATION_TABLE))?;

        let mut sample_channels: HashMap<String, BTreeMap<String, String>> = HashMap::new();
        for row in sample_data.values().filter(|r| r.is_key_frame) {
            let calibrated = lookup(&calibrated_sensors, CALIBRATED_SENSOR_TABLE, &row.calibrated_sensor_token)?;
            let sensor = lookup(&sensors, SENSOR_TABLE, &calibrated.sensor_token)?;
            sample_channels
                .entry(row.sample_token.clone())
                .or_default()
                .insert(sensor.channel.clone(), row.token.clone());
        }

        let mut sample_boxes: HashMap<String, Vec<Cuboid>> = HashMap::new();
        for row in annotations {
            let instance = lookup(&instances, INSTANCE_TABLE, &row.instance_token)?;
            let category = lookup(&categories, CATEGORY_TABLE, &instance.category_token)?;
            sample_boxes.entry(row.sample_token).or_default().push(Cuboid {
                label: category.name.clone(),
                center: row.translation,
                wlh: row.size,
                orientation: row.rotation,
            });
        }

        let splits = SceneSplits::for_version(version, &table_dir.join(SPLITS_FILE))?;
        let scenes: Vec<SceneRecord> = scene_rows
            .into_iter()
            .map(|row| {
                debug!("Scene {} has {} key frames.", row.name, row.nbr_samples);
                SceneRecord {
                    token: row.token,
                    name: row.name,
                    first_sample_token: row.first_sample_token,
                }
            })
            .collect();

        info!(
            "Loaded {} scenes, {} samples, {} sensor readings.",
            scenes.len(),
            samples.len(),
            sample_data.len()
        );
        Ok(Self {
            dataroot: dataroot.to_path_buf(),
            version: version.to_string(),
            scenes,
            samples,
            sample_data,
            calibrated_sensors,
            sensors,
            ego_poses,
            sample_channels,
            sample_boxes,
            splits,
        })
    }

    /// Release version.
    pub fn version(&self) -> &str {
        &self.version
    }

    fn calibrated_sensor(&self, sample_data_token: &str) -> Result<&CalibratedSensorRow> {
        let data = lookup(&self.sample_data, SAMPLE_DATA_TABLE, sample_data_token)?;
        lookup(
            &self.calibrated_sensors,
            CALIBRATED_SENSOR_TABLE,
            &data.calibrated_sensor_token,
        )
    }
}

impl SensorSource for NuScenes {
    fn dataroot(&self) -> &Path {
        &self.dataroot
    }

    fn scenes(&self) -> &[SceneRecord] {
        &self.scenes
    }

    fn sample(&self, token: &str) -> Result<SampleInstant> {
        let row = lookup(&self.samples, SAMPLE_TABLE, token)?;
        Ok(SampleInstant {
            token: row.token.clone(),
            timestamp: row.timestamp,
            next: row.next.clone(),
            data: self.sample_channels.get(token).cloned().unwrap_or_default(),
        })
    }

    fn sample_data(&self, token: &str) -> Result<SensorReading> {
        let row = lookup(&self.sample_data, SAMPLE_DATA_TABLE, token)?;
        let calibrated = self.calibrated_sensor(token)?;
        let sensor = lookup(&self.sensors, SENSOR_TABLE, &calibrated.sensor_token)?;
        Ok(SensorReading {
            token: row.token.clone(),
            channel: sensor.channel.clone(),
            modality: sensor.modality,
            filename: row.filename.clone(),
            timestamp: row.timestamp,
        })
    }

    fn calibration(&self, sample_data_token: &str) -> Result<Calibration> {
        let calibrated = self.calibrated_sensor(sample_data_token)?;
        Ok(Calibration {
            sensor_pose: Pose {
                translation: calibrated.translation,
                rotation: calibrated.rotation,
            },
            camera_intrinsic: calibrated.camera_intrinsic.clone(),
        })
    }

    fn ego_pose(&self, sample_data_token: &str) -> Result<Pose> {
        let data = lookup(&self.sample_data, SAMPLE_DATA_TABLE, sample_data_token)?;
        let ego_pose = lookup(&self.ego_poses, EGO_POSE_TABLE, &data.ego_pose_token)?;
        Ok(Pose {
            translation: ego_pose.translation,
            rotation: ego_pose.rotation,
        })
    }

    fn sensor_boxes(
        &self,
        sample_data_token: &str,
        visibility: BoxVisibility,
    ) -> Result<Vec<Cuboid>> {
        let data = lookup(&self.sample_data, SAMPLE_DATA_TABLE, sample_data_token)?;
        let ego_pose = self.ego_pose(sample_data_token)?;
        let calibration = self.calibration(sample_data_token)?;
        let reading = self.sample_data(sample_data_token)?;

        let camera = match reading.modality {
            SensorModality::Camera => Some(PinholeCamera::from_rows(
                &calibration.camera_intrinsic,
                data.width,
                data.height,
            )?),
            _ => None,
        };

        let boxes = self
            .sample_boxes
            .get(&data.sample_token)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|cuboid| {
                cuboid
                    .express_in(&ego_pose)
                    .express_in(&calibration.sensor_pose)
            })
            .filter(|cuboid| match &camera {
                Some(camera) => camera.is_visible(cuboid, visibility),
                None => true,
            })
            .collect();
        Ok(boxes)
    }

    fn splits(&self) -> &SceneSplits {
        &self.splits
    }
}

fn load<T: DeserializeOwned>(table_dir: &Path, table: &str) -> Result<Vec<T>> {
    read_table(&table_dir.join(table))
}

fn index_by_token<T>(rows: Vec<T>, token: impl Fn(&T) -> &String) -> HashMap<String, T> {
    rows.into_iter()
        .map(|row| (token(&row).clone(), row))
        .collect()
}

fn lookup<'a, T>(table: &'a HashMap<String, T>, table_name: &str, token: &str) -> Result<&'a T> {
    table
        .get(token)
        .with_context(|| format!("Table `{table_name}` has no token `{token}`."))
}

#![allow(dead_code)]

use std::{
    cell::Cell,
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use nuscenes_prep::{
    constants::{SensorChannel, SensorModality},
    geometry::{camera::pinhole_camera::BoxVisibility, polytope::Cuboid, se3::Pose},
    source::{
        Calibration, SampleInstant, SceneRecord, SceneSplits, SensorReading, SensorSource,
    },
};

pub const IMAGE_WIDTH: u32 = 64;
pub const IMAGE_HEIGHT: u32 = 48;

/// Fresh, empty scratch directory unique to this test process.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "nuscenes-prep-it-{name}-{}",
        std::process::id()
    ));
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// In-memory release with real media files on disk.
pub struct FakeSource {
    root: PathBuf,
    scenes: Vec<SceneRecord>,
    samples: HashMap<String, SampleInstant>,
    readings: HashMap<String, SensorReading>,
    objects: HashMap<String, usize>,
    splits: SceneSplits,
    /// Number of `sample_data` lookups so far.
    pub reads: Cell<usize>,
}

impl FakeSource {
    pub fn new(name: &str, train: &[&str], val: &[&str]) -> Self {
        Self {
            root: scratch_dir(name),
            scenes: vec![],
            samples: HashMap::new(),
            readings: HashMap::new(),
            objects: HashMap::new(),
            splits: SceneSplits::new(train.iter().copied(), val.iter().copied()),
            reads: Cell::new(0),
        }
    }

    /// Add a scene of `num_frames` key frames, each with `channels` and
    /// `num_objects` annotated boxes. Channel readings are 10 ms apart.
    pub fn add_scene(
        &mut self,
        name: &str,
        num_frames: usize,
        channels: &[SensorChannel],
        num_objects: usize,
    ) -> &mut Self {
        let start = 1_600_000_000_000_000 + self.samples.len() as i64 * 1_000_000;
        let tokens: Vec<String> = (0..num_frames).map(|i| format!("{name}-s{i}")).collect();
        for (i, token) in tokens.iter().enumerate() {
            let timestamp = start + i as i64 * 500_000;
            let mut data = BTreeMap::new();
            for (c, channel) in channels.iter().enumerate() {
                let reading = self.write_reading(name, *channel, timestamp + c as i64 * 10_000);
                data.insert(channel.to_string(), reading.token.clone());
                self.objects.insert(reading.token.clone(), num_objects);
                self.readings.insert(reading.token.clone(), reading);
            }
            let next = tokens.get(i + 1).cloned().unwrap_or_default();
            self.samples.insert(
                token.clone(),
                SampleInstant {
                    token: token.clone(),
                    timestamp,
                    next,
                    data,
                },
            );
        }
        self.scenes.push(SceneRecord {
            token: format!("{name}-token"),
            name: name.to_string(),
            first_sample_token: tokens[0].clone(),
        });
        self
    }

    fn write_reading(&self, scene: &str, channel: SensorChannel, timestamp: i64) -> SensorReading {
        let (modality, extension) = if channel.is_camera() {
            (SensorModality::Camera, "jpg")
        } else if channel == SensorChannel::LidarTop {
            (SensorModality::Lidar, "pcd.bin")
        } else {
            (SensorModality::Radar, "pcd")
        };
        let filename = format!("samples/{channel}/{scene}__{channel}__{timestamp}.{extension}");
        let path = self.root.join(&filename);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        match modality {
            SensorModality::Camera => write_image(&path),
            SensorModality::Lidar => write_lidar_bin(&path),
            _ => {}
        }
        SensorReading {
            token: format!("{scene}-{channel}-{timestamp}"),
            channel: channel.to_string(),
            modality,
            filename,
            timestamp,
        }
    }

    fn reading(&self, token: &str) -> Result<&SensorReading> {
        self.readings
            .get(token)
            .with_context(|| format!("No reading `{token}`."))
    }
}

impl SensorSource for FakeSource {
    fn dataroot(&self) -> &Path {
        &self.root
    }

    fn scenes(&self) -> &[SceneRecord] {
        &self.scenes
    }

    fn sample(&self, token: &str) -> Result<SampleInstant> {
        self.samples
            .get(token)
            .cloned()
            .with_context(|| format!("No sample `{token}`."))
    }

    fn sample_data(&self, token: &str) -> Result<SensorReading> {
        self.reads.set(self.reads.get() + 1);
        self.reading(token).cloned()
    }

    fn calibration(&self, sample_data_token: &str) -> Result<Calibration> {
        let reading = self.reading(sample_data_token)?;
        let camera_intrinsic = if reading.modality == SensorModality::Camera {
            vec![
                vec![50., 0., 32.],
                vec![0., 50., 24.],
                vec![0., 0., 1.],
            ]
        } else {
            vec![]
        };
        Ok(Calibration {
            sensor_pose: Pose {
                translation: [1.5, 0., 1.6],
                rotation: [0.5, -0.5, 0.5, -0.5],
            },
            camera_intrinsic,
        })
    }

    /// The ego vehicle drives along +x at 10 m/s.
    fn ego_pose(&self, sample_data_token: &str) -> Result<Pose> {
        let reading = self.reading(sample_data_token)?;
        let seconds = (reading.timestamp - 1_600_000_000_000_000) as f64 * 1e-6;
        Ok(Pose {
            translation: [10. * seconds, 0., 0.],
            rotation: [1., 0., 0., 0.],
        })
    }

    /// `num_objects` boxes straight ahead of the sensor, 10 m to 10 + n m away.
    fn sensor_boxes(
        &self,
        sample_data_token: &str,
        _visibility: BoxVisibility,
    ) -> Result<Vec<Cuboid>> {
        let num_objects = self.objects[sample_data_token];
        Ok((0..num_objects)
            .map(|i| Cuboid {
                label: "vehicle.car".to_string(),
                center: [0., 0., 10. + i as f64],
                wlh: [1.8, 4.2, 1.5],
                orientation: [1., 0., 0., 0.],
            })
            .collect())
    }

    fn splits(&self) -> &SceneSplits {
        &self.splits
    }
}

pub fn write_image(path: &Path) {
    image::RgbImage::new(IMAGE_WIDTH, IMAGE_HEIGHT)
        .save(path)
        .unwrap();
}

fn write_lidar_bin(path: &Path) {
    let mut bytes = vec![];
    for value in [1f32, 2., 0.5, 12., 0., -3., 0.25, -1., 40., 5.] {
        bytes.write_f32::<LittleEndian>(value).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

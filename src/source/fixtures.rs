//! Tiny on-disk nuScenes release.
//!
//! Two scenes: `scene-0061` (mini train, key frames `s1` -> `s2`) and
//! `scene-9999` (no split, key frame `s3`). Each key frame has `CAM_FRONT`,
//! `LIDAR_TOP` and `RADAR_FRONT` readings, a car 10 m ahead of the ego vehicle
//! and a pedestrian 10 m behind it. The camera looks along ego +x.

use std::{
    fs,
    path::{Path, PathBuf},
};

use byteorder::{LittleEndian, WriteBytesExt};
use serde_json::{json, Value};

use crate::{
    constants::{
        CALIBRATED_SENSOR_TABLE, CATEGORY_TABLE, EGO_POSE_TABLE, INSTANCE_TABLE,
        SAMPLE_ANNOTATION_TABLE, SAMPLE_DATA_TABLE, SAMPLE_TABLE, SCENE_TABLE, SENSOR_TABLE,
    },
    io::write_json_pretty,
    test_utils::scratch_dir,
};

pub const IMAGE_WIDTH: u32 = 100;
pub const IMAGE_HEIGHT: u32 = 80;
pub const FIRST_TIMESTAMP: i64 = 1_532_402_927_647_951;

/// Camera-to-ego rotation for a camera looking along ego +x.
pub const FRONT_CAMERA_ROTATION: [f64; 4] = [0.5, -0.5, 0.5, -0.5];

pub struct FixtureRelease {
    pub root: PathBuf,
    pub version: String,
}

impl FixtureRelease {
    pub fn write(name: &str) -> Self {
        let root = scratch_dir(name);
        let version = "v1.0-mini".to_string();
        let tables = root.join(&version);
        fs::create_dir_all(&tables).unwrap();

        let keyframes = [("s1", "s2", "scene-a"), ("s2", "", "scene-a"), ("s3", "", "scene-b")];

        write_json_pretty(
            &tables.join(SCENE_TABLE),
            &json!([
                {"token": "scene-a", "name": "scene-0061", "first_sample_token": "s1", "nbr_samples": 2},
                {"token": "scene-b", "name": "scene-9999", "first_sample_token": "s3", "nbr_samples": 1},
            ]),
        )
        .unwrap();

        let samples: Vec<Value> = keyframes
            .iter()
            .enumerate()
            .map(|(i, (token, next, scene))| {
                json!({"token": token, "timestamp": timestamp(i), "next": next, "prev": "", "scene_token": scene})
            })
            .collect();
        write_json_pretty(&tables.join(SAMPLE_TABLE), &samples).unwrap();

        write_json_pretty(
            &tables.join(SENSOR_TABLE),
            &json!([
                {"token": "sensor-cam", "channel": "CAM_FRONT", "modality": "camera"},
                {"token": "sensor-lidar", "channel": "LIDAR_TOP", "modality": "lidar"},
                {"token": "sensor-radar", "channel": "RADAR_FRONT", "modality": "radar"},
            ]),
        )
        .unwrap();

        write_json_pretty(
            &tables.join(CALIBRATED_SENSOR_TABLE),
            &json!([
                {
                    "token": "cs-cam",
                    "sensor_token": "sensor-cam",
                    "translation": [0.0, 0.0, 0.0],
                    "rotation": FRONT_CAMERA_ROTATION,
                    "camera_intrinsic": [[100.0, 0.0, 50.0], [0.0, 100.0, 40.0], [0.0, 0.0, 1.0]],
                },
                {
                    "token": "cs-lidar",
                    "sensor_token": "sensor-lidar",
                    "translation": [0.0, 0.0, 0.0],
                    "rotation": [1.0, 0.0, 0.0, 0.0],
                    "camera_intrinsic": [],
                },
                {
                    "token": "cs-radar",
                    "sensor_token": "sensor-radar",
                    "translation": [3.4, 0.0, 0.5],
                    "rotation": [1.0, 0.0, 0.0, 0.0],
                    "camera_intrinsic": [],
                },
            ]),
        )
        .unwrap();

        write_json_pretty(
            &tables.join(EGO_POSE_TABLE),
            &json!([
                {"token": "ep-0", "timestamp": FIRST_TIMESTAMP, "translation": [0.0, 0.0, 0.0], "rotation": [1.0, 0.0, 0.0, 0.0]},
            ]),
        )
        .unwrap();

        let mut sample_data = vec![];
        let mut annotations = vec![];
        for (i, (sample, _, _)) in keyframes.iter().enumerate() {
            let n = i + 1;
            let ts = timestamp(i);
            let camera_file = format!("samples/CAM_FRONT/n015__CAM_FRONT__{ts}.jpg");
            let lidar_file = format!("samples/LIDAR_TOP/n015__LIDAR_TOP__{ts}.pcd.bin");
            let radar_file = format!("samples/RADAR_FRONT/n015__RADAR_FRONT__{ts}.pcd");
            write_image(&root.join(&camera_file));
            write_lidar_bin(&root.join(&lidar_file));

            sample_data.push(sample_data_row(&format!("sd-cam-{n}"), sample, "cs-cam", ts, true, &camera_file));
            sample_data.push(sample_data_row(&format!("sd-lidar-{n}"), sample, "cs-lidar", ts, true, &lidar_file));
            sample_data.push(sample_data_row(&format!("sd-radar-{n}"), sample, "cs-radar", ts, true, &radar_file));

            annotations.push(json!({
                "token": format!("ann-car-{n}"), "sample_token": sample, "instance_token": "inst-car",
                "translation": [10.0, 0.0, 0.0], "size": [2.0, 4.0, 1.5], "rotation": [1.0, 0.0, 0.0, 0.0],
            }));
            annotations.push(json!({
                "token": format!("ann-ped-{n}"), "sample_token": sample, "instance_token": "inst-ped",
                "translation": [-10.0, 0.0, 0.0], "size": [0.6, 0.8, 1.8], "rotation": [1.0, 0.0, 0.0, 0.0],
            }));
        }
        sample_data.push(sample_data_row(
            "sd-cam-sweep",
            "s1",
            "cs-cam",
            FIRST_TIMESTAMP + 50_000,
            false,
            "sweeps/CAM_FRONT/n015__CAM_FRONT__sweep.jpg",
        ));
        write_json_pretty(&tables.join(SAMPLE_DATA_TABLE), &sample_data).unwrap();
        write_json_pretty(&tables.join(SAMPLE_ANNOTATION_TABLE), &annotations).unwrap();

        write_json_pretty(
            &tables.join(INSTANCE_TABLE),
            &json!([
                {"token": "inst-car", "category_token": "cat-car"},
                {"token": "inst-ped", "category_token": "cat-ped"},
            ]),
        )
        .unwrap();
        write_json_pretty(
            &tables.join(CATEGORY_TABLE),
            &json!([
                {"token": "cat-car", "name": "vehicle.car"},
                {"token": "cat-ped", "name": "human.pedestrian.adult"},
            ]),
        )
        .unwrap();

        Self { root, version }
    }
}

fn timestamp(index: usize) -> i64 {
    FIRST_TIMESTAMP + 500_000 * index as i64
}

fn sample_data_row(
    token: &str,
    sample: &str,
    calibrated_sensor: &str,
    timestamp: i64,
    is_key_frame: bool,
    filename: &str,
) -> Value {
    let (width, height) = if calibrated_sensor == "cs-cam" {
        (IMAGE_WIDTH, IMAGE_HEIGHT)
    } else {
        (0, 0)
    };
    json!({
        "token": token,
        "sample_token": sample,
        "ego_pose_token": "ep-0",
        "calibrated_sensor_token": calibrated_sensor,
        "timestamp": timestamp,
        "fileformat": Path::new(filename).extension().and_then(|e| e.to_str()).unwrap_or(""),
        "is_key_frame": is_key_frame,
        "height": height,
        "width": width,
        "filename": filename,
        "prev": "",
        "next": "",
    })
}

fn write_image(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::new(IMAGE_WIDTH, IMAGE_HEIGHT)
        .save(path)
        .unwrap();
}

fn write_lidar_bin(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let points: [[f32; 5]; 3] = [
        [1.0, 2.0, 0.5, 12.0, 0.0],
        [-3.0, 0.25, -1.0, 40.0, 5.0],
        [8.0, -4.0, 0.0, 3.0, 31.0],
    ];
    let mut bytes = vec![];
    for value in points.iter().flatten() {
        bytes.write_f32::<LittleEndian>(*value).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

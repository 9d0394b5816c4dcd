mod common;

use std::{fs, path::Path};

use chrono::DateTime;
use common::{scratch_dir, write_image, FakeSource};
use nuscenes_prep::{
    config::{ExportConfig, IngestConfig},
    constants::{SensorChannel, Split, CAMERA_CHANNELS, DEFAULT_GROUP_SLICE, GROUP_FIELD},
    export::{self, export_view, CAMERA_PARAMETERS_FILE, EGO_POSE_FILE},
    ingest::{ingest, IngestContext},
    io::read_json,
    store::{Dataset, DatasetStore, ViewStage},
    structures::{CameraFields, Group, Sample, SensorFields},
};
use serde_json::{json, Value};

const TIMESTAMP: i64 = 1_600_000_000_000_000;

fn camera_sample(group: &Group, channel: SensorChannel, image: &Path, scene: &str) -> Sample {
    let mut sample = Sample::new(
        image,
        group.element(channel.as_ref()),
        SensorFields::Camera(CameraFields {
            intrinsics: vec![50., 0., 32., 0., 50., 24., 0., 0., 1.],
            camera_translation: [1.7, 0.0, 1.5],
            camera_rotation: [0.5, -0.5, 0.5, -0.5],
            ego_translation: [411.3, 1180.9, 0.0],
            ego_rotation: [0.57, -0.002, 0.013, -0.82],
            image_gt_cuboids: vec![],
        }),
    );
    sample.split = Some(Split::Train);
    sample.scene_name = Some(scene.to_string());
    sample.timestamp = DateTime::from_timestamp_micros(TIMESTAMP);
    sample
}

fn empty_dataset(store_root: &Path) -> Dataset {
    let mut dataset = DatasetStore::new(store_root)
        .create_dataset("nuscenes", false)
        .unwrap();
    dataset
        .add_group_field(GROUP_FIELD, DEFAULT_GROUP_SLICE)
        .unwrap();
    dataset
}

fn read_dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn single_front_camera_group() {
    let root = scratch_dir("export-single");
    let image = root.join("front.jpg");
    write_image(&image);

    let mut dataset = empty_dataset(&root.join("store"));
    let sample = camera_sample(&Group::new(), SensorChannel::CamFront, &image, "scene-0001");
    dataset.add_samples(&[sample]).unwrap();

    let export_root = root.join("export");
    let report = export_view(
        &dataset,
        &dataset.view().unwrap(),
        &export_root,
        &CAMERA_CHANNELS,
    )
    .unwrap();
    assert_eq!(report.num_groups, 1);
    assert_eq!(report.num_images, 1);

    let group_dir = export_root.join("scene-0001").join("1600000000000000");
    assert_eq!(read_dir_names(&group_dir), ["CAM_FRONT.jpg", "ego_pose.json"]);
    assert_eq!(
        fs::read(group_dir.join("CAM_FRONT.jpg")).unwrap(),
        fs::read(&image).unwrap()
    );

    let ego_pose: Value = read_json(&group_dir.join(EGO_POSE_FILE)).unwrap();
    assert_eq!(
        ego_pose,
        json!({
            "CAM_FRONT": {
                "ego_translation": [411.3, 1180.9, 0.0],
                "ego_rotation": [0.57, -0.002, 0.013, -0.82],
            }
        })
    );

    let parameters: Value = read_json(&export_root.join(CAMERA_PARAMETERS_FILE)).unwrap();
    let parameters = parameters.as_object().unwrap();
    assert_eq!(parameters.keys().collect::<Vec<_>>(), ["CAM_FRONT"]);
    assert_eq!(
        parameters["CAM_FRONT"]["camera_translation_relative_to_ego"],
        json!([1.7, 0.0, 1.5])
    );

    let text = fs::read_to_string(group_dir.join(EGO_POSE_FILE)).unwrap();
    assert!(text.starts_with("{\n  \"CAM_FRONT\": {\n    \"ego_translation\""));
}

#[test]
fn absent_camera_fields_are_null() {
    let root = scratch_dir("export-null");
    let image = root.join("back.jpg");
    write_image(&image);

    let mut dataset = empty_dataset(&root.join("store"));
    let mut bare = Sample::new(
        &image,
        Group::new().element(SensorChannel::CamBack.as_ref()),
        SensorFields::Other,
    );
    bare.scene_name = Some("scene-0001".to_string());
    bare.timestamp = DateTime::from_timestamp_micros(TIMESTAMP);
    dataset.add_samples(&[bare]).unwrap();

    let export_root = root.join("export");
    export_view(
        &dataset,
        &dataset.view().unwrap(),
        &export_root,
        &CAMERA_CHANNELS,
    )
    .unwrap();

    let parameters: Value = read_json(&export_root.join(CAMERA_PARAMETERS_FILE)).unwrap();
    assert_eq!(
        parameters,
        json!({
            "CAM_BACK": {
                "intrinsics": null,
                "camera_translation_relative_to_ego": null,
                "camera_rotation_relative_to_ego": null,
            }
        })
    );
    let ego_pose: Value = read_json(
        &export_root
            .join("scene-0001/1600000000000000")
            .join(EGO_POSE_FILE),
    )
    .unwrap();
    assert_eq!(
        ego_pose,
        json!({"CAM_BACK": {"ego_translation": null, "ego_rotation": null}})
    );
}

#[test]
fn groups_without_cameras_are_skipped() {
    let root = scratch_dir("export-skip");
    let image = root.join("front.jpg");
    write_image(&image);

    let mut dataset = empty_dataset(&root.join("store"));
    let mut lidar_only = Sample::new(
        &root.join("sweep.pcd"),
        Group::new().element(SensorChannel::LidarTop.as_ref()),
        SensorFields::Other,
    );
    lidar_only.scene_name = Some("scene-0002".to_string());
    dataset
        .add_samples(&[
            lidar_only,
            camera_sample(&Group::new(), SensorChannel::CamFront, &image, "scene-0001"),
        ])
        .unwrap();

    let export_root = root.join("export");
    let report = export_view(
        &dataset,
        &dataset.view().unwrap(),
        &export_root,
        &CAMERA_CHANNELS,
    )
    .unwrap();
    assert_eq!(report.num_scenes, 2);
    assert_eq!(report.num_groups, 1);
    assert_eq!(report.skipped_groups, 1);
    assert!(read_dir_names(&export_root.join("scene-0002")).is_empty());
}

#[test]
fn camera_parameters_come_from_whole_dataset() {
    let root = scratch_dir("export-parameters");
    let image = root.join("left.jpg");
    write_image(&image);

    let mut dataset = empty_dataset(&root.join("store"));
    dataset
        .add_samples(&[
            camera_sample(&Group::new(), SensorChannel::CamFrontLeft, &image, "scene-0001"),
            camera_sample(&Group::new(), SensorChannel::CamFront, &image, "scene-0002"),
        ])
        .unwrap();
    let view = dataset.view().unwrap().apply(&ViewStage::Match {
        field: "scene_name".into(),
        value: json!("scene-0002"),
    });

    let export_root = root.join("export");
    export_view(&dataset, &view, &export_root, &CAMERA_CHANNELS).unwrap();

    let parameters: Value = read_json(&export_root.join(CAMERA_PARAMETERS_FILE)).unwrap();
    assert_eq!(
        parameters.as_object().unwrap().keys().collect::<Vec<_>>(),
        ["CAM_FRONT_LEFT", "CAM_FRONT"]
    );
    assert_eq!(read_dir_names(&export_root), [CAMERA_PARAMETERS_FILE, "scene-0002"]);
}

#[test]
fn ingest_then_export_saved_view() {
    let mut source = FakeSource::new("export-end-to-end", &["scene-0001", "scene-0002"], &[]);
    source
        .add_scene(
            "scene-0001",
            4,
            &[SensorChannel::CamFront, SensorChannel::LidarTop],
            6,
        )
        .add_scene(
            "scene-0002",
            4,
            &[SensorChannel::CamFront, SensorChannel::LidarTop],
            1,
        );
    let store_root = scratch_dir("export-end-to-end-store");
    let ingest_config = IngestConfig {
        store_root: store_root.clone(),
        ..IngestConfig::default()
    };
    ingest(&IngestContext::new(&source, &ingest_config)).unwrap();

    let export_config = ExportConfig {
        store_root,
        export_root: scratch_dir("export-end-to-end-out"),
        ..ExportConfig::default()
    };
    let report = export::run(&export_config).unwrap();

    // The five sweeps with the fewest objects: all of scene-0002, one of scene-0001.
    assert_eq!(report.num_groups, 5);
    assert_eq!(report.num_images, 5);
    assert_eq!(read_dir_names(&export_config.export_root.join("scene-0002")).len(), 4);
    assert_eq!(read_dir_names(&export_config.export_root.join("scene-0001")).len(), 1);
}

//! # builder
//!
//! One dataset record per sensor reading, with modality-specific fields.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::{
    constants::SensorModality,
    geometry::camera::pinhole_camera::{BoxVisibility, PinholeCamera},
    io::{read_image_size, read_lidar_bin, write_pcd, xyz_columns},
    path::{is_pcd, strip_extension},
    source::SensorSource,
    structures::{
        CameraFields, Detection3D, Group, LidarFields, Polyline, Sample, SensorFields,
    },
};

/// Builds records from a sensor source.
pub struct RecordBuilder<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: SensorSource + ?Sized> RecordBuilder<'a, S> {
    /// Builder reading from `source`.
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Build the record of reading `sample_data_token`, occupying the
    /// `channel` element of `group`.
    ///
    /// LiDAR sweeps not yet in PCD format are converted first and the record
    /// points at the converted file.
    pub fn build(
        &self,
        group: &Group,
        filepath: &Path,
        channel: &str,
        modality: SensorModality,
        sample_data_token: &str,
    ) -> Result<Sample> {
        match modality {
            SensorModality::Camera => self.camera_sample(group, filepath, channel, sample_data_token),
            SensorModality::Lidar => {
                let filepath = ensure_point_cloud(filepath)?;
                self.lidar_sample(group, &filepath, channel, sample_data_token)
            }
            _ => Ok(Sample::new(
                filepath,
                group.element(channel),
                SensorFields::Other,
            )),
        }
    }

    fn camera_sample(
        &self,
        group: &Group,
        filepath: &Path,
        channel: &str,
        token: &str,
    ) -> Result<Sample> {
        let calibration = self.source.calibration(token)?;
        let ego_pose = self.source.ego_pose(token)?;
        let boxes = self.source.sensor_boxes(token, BoxVisibility::Any)?;

        let (width_px, height_px) = read_image_size(filepath)?;
        let camera = PinholeCamera::from_rows(&calibration.camera_intrinsic, width_px, height_px)?;

        let image_gt_cuboids = boxes
            .iter()
            .map(|cuboid| Polyline::from_cuboid(camera.normalized_vertices(cuboid), &cuboid.label))
            .collect();

        let fields = CameraFields {
            intrinsics: camera.flat_intrinsics(),
            camera_translation: calibration.sensor_pose.translation,
            camera_rotation: calibration.sensor_pose.rotation,
            ego_translation: ego_pose.translation,
            ego_rotation: ego_pose.rotation,
            image_gt_cuboids,
        };
        Ok(Sample::new(
            filepath,
            group.element(channel),
            SensorFields::Camera(fields),
        ))
    }

    fn lidar_sample(
        &self,
        group: &Group,
        filepath: &Path,
        channel: &str,
        token: &str,
    ) -> Result<Sample> {
        let calibration = self.source.calibration(token)?;
        let ego_pose = self.source.ego_pose(token)?;
        let boxes = self.source.sensor_boxes(token, BoxVisibility::None)?;

        let fields = LidarFields {
            lidar_translation: calibration.sensor_pose.translation,
            lidar_rotation: calibration.sensor_pose.rotation,
            ego_translation: ego_pose.translation,
            ego_rotation: ego_pose.rotation,
            lidar_gt_cuboids: boxes.iter().map(Detection3D::from_cuboid).collect(),
        };
        Ok(Sample::new(
            filepath,
            group.element(channel),
            SensorFields::Lidar(fields),
        ))
    }
}

/// Path of the PCD version of a LiDAR sweep, converting it when needed.
///
/// A `.pcd` file is returned as is. Anything else is read as a raw nuScenes
/// sweep and its x/y/z columns are written to the same path minus its final
/// extension (`foo.pcd.bin` -> `foo.pcd`).
pub fn ensure_point_cloud(path: &Path) -> Result<PathBuf> {
    if is_pcd(path) {
        return Ok(path.to_path_buf());
    }
    let destination = strip_extension(path);
    let points = read_lidar_bin(path)?;
    write_pcd(&destination, &xyz_columns(&points.view()).view())?;
    debug!("Converted {path:?} -> {destination:?}.");
    Ok(destination)
}

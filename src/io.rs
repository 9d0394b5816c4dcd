//! # io
//!
//! Reading and writing operations.

use anyhow::{ensure, Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use ndarray::{s, Array2, ArrayView2};
use pcd_rs::{DataKind, PcdDeserialize, PcdSerialize, WriterInit};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Channels per point in a raw nuScenes LiDAR sweep: x, y, z, intensity, ring index.
pub const NUM_LIDAR_BIN_CHANNELS: usize = 5;

/// Point layout written to `.pcd` files.
#[derive(Clone, Copy, Debug, PartialEq, PcdSerialize, PcdDeserialize)]
pub struct PcdPoint {
    /// x (meters).
    pub x: f32,
    /// y (meters).
    pub y: f32,
    /// z (meters).
    pub z: f32,
}

/// Read a JSON file into any deserializable type.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("File not found: {path:?}."))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("This JSON file is malformed: {path:?}."))
}

/// Read a JSON table (array of rows).
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    read_json(path)
}

/// Write a value as JSON with a 2-space indent.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create {path:?}."))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Read a raw nuScenes LiDAR sweep (`.pcd.bin`) as an (N,5) array.
pub fn read_lidar_bin(path: &Path) -> Result<Array2<f32>> {
    let bytes = fs::read(path).with_context(|| format!("File not found: {path:?}."))?;
    let point_size = NUM_LIDAR_BIN_CHANNELS * std::mem::size_of::<f32>();
    ensure!(
        bytes.len() % point_size == 0,
        "LiDAR sweep {path:?} has {} bytes, not a multiple of {point_size}.",
        bytes.len()
    );
    let mut values = vec![0f32; bytes.len() / std::mem::size_of::<f32>()];
    LittleEndian::read_f32_into(&bytes, &mut values);
    let num_points = values.len() / NUM_LIDAR_BIN_CHANNELS;
    Ok(Array2::from_shape_vec(
        (num_points, NUM_LIDAR_BIN_CHANNELS),
        values,
    )?)
}

/// Keep only the x/y/z columns of an (N,C) point array.
pub fn xyz_columns(points: &ArrayView2<f32>) -> Array2<f32> {
    points.slice(s![.., ..3]).as_standard_layout().to_owned()
}

/// Write (N,3) points as a binary PCD file.
pub fn write_pcd(path: &Path, xyz: &ArrayView2<f32>) -> Result<()> {
    ensure!(xyz.ncols() == 3, "Expected (N,3) points, got {:?}.", xyz.shape());
    let mut writer = WriterInit {
        width: xyz.nrows() as u64,
        height: 1,
        viewpoint: Default::default(),
        data_kind: DataKind::Binary,
        schema: None,
    }
    .create(path)?;
    for row in xyz.rows() {
        writer.push(&PcdPoint {
            x: row[0],
            y: row[1],
            z: row[2],
        })?;
    }
    writer.finish()?;
    Ok(())
}

/// Read a PCD file written by [`write_pcd`] as an (N,3) array.
pub fn read_pcd(path: &Path) -> Result<Array2<f32>> {
    let reader = pcd_rs::Reader::<PcdPoint, _>::open(path)?;
    let points = reader.collect::<Result<Vec<PcdPoint>, _>>()?;
    let values = points.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
    Ok(Array2::from_shape_vec((points.len(), 3), values)?)
}

/// Pixel width and height of an image, read from its header.
pub fn read_image_size(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path).with_context(|| format!("Cannot read image {path:?}."))
}

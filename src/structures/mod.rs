//! # structures
//!
//! Records stored in the grouped dataset.

/// Group handles and elements.
pub mod group;
/// Label types: image-plane cuboid polylines and 3D detections.
pub mod labels;
/// One sensor record of a group.
pub mod sample;

pub use group::{Group, GroupElement};
pub use labels::{Detection3D, Polyline};
pub use sample::{
    CameraFields, FieldKind, LidarFields, Sample, SensorFields, IMAGE_CUBOIDS_FIELD,
    LIDAR_CUBOIDS_FIELD,
};

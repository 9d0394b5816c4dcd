//! # nuscenes_prep
//!
//! nuScenes preparation library.
//!
//! Ingests a nuScenes release into a grouped multimodal dataset store (one
//! group per synchronized key frame) and exports filtered frames back onto a
//! plain filesystem tree.

#![warn(missing_docs)]

#[macro_use]
extern crate log;

pub mod builder;
pub mod config;
pub mod constants;
pub mod export;
pub mod geometry;
pub mod ingest;
pub mod io;
pub mod path;
pub mod source;
pub mod store;
pub mod structures;

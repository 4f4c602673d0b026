//! # burnmap core
//!
//! Core types and I/O shared by the burnmap crates.
//!
//! This crate provides:
//! - `Raster<T>`: single-band 2D grid with an optional no-data value
//! - `Scene<T>`: multi-band reflectance stack indexed `[row, col, band]`
//! - Sentinel-2 band positions and Scene Classification Layer codes
//! - TIFF reading and writing for rasters, scenes and RGBA previews

pub mod error;
pub mod io;
pub mod raster;
pub mod sentinel2;

pub use error::{Error, Result};
pub use raster::{Raster, RasterElement, Scene};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{Raster, RasterElement, Scene};
    pub use crate::sentinel2::{SceneClass, BLUE, GREEN, NIR, RED, SWIR};
}

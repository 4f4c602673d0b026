//! # burnmap colormap
//!
//! Color mapping and raster-to-RGBA rendering for burnmap products.
//!
//! Continuous rasters (NDVI, VCI, dNBR) go through a [`ColorScheme`] with
//! [`raster_to_rgba`]; classified rasters and SCL bands use a discrete
//! [`Palette`] with [`classes_to_rgba`] and [`codes_to_rgba`]; true-colour
//! composites are packed with [`composite_to_rgba`].
//!
//! ## Usage
//!
//! ```ignore
//! use burnmap_colormap::{classes_to_rgba, Palette};
//!
//! let classes = classify_dnbr(&dnbr)?;
//! let rgba = classes_to_rgba(&classes, &Palette::DNBR_CLASSES);
//! ```

mod render;
mod scheme;

pub use render::{
    auto_params, classes_to_rgba, codes_to_rgba, composite_to_rgba, raster_to_rgba,
    ColormapParams,
};
pub use scheme::{evaluate, ColorScheme, ColorStop, Palette, Rgb};

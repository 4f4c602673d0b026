//! Raster data structures

mod element;
mod grid;
mod scene;

pub use element::RasterElement;
pub use grid::{Raster, RasterStatistics};
pub use scene::Scene;

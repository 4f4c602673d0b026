//! Reading and writing rasters, scenes and RGBA previews as TIFF

mod native;

pub use native::{
    read_raster, read_raster_from_buffer, read_scene, read_scene_from_buffer, write_raster,
    write_raster_to_buffer, write_rgba,
};

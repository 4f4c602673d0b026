//! Multi-band scene (reflectance stack)

use crate::error::{Error, Result};
use crate::raster::{Raster, RasterElement};
use ndarray::{Array3, ArrayView2, Axis};

/// One satellite acquisition: a 3D array indexed `[row, col, band]`.
///
/// Bands follow the Sentinel-2 ordering used throughout the crate
/// (see [`crate::sentinel2`]). A scene is read-only once built; index
/// computations borrow it and produce new rasters.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene<T: RasterElement> {
    data: Array3<T>,
}

impl<T: RasterElement> Scene<T> {
    /// Wrap an existing `[row, col, band]` array
    pub fn from_array(data: Array3<T>) -> Self {
        Self { data }
    }

    /// Build a scene from pixel-interleaved data (`band` varies fastest)
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize, bands: usize) -> Result<Self> {
        if data.len() != rows * cols * bands {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Ok(Self {
            data: Array3::from_shape_vec((rows, cols, bands), data)?,
        })
    }

    /// Stack single-band rasters into a scene; band `i` is `bands[i]`.
    pub fn from_bands(bands: &[Raster<T>]) -> Result<Self> {
        let first = bands.first().ok_or_else(|| Error::InvalidParameter {
            name: "bands",
            value: "0".to_string(),
            reason: "a scene needs at least one band".to_string(),
        })?;
        let (rows, cols) = first.shape();
        for band in &bands[1..] {
            first.ensure_same_shape(band)?;
        }

        let mut data = Array3::zeros((rows, cols, bands.len()));
        for (i, band) in bands.iter().enumerate() {
            data.index_axis_mut(Axis(2), i).assign(band.data());
        }
        Ok(Self { data })
    }

    /// Spatial dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        let (rows, cols, _) = self.data.dim();
        (rows, cols)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    /// Number of bands
    pub fn band_count(&self) -> usize {
        self.data.dim().2
    }

    /// Fail with [`Error::MissingBand`] unless every listed band exists
    pub fn require_bands(&self, bands: &[usize]) -> Result<()> {
        let count = self.band_count();
        match bands.iter().find(|&&b| b >= count) {
            Some(&band) => Err(Error::MissingBand { band, bands: count }),
            None => Ok(()),
        }
    }

    /// Fail with [`Error::SizeMismatch`] unless `other` covers the same grid
    pub fn ensure_same_shape(&self, other: &Scene<T>) -> Result<()> {
        let (er, ec) = self.shape();
        let (ar, ac) = other.shape();
        if (er, ec) != (ar, ac) {
            return Err(Error::SizeMismatch { er, ec, ar, ac });
        }
        Ok(())
    }

    /// Fail with [`Error::SizeMismatch`] unless `raster` covers the scene's grid.
    ///
    /// The scene's shape is reported as the expected one.
    pub fn ensure_raster_shape<U: RasterElement>(&self, raster: &Raster<U>) -> Result<()> {
        let (er, ec) = self.shape();
        let (ar, ac) = raster.shape();
        if (er, ec) != (ar, ac) {
            return Err(Error::SizeMismatch { er, ec, ar, ac });
        }
        Ok(())
    }

    /// Borrow one band as a 2D view
    pub fn band_view(&self, band: usize) -> Result<ArrayView2<'_, T>> {
        self.require_bands(&[band])?;
        Ok(self.data.index_axis(Axis(2), band))
    }

    /// Copy one band out into its own raster
    pub fn band(&self, band: usize) -> Result<Raster<T>> {
        Ok(Raster::from_array(
            self.band_view(band)?.as_standard_layout().into_owned(),
        ))
    }

    /// Value at (row, col, band) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure the row, column and band are in range
    pub unsafe fn get_unchecked(&self, row: usize, col: usize, band: usize) -> T {
        unsafe { *self.data.uget((row, col, band)) }
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array3<T> {
        &self.data
    }
}

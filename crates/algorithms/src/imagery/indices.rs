//! Vegetation and burn indices
//!
//! Normalized-difference indices computed from a Sentinel-2 [`Scene`]:
//! NDVI (with SCL masking), NBR, and the pre/post-fire difference dNBR.
//! Undefined pixels are NaN; no output is clipped.

use crate::maybe_rayon::*;
use burnmap_core::raster::{Raster, Scene};
use burnmap_core::sentinel2::{NIR, RED, SWIR};
use burnmap_core::Result;

use super::quality::MASKED;

// ---------------------------------------------------------------------------
// Pixel predicates
// ---------------------------------------------------------------------------

/// Whether an exclusion-mask value marks the pixel as excluded.
pub fn is_masked(mask_value: u8) -> bool {
    mask_value == MASKED
}

/// Whether both bands read exactly zero, the sensor's no-data sentinel.
pub fn is_zero_sentinel(a: f64, b: f64) -> bool {
    a == 0.0 && b == 0.0
}

/// `(a - b) / (a + b)` for one pixel, NaN when the denominator is zero.
pub fn normalized_difference_value(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum == 0.0 {
        return f64::NAN;
    }
    (a - b) / sum
}

// ---------------------------------------------------------------------------
// Generic normalized difference
// ---------------------------------------------------------------------------

/// Normalized difference of two bands of a scene:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// A pixel is NaN when it is excluded by `mask`, when both bands are zero
/// (see [`is_zero_sentinel`]), when either band is NaN, or when the
/// denominator is zero.
///
/// # Arguments
/// * `scene` - Reflectance stack
/// * `band_a` - Band index of the positive term
/// * `band_b` - Band index of the negative term
/// * `mask` - Optional exclusion mask with the scene's row/column shape
pub fn normalized_difference(
    scene: &Scene<f64>,
    band_a: usize,
    band_b: usize,
    mask: Option<&Raster<u8>>,
) -> Result<Raster<f64>> {
    scene.require_bands(&[band_a, band_b])?;
    if let Some(mask) = mask {
        scene.ensure_raster_shape(mask)?;
    }

    let (rows, cols) = scene.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                if let Some(mask) = mask {
                    if is_masked(unsafe { mask.get_unchecked(row, col) }) {
                        continue;
                    }
                }

                let a = unsafe { scene.get_unchecked(row, col, band_a) };
                let b = unsafe { scene.get_unchecked(row, col, band_b) };
                if is_zero_sentinel(a, b) {
                    continue;
                }

                row_data[col] = normalized_difference_value(a, b);
            }
            row_data
        })
        .collect();

    build_output(rows, cols, data)
}

// ---------------------------------------------------------------------------
// NDVI
// ---------------------------------------------------------------------------

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)` using bands 7 and 3.
///
/// Pixels excluded by `mask` or with both bands at zero are NaN.
/// Values range from -1 to 1:
/// - Dense vegetation: 0.6 to 0.9
/// - Sparse vegetation: 0.2 to 0.5
/// - Bare soil: 0.1 to 0.2
/// - Water/clouds: -1.0 to 0.0
///
/// # Errors
/// [`burnmap_core::Error::MissingBand`] if the scene lacks band 7,
/// [`burnmap_core::Error::SizeMismatch`] if the mask does not match.
pub fn ndvi(scene: &Scene<f64>, mask: &Raster<u8>) -> Result<Raster<f64>> {
    normalized_difference(scene, NIR, RED, Some(mask))
}

// ---------------------------------------------------------------------------
// NBR / dNBR
// ---------------------------------------------------------------------------

/// Normalized Burn Ratio
///
/// `NBR = (NIR - SWIR) / (NIR + SWIR)` using bands 7 and 11, unmasked.
/// Healthy vegetation is high, freshly burned ground is low.
pub fn nbr(scene: &Scene<f64>) -> Result<Raster<f64>> {
    normalized_difference(scene, NIR, SWIR, None)
}

/// Differenced Normalized Burn Ratio
///
/// `dNBR = NBR(pre) - NBR(post)`, nominally in [-2, 2]; positive values
/// indicate burning. No cloud mask is applied, so cloudy pixels in either
/// scene produce meaningless but finite values. Use [`dnbr_masked`] to
/// exclude them.
///
/// # Errors
/// [`burnmap_core::Error::SizeMismatch`] if the scenes differ in shape.
pub fn dnbr(pre: &Scene<f64>, post: &Scene<f64>) -> Result<Raster<f64>> {
    pre.ensure_same_shape(post)?;
    difference(&nbr(pre)?, &nbr(post)?)
}

/// dNBR with pre- and post-fire exclusion masks applied.
///
/// A pixel excluded in either mask is NaN; otherwise identical to [`dnbr`].
pub fn dnbr_masked(
    pre: &Scene<f64>,
    post: &Scene<f64>,
    pre_mask: &Raster<u8>,
    post_mask: &Raster<u8>,
) -> Result<Raster<f64>> {
    pre.ensure_same_shape(post)?;
    let pre_nbr = normalized_difference(pre, NIR, SWIR, Some(pre_mask))?;
    let post_nbr = normalized_difference(post, NIR, SWIR, Some(post_mask))?;
    difference(&pre_nbr, &post_nbr)
}

fn difference(a: &Raster<f64>, b: &Raster<f64>) -> Result<Raster<f64>> {
    a.ensure_same_shape(b)?;
    let mut output = Raster::from_array(a.data() - b.data());
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(super) fn build_output(rows: usize, cols: usize, data: Vec<f64>) -> Result<Raster<f64>> {
    let mut output = Raster::from_vec(data, rows, cols)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

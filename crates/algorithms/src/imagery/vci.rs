//! Vegetation Condition Index
//!
//! `VCI = (NDVI - NDVI_min) / (NDVI_max - NDVI_min)`, where min and max
//! are taken per pixel over an NDVI time series that includes the target.

use crate::maybe_rayon::*;
use burnmap_core::raster::Raster;
use burnmap_core::Result;

use super::indices::build_output;

/// Value written where the per-pixel statistics are degenerate.
///
/// Used when fewer than two valid observations exist, when the target
/// itself is NaN, or when every valid observation is identical. Note that
/// it is indistinguishable from "maximum greenness" once classified.
pub const VCI_FALLBACK: f64 = 1.0;

/// VCI for one pixel given its target value and the population values.
///
/// `population` must already contain the target value.
pub fn vci_value(target: f64, population: impl IntoIterator<Item = f64>) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut valid = 0usize;

    for v in population.into_iter().filter(|v| !v.is_nan()) {
        min = min.min(v);
        max = max.max(v);
        valid += 1;
    }

    if valid < 2 || target.is_nan() || max == min {
        return VCI_FALLBACK;
    }
    (target - min) / (max - min)
}

/// Vegetation Condition Index of `target` relative to its history.
///
/// The comparison population is `history` plus `target` itself, gathered
/// into a local collection; `history` is only borrowed. For each pixel the
/// NaN entries of the population are discarded before taking min and max,
/// and [`VCI_FALLBACK`] is written when those statistics are degenerate.
/// The result is never NaN.
///
/// # Arguments
/// * `target` - NDVI raster to evaluate
/// * `history` - Other NDVI rasters of the same location (any order)
///
/// # Errors
/// [`burnmap_core::Error::SizeMismatch`] if any history raster differs in
/// shape from `target`.
pub fn vci(target: &Raster<f64>, history: &[Raster<f64>]) -> Result<Raster<f64>> {
    for raster in history {
        target.ensure_same_shape(raster)?;
    }

    let population: Vec<&Raster<f64>> = history.iter().chain(std::iter::once(target)).collect();
    let (rows, cols) = target.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = Vec::with_capacity(cols);
            for col in 0..cols {
                let t = unsafe { target.get_unchecked(row, col) };
                let values = population
                    .iter()
                    .map(|r| unsafe { r.get_unchecked(row, col) });
                row_data.push(vci_value(t, values));
            }
            row_data
        })
        .collect();

    let mut output = build_output(rows, cols, data)?;
    output.set_nodata(None);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnmap_core::Error;

    fn grid(values: &[f64], rows: usize, cols: usize) -> Raster<f64> {
        Raster::from_vec(values.to_vec(), rows, cols).unwrap()
    }

    #[test]
    fn test_vci_without_history_is_fallback() {
        let target = grid(&[0.1, -0.4, 0.9, f64::NAN], 2, 2);
        let result = vci(&target, &[]).unwrap();
        assert!(result.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_vci_basic() {
        let target = grid(&[0.5], 1, 1);
        let history = vec![grid(&[0.2], 1, 1), grid(&[0.8], 1, 1)];

        let result = vci(&target, &history).unwrap();
        assert!((result.get(0, 0).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_vci_target_extends_range() {
        // Target is the new minimum: VCI 0
        let target = grid(&[0.1], 1, 1);
        let history = vec![grid(&[0.3], 1, 1), grid(&[0.7], 1, 1)];
        assert_eq!(vci(&target, &history).unwrap().get(0, 0).unwrap(), 0.0);

        // Target is the new maximum: VCI 1
        let target = grid(&[0.9], 1, 1);
        assert_eq!(vci(&target, &history).unwrap().get(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_vci_single_valid_value() {
        // Only one non-NaN value in the whole population
        let target = grid(&[0.4], 1, 1);
        let history = vec![grid(&[f64::NAN], 1, 1), grid(&[f64::NAN], 1, 1)];
        assert_eq!(vci(&target, &history).unwrap().get(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_vci_nan_target() {
        let target = grid(&[f64::NAN], 1, 1);
        let history = vec![grid(&[0.2], 1, 1), grid(&[0.8], 1, 1)];
        assert_eq!(vci(&target, &history).unwrap().get(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_vci_constant_population() {
        let target = grid(&[0.3], 1, 1);
        let history = vec![grid(&[0.3], 1, 1), grid(&[0.3], 1, 1)];
        assert_eq!(vci(&target, &history).unwrap().get(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_vci_ignores_nan_history() {
        let target = grid(&[0.4], 1, 1);
        let history = vec![grid(&[0.0], 1, 1), grid(&[f64::NAN], 1, 1), grid(&[0.8], 1, 1)];
        assert!((vci(&target, &history).unwrap().get(0, 0).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_vci_order_independent() {
        let target = grid(&[0.35, 0.6], 1, 2);
        let a = grid(&[0.1, 0.9], 1, 2);
        let b = grid(&[0.7, 0.2], 1, 2);

        let forward = vci(&target, &[a.clone(), b.clone()]).unwrap();
        let reverse = vci(&target, &[b, a]).unwrap();
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_vci_affine_invariance() {
        let target = grid(&[0.35, 0.6, 0.2], 1, 3);
        let history = vec![grid(&[0.1, 0.9, 0.2], 1, 3), grid(&[0.7, 0.2, 0.2], 1, 3)];

        let transform = |r: &Raster<f64>| Raster::from_array(r.data().mapv(|v| 2.5 * v - 0.3));
        let t2 = transform(&target);
        let h2: Vec<Raster<f64>> = history.iter().map(transform).collect();

        let base = vci(&target, &history).unwrap();
        let scaled = vci(&t2, &h2).unwrap();
        for (x, y) in base.data().iter().zip(scaled.data().iter()) {
            assert!((x - y).abs() < 1e-9, "{} vs {}", x, y);
        }
        // Third pixel is degenerate (all 0.2) in both
        assert_eq!(scaled.get(0, 2).unwrap(), 1.0);
    }

    #[test]
    fn test_vci_does_not_mutate_history() {
        let target = grid(&[0.5], 1, 1);
        let history = vec![grid(&[0.2], 1, 1)];
        let before = history.clone();

        vci(&target, &history).unwrap();
        vci(&target, &history).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history, before);
    }

    #[test]
    fn test_vci_shape_mismatch() {
        let target = grid(&[0.5, 0.5], 1, 2);
        let history = vec![grid(&[0.2, 0.2], 2, 1)];
        assert!(matches!(
            vci(&target, &history),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_vci_value_pixel() {
        assert_eq!(vci_value(0.5, [0.5]), 1.0);
        assert!((vci_value(0.25, [0.0, 0.25, 1.0]) - 0.25).abs() < 1e-12);
    }
}

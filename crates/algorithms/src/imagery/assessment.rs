//! Wildfire assessment over a series of scenes
//!
//! Runs the full chain for one fire event: exclusion masks and NDVI for
//! every pre-fire observation, drought (VCI) of the latest pre-fire
//! observation against the others, burn severity (dNBR) between the latest
//! pre-fire and the post-fire scene, and classification of each index.
//!
//! A pre-fire observation that cannot be used (mismatched shapes, missing
//! bands) is reported in [`Assessment::skipped`] and left out of the VCI
//! history; the rest of the batch still runs.

use burnmap_core::raster::{Raster, Scene};
use burnmap_core::{Error, Result};
use serde::Serialize;

use super::indices::{dnbr, dnbr_masked, ndvi};
use super::quality::{build_exclusion_mask, masked_fraction};
use super::severity::{classify_dnbr, classify_ndvi, classify_vci, ClassRaster, ClassSummary};
use super::vci::vci;

/// One acquisition: reflectances plus its Scene Classification Layer.
#[derive(Debug, Clone)]
pub struct Observation {
    pub scene: Scene<f64>,
    pub scl: Raster<u8>,
}

impl Observation {
    pub fn new(scene: Scene<f64>, scl: Raster<u8>) -> Self {
        Self { scene, scl }
    }

    /// Exclusion mask and masked NDVI of this observation.
    pub fn masked_ndvi(&self) -> Result<(Raster<u8>, Raster<f64>)> {
        let mask = build_exclusion_mask(&self.scl);
        let index = ndvi(&self.scene, &mask)?;
        Ok((mask, index))
    }
}

/// Inputs of [`assess`].
#[derive(Debug, Clone)]
pub struct AssessmentInput {
    /// Pre-fire observations, any order
    pub pre_fire: Vec<Observation>,
    /// Position in `pre_fire` of the observation closest to the fire
    pub latest_pre_fire: usize,
    /// Observation after the fire
    pub post_fire: Observation,
    /// Apply SCL masks to dNBR (off by default, matching plain dNBR)
    pub mask_burn_ratio: bool,
}

/// A pre-fire observation left out of the assessment.
#[derive(Debug)]
pub struct SceneFailure {
    pub index: usize,
    pub error: Error,
}

/// Results of [`assess`].
#[derive(Debug)]
pub struct Assessment {
    pub ndvi: Raster<f64>,
    pub ndvi_classes: ClassRaster,
    pub vci: Raster<f64>,
    pub vci_classes: ClassRaster,
    pub dnbr: Raster<f64>,
    pub dnbr_classes: ClassRaster,
    /// Number of pre-fire NDVI rasters used as VCI history
    pub history_used: usize,
    /// Masked share of each pre-fire observation, `None` when skipped
    pub pre_fire_masked: Vec<Option<f64>>,
    /// Masked share of the post-fire observation
    pub post_fire_masked: f64,
    pub skipped: Vec<SceneFailure>,
}

/// Serializable digest of an [`Assessment`].
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub rows: usize,
    pub cols: usize,
    pub history_used: usize,
    pub pre_fire_masked: Vec<Option<f64>>,
    pub post_fire_masked: f64,
    pub skipped: Vec<SkippedScene>,
    pub ndvi: ClassSummary,
    pub vci: ClassSummary,
    pub dnbr: ClassSummary,
}

/// A skipped observation, with its error rendered as text.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedScene {
    pub index: usize,
    pub reason: String,
}

impl Assessment {
    /// Class summaries and bookkeeping, ready for JSON output.
    pub fn report(&self) -> AssessmentReport {
        let (rows, cols) = self.ndvi.shape();
        AssessmentReport {
            rows,
            cols,
            history_used: self.history_used,
            pre_fire_masked: self.pre_fire_masked.clone(),
            post_fire_masked: self.post_fire_masked,
            skipped: self
                .skipped
                .iter()
                .map(|f| SkippedScene {
                    index: f.index,
                    reason: f.error.to_string(),
                })
                .collect(),
            ndvi: self.ndvi_classes.summary(),
            vci: self.vci_classes.summary(),
            dnbr: self.dnbr_classes.summary(),
        }
    }
}

/// Run the full wildfire assessment.
///
/// # Errors
/// Fails when `latest_pre_fire` is out of range, when the latest pre-fire
/// or the post-fire observation cannot be processed, or when the two do
/// not cover the same grid. Problems with other pre-fire observations are
/// collected in [`Assessment::skipped`] instead.
pub fn assess(input: &AssessmentInput) -> Result<Assessment> {
    let latest = input
        .pre_fire
        .get(input.latest_pre_fire)
        .ok_or_else(|| Error::InvalidParameter {
            name: "latest_pre_fire",
            value: input.latest_pre_fire.to_string(),
            reason: format!("only {} pre-fire observation(s)", input.pre_fire.len()),
        })?;

    let (latest_mask, latest_ndvi) = latest.masked_ndvi()?;

    let mut history = Vec::with_capacity(input.pre_fire.len().saturating_sub(1));
    let mut pre_fire_masked = vec![None; input.pre_fire.len()];
    let mut skipped = Vec::new();
    pre_fire_masked[input.latest_pre_fire] = Some(masked_fraction(&latest_mask));

    for (index, observation) in input.pre_fire.iter().enumerate() {
        if index == input.latest_pre_fire {
            continue;
        }
        let result = observation.masked_ndvi().and_then(|(mask, index_raster)| {
            latest_ndvi.ensure_same_shape(&index_raster)?;
            Ok((mask, index_raster))
        });
        match result {
            Ok((mask, index_raster)) => {
                pre_fire_masked[index] = Some(masked_fraction(&mask));
                history.push(index_raster);
            }
            Err(error) => skipped.push(SceneFailure { index, error }),
        }
    }

    let vci_raster = vci(&latest_ndvi, &history)?;

    let post = &input.post_fire;
    let post_mask = build_exclusion_mask(&post.scl);
    latest_ndvi.ensure_same_shape(&post_mask)?;
    let dnbr_raster = if input.mask_burn_ratio {
        dnbr_masked(&latest.scene, &post.scene, &latest_mask, &post_mask)?
    } else {
        dnbr(&latest.scene, &post.scene)?
    };

    Ok(Assessment {
        ndvi_classes: classify_ndvi(&latest_ndvi)?,
        vci_classes: classify_vci(&vci_raster)?,
        dnbr_classes: classify_dnbr(&dnbr_raster)?,
        ndvi: latest_ndvi,
        vci: vci_raster,
        dnbr: dnbr_raster,
        history_used: history.len(),
        pre_fire_masked,
        post_fire_masked: masked_fraction(&post_mask),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnmap_core::sentinel2::{NIR, RED, SWIR};
    use ndarray::Array3;

    fn observation(rows: usize, cols: usize, nir: f64, red: f64, swir: f64, scl: u8) -> Observation {
        let mut data = Array3::zeros((rows, cols, 12));
        for row in 0..rows {
            for col in 0..cols {
                data[(row, col, NIR)] = nir;
                data[(row, col, RED)] = red;
                data[(row, col, SWIR)] = swir;
            }
        }
        Observation::new(Scene::from_array(data), Raster::filled(rows, cols, scl))
    }

    #[test]
    fn test_full_assessment() {
        let input = AssessmentInput {
            pre_fire: vec![
                observation(3, 3, 4000.0, 1000.0, 1500.0, 4), // NDVI 0.6
                observation(3, 3, 3000.0, 1000.0, 1500.0, 4), // NDVI 0.5 (latest)
                observation(3, 3, 2000.0, 1000.0, 1500.0, 4), // NDVI 0.333
            ],
            latest_pre_fire: 1,
            post_fire: observation(3, 3, 1000.0, 900.0, 3000.0, 5),
            mask_burn_ratio: false,
        };
        let result = assess(&input).unwrap();

        assert_eq!(result.history_used, 2);
        assert!(result.skipped.is_empty());
        assert!((result.ndvi.get(0, 0).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(result.ndvi_classes.class_at(0, 0).unwrap(), Some(7));

        // (0.5 - 1/3) / (0.6 - 1/3) = 0.625
        assert!((result.vci.get(1, 1).unwrap() - 0.625).abs() < 1e-12);
        assert_eq!(result.vci_classes.class_at(1, 1).unwrap(), Some(3));

        // NBR pre = 1500/4500 = 0.333, post = -2000/4000 = -0.5
        let expected = 1500.0 / 4500.0 + 0.5;
        assert!((result.dnbr.get(2, 2).unwrap() - expected).abs() < 1e-12);
        assert_eq!(result.dnbr_classes.class_at(2, 2).unwrap(), Some(7));

        assert_eq!(result.pre_fire_masked, vec![Some(0.0); 3]);
        assert_eq!(result.post_fire_masked, 0.0);
    }

    #[test]
    fn test_mismatched_history_is_skipped() {
        let input = AssessmentInput {
            pre_fire: vec![
                observation(3, 3, 3000.0, 1000.0, 1500.0, 4),
                observation(2, 2, 3000.0, 1000.0, 1500.0, 4),
                observation(3, 3, 2000.0, 1000.0, 1500.0, 4),
            ],
            latest_pre_fire: 0,
            post_fire: observation(3, 3, 1000.0, 900.0, 3000.0, 4),
            mask_burn_ratio: false,
        };
        let result = assess(&input).unwrap();

        assert_eq!(result.history_used, 1);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].index, 1);
        assert!(matches!(result.skipped[0].error, Error::SizeMismatch { .. }));
        assert_eq!(result.pre_fire_masked[1], None);

        let report = result.report();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!((report.rows, report.cols), (3, 3));
    }

    #[test]
    fn test_cloudy_latest_scene() {
        let input = AssessmentInput {
            pre_fire: vec![observation(2, 2, 3000.0, 1000.0, 1500.0, 9)],
            latest_pre_fire: 0,
            post_fire: observation(2, 2, 1000.0, 900.0, 3000.0, 8),
            mask_burn_ratio: true,
        };
        let result = assess(&input).unwrap();

        assert!(result.ndvi.data().iter().all(|v| v.is_nan()));
        // No history: VCI falls back to 1 everywhere
        assert!(result.vci.data().iter().all(|&v| v == 1.0));
        assert!(result.dnbr.data().iter().all(|v| v.is_nan()));
        assert_eq!(result.pre_fire_masked, vec![Some(1.0)]);
        assert_eq!(result.post_fire_masked, 1.0);
        assert_eq!(result.dnbr_classes.summary().unclassified, 4);
    }

    #[test]
    fn test_unmasked_dnbr_ignores_clouds() {
        let input = AssessmentInput {
            pre_fire: vec![observation(2, 2, 3000.0, 1000.0, 1500.0, 9)],
            latest_pre_fire: 0,
            post_fire: observation(2, 2, 1000.0, 900.0, 3000.0, 8),
            mask_burn_ratio: false,
        };
        let result = assess(&input).unwrap();
        assert!(result.dnbr.data().iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_latest_out_of_range() {
        let input = AssessmentInput {
            pre_fire: vec![observation(2, 2, 1.0, 1.0, 1.0, 4)],
            latest_pre_fire: 3,
            post_fire: observation(2, 2, 1.0, 1.0, 1.0, 4),
            mask_burn_ratio: false,
        };
        assert!(matches!(
            assess(&input),
            Err(Error::InvalidParameter { name: "latest_pre_fire", .. })
        ));
    }

    #[test]
    fn test_post_fire_shape_mismatch_is_fatal() {
        let input = AssessmentInput {
            pre_fire: vec![observation(2, 2, 1.0, 1.0, 1.0, 4)],
            latest_pre_fire: 0,
            post_fire: observation(3, 2, 1.0, 1.0, 1.0, 4),
            mask_burn_ratio: false,
        };
        match assess(&input) {
            Err(Error::SizeMismatch { er, ec, ar, ac }) => {
                assert_eq!((er, ec), (2, 2));
                assert_eq!((ar, ac), (3, 2));
            }
            other => panic!("expected SizeMismatch, got {:?}", other.map(|_| ())),
        }
    }
}

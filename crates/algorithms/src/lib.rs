//! # burnmap algorithms
//!
//! Per-pixel remote-sensing algorithms for wildfire and drought monitoring
//! over Sentinel-2 scenes.
//!
//! ## Modules
//!
//! - **imagery**: SCL exclusion masks, NDVI, VCI, NBR/dNBR, severity
//!   classification, true-colour composites and the multi-scene
//!   assessment workflow

pub mod imagery;
mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        assess, build_exclusion_mask, classify, classify_dnbr, classify_ndvi, classify_vci, dnbr,
        dnbr_masked, nbr, ndvi, true_color, vci, Assessment, AssessmentInput, ClassRaster,
        CompositeParams, Observation, ThresholdTable, DNBR_CLASSES, NDVI_CLASSES, VCI_CLASSES,
    };
    pub use burnmap_core::prelude::*;
}

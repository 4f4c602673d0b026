//! Imagery analysis algorithms
//!
//! Sentinel-2 processing for wildfire assessment:
//! - Quality: exclusion masks from the Scene Classification Layer
//! - Indices: NDVI, NBR and dNBR with sentinel and mask handling
//! - VCI: drought condition against an NDVI time series
//! - Severity: threshold tables and class rasters
//! - Composite: true-colour previews
//! - Assessment: the full pre/post-fire workflow

mod assessment;
mod composite;
mod indices;
mod quality;
mod severity;
mod vci;

pub use assessment::{
    assess, Assessment, AssessmentInput, AssessmentReport, Observation, SceneFailure,
    SkippedScene,
};
pub use composite::{true_color, CompositeParams};
pub use indices::{
    dnbr, dnbr_masked, is_masked, is_zero_sentinel, nbr, ndvi, normalized_difference,
    normalized_difference_value,
};
pub use quality::{
    build_exclusion_mask, is_excluded_code, masked_fraction, scene_class_counts, CLEAR,
    EXCLUDED_SCL_CLASSES, MASKED,
};
pub use severity::{
    classify, classify_dnbr, classify_ndvi, classify_value, classify_vci, ClassBreak, ClassCount,
    ClassRaster, ClassSummary, NanPolicy, ThresholdTable, DNBR_CLASSES, NDVI_CLASSES,
    VCI_CLASSES,
};
pub use vci::{vci, vci_value, VCI_FALLBACK};

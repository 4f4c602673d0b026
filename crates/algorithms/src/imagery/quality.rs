//! Cloud and quality masking from the Scene Classification Layer
//!
//! Collapses the SCL categories into a single exclude/keep bit per pixel
//! before any index arithmetic.

use burnmap_core::raster::Raster;
use burnmap_core::sentinel2::SceneClass;

/// SCL classes whose reflectances are not trusted by the index engines.
pub const EXCLUDED_SCL_CLASSES: [SceneClass; 6] = [
    SceneClass::NoData,
    SceneClass::SaturatedOrDefective,
    SceneClass::CloudShadows,
    SceneClass::CloudMediumProbability,
    SceneClass::CloudHighProbability,
    SceneClass::SnowOrIce,
];

/// Mask value for an excluded pixel.
pub const MASKED: u8 = 1;
/// Mask value for a usable pixel.
pub const CLEAR: u8 = 0;

/// Whether an SCL code belongs to the excluded set `{0, 1, 3, 8, 9, 11}`.
pub fn is_excluded_code(code: u8) -> bool {
    EXCLUDED_SCL_CLASSES.iter().any(|class| class.code() == code)
}

/// Build the binary exclusion mask of a scene.
///
/// Each output cell is [`MASKED`] (1) when its SCL code is excluded
/// (no data, saturated, cloud shadow, medium/high probability cloud,
/// snow/ice) and [`CLEAR`] (0) otherwise. Codes outside the SCL range are
/// kept, matching a plain membership test.
pub fn build_exclusion_mask(scl: &Raster<u8>) -> Raster<u8> {
    let data = scl
        .data()
        .mapv(|code| if is_excluded_code(code) { MASKED } else { CLEAR });
    Raster::from_array(data)
}

/// Share of pixels in an exclusion mask that are masked, in [0, 1].
///
/// Returns 0.0 for an empty mask.
pub fn masked_fraction(mask: &Raster<u8>) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    let masked = mask.data().iter().filter(|&&v| v == MASKED).count();
    masked as f64 / mask.len() as f64
}

/// Pixel count of every SCL class present in `scl`, in code order.
///
/// Codes outside 0..=11 are not counted.
pub fn scene_class_counts(scl: &Raster<u8>) -> Vec<(SceneClass, usize)> {
    let mut counts = [0usize; SceneClass::ALL.len()];
    for &code in scl.data().iter() {
        if let Some(n) = counts.get_mut(code as usize) {
            *n += 1;
        }
    }
    SceneClass::ALL
        .iter()
        .zip(counts)
        .filter(|&(_, n)| n > 0)
        .map(|(&class, n)| (class, n))
        .collect()
}

//! Sentinel-2 band layout and Scene Classification Layer codes
//!
//! Scenes are stacks of Level-2A surface reflectance bands in the order
//! B1, B2, B3, B4, B5, B6, B7, B8, B8A, B9, B11, B12, so the positions
//! below are array indices into the band axis, not band names.

use serde::Serialize;

/// Blue (B2)
pub const BLUE: usize = 1;
/// Green (B3)
pub const GREEN: usize = 2;
/// Red (B4)
pub const RED: usize = 3;
/// Near-infrared
pub const NIR: usize = 7;
/// Shortwave infrared
pub const SWIR: usize = 11;

/// Digital numbers are reflectance multiplied by this factor.
pub const REFLECTANCE_SCALE: f64 = 10_000.0;

/// Scene Classification Layer class, one per SCL code 0..=11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SceneClass {
    NoData,
    SaturatedOrDefective,
    DarkAreaPixels,
    CloudShadows,
    Vegetation,
    BareSoils,
    Water,
    CloudLowProbability,
    CloudMediumProbability,
    CloudHighProbability,
    ThinCirrus,
    SnowOrIce,
}

impl SceneClass {
    /// All classes in code order.
    pub const ALL: [SceneClass; 12] = [
        Self::NoData,
        Self::SaturatedOrDefective,
        Self::DarkAreaPixels,
        Self::CloudShadows,
        Self::Vegetation,
        Self::BareSoils,
        Self::Water,
        Self::CloudLowProbability,
        Self::CloudMediumProbability,
        Self::CloudHighProbability,
        Self::ThinCirrus,
        Self::SnowOrIce,
    ];

    /// Decode an SCL value; `None` for codes outside 0..=11.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// The SCL code of this class.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::NoData => "No data",
            Self::SaturatedOrDefective => "Saturated / defective",
            Self::DarkAreaPixels => "Dark area pixels",
            Self::CloudShadows => "Cloud shadows",
            Self::Vegetation => "Vegetation",
            Self::BareSoils => "Bare soils",
            Self::Water => "Water",
            Self::CloudLowProbability => "Clouds low probability / unclassified",
            Self::CloudMediumProbability => "Clouds medium probability",
            Self::CloudHighProbability => "Clouds high probability",
            Self::ThinCirrus => "Cirrus",
            Self::SnowOrIce => "Snow / ice",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_enum() {
        for code in 0u8..12 {
            assert_eq!(SceneClass::from_code(code).unwrap().code(), code);
        }
        assert_eq!(SceneClass::from_code(12), None);
    }

    #[test]
    fn cloud_codes() {
        assert_eq!(SceneClass::from_code(8), Some(SceneClass::CloudMediumProbability));
        assert_eq!(SceneClass::from_code(9), Some(SceneClass::CloudHighProbability));
        assert_eq!(SceneClass::SnowOrIce.code(), 11);
    }

    #[test]
    fn band_positions_fit_twelve_band_stack() {
        assert!(RED < NIR && NIR < SWIR && SWIR < 12);
    }
}

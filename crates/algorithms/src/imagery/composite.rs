//! True-colour composite

use burnmap_core::raster::Scene;
use burnmap_core::sentinel2::{BLUE, GREEN, RED, REFLECTANCE_SCALE};
use burnmap_core::{Error, Result};
use ndarray::{Array3, Axis, Zip};

/// Parameters for [`true_color`]
#[derive(Debug, Clone)]
pub struct CompositeParams {
    /// Divisor turning digital numbers into reflectance (default: 10000)
    pub scale: f64,
    /// Brightness gain applied after scaling (default: 3.5)
    pub gain: f64,
}

impl Default for CompositeParams {
    fn default() -> Self {
        Self {
            scale: REFLECTANCE_SCALE,
            gain: 3.5,
        }
    }
}

/// Red/green/blue preview of a scene.
///
/// Returns a 3-band scene (R, G, B) taken from source bands 3, 2 and 1,
/// each mapped through `clamp(value / scale * gain, 0, 1)`. NaN stays NaN.
pub fn true_color(scene: &Scene<f64>, params: CompositeParams) -> Result<Scene<f64>> {
    if !(params.scale > 0.0) {
        return Err(Error::InvalidParameter {
            name: "scale",
            value: params.scale.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    scene.require_bands(&[RED, GREEN, BLUE])?;

    let (rows, cols) = scene.shape();
    let factor = params.gain / params.scale;
    let mut rgb = Array3::zeros((rows, cols, 3));

    for (out_band, src_band) in [RED, GREEN, BLUE].into_iter().enumerate() {
        let src = scene.band_view(src_band)?;
        Zip::from(rgb.index_axis_mut(Axis(2), out_band))
            .and(&src)
            .for_each(|out, &v| *out = (v * factor).clamp(0.0, 1.0));
    }

    Ok(Scene::from_array(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(red: f64, green: f64, blue: f64) -> Scene<f64> {
        let mut data = Array3::zeros((2, 2, 12));
        data.index_axis_mut(Axis(2), RED).fill(red);
        data.index_axis_mut(Axis(2), GREEN).fill(green);
        data.index_axis_mut(Axis(2), BLUE).fill(blue);
        Scene::from_array(data)
    }

    #[test]
    fn test_true_color_scaling() {
        let rgb = true_color(&scene(1000.0, 2000.0, 4000.0), CompositeParams::default()).unwrap();

        assert_eq!(rgb.band_count(), 3);
        assert!((rgb.band(0).unwrap().get(0, 0).unwrap() - 0.35).abs() < 1e-12);
        assert!((rgb.band(1).unwrap().get(0, 0).unwrap() - 0.7).abs() < 1e-12);
        // 4000 / 10000 * 3.5 = 1.4 -> clipped
        assert_eq!(rgb.band(2).unwrap().get(1, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_true_color_clips_negative_and_keeps_nan() {
        let rgb = true_color(&scene(-50.0, f64::NAN, 0.0), CompositeParams::default()).unwrap();
        assert_eq!(rgb.band(0).unwrap().get(0, 0).unwrap(), 0.0);
        assert!(rgb.band(1).unwrap().get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_true_color_invalid_scale() {
        let params = CompositeParams {
            scale: 0.0,
            ..Default::default()
        };
        assert!(true_color(&scene(1.0, 1.0, 1.0), params).is_err());
    }

    #[test]
    fn test_true_color_needs_red() {
        let s = Scene::from_array(Array3::<f64>::zeros((1, 1, 3)));
        assert!(true_color(&s, CompositeParams::default()).is_err());
    }
}

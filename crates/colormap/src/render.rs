//! Raster-to-RGBA rendering using color schemes and class palettes.
//!
//! Every function returns a `Vec<u8>` of length `rows * cols * 4` in
//! row-major order.

use crate::scheme::{evaluate, ColorScheme, Palette, Rgb};
use burnmap_algorithms::imagery::ClassRaster;
use burnmap_core::raster::{Raster, RasterElement, Scene};
use burnmap_core::{Error, Result};

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Parameters for colormap rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    /// Color scheme to use.
    pub scheme: ColorScheme,
    /// Minimum value for normalization. Values below this are clamped.
    pub min: f64,
    /// Maximum value for normalization. Values above this are clamped.
    pub max: f64,
    /// Color for nodata pixels (RGBA). Default: fully transparent.
    pub nodata_color: [u8; 4],
}

impl ColormapParams {
    /// Params over [0, 1]; use [`auto_params`] to detect the range instead.
    pub fn new(scheme: ColorScheme) -> Self {
        Self::with_range(scheme, 0.0, 1.0)
    }

    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            nodata_color: TRANSPARENT,
        }
    }

    /// Range centred on zero, for signed differences such as dNBR.
    pub fn symmetric(scheme: ColorScheme, extent: f64) -> Self {
        let extent = extent.abs();
        Self::with_range(scheme, -extent, extent)
    }
}

/// Detect min/max from the valid cells of a raster.
///
/// All-nodata rasters get [0, 1]; constant rasters get [v, v + 1].
pub fn auto_params<T: RasterElement>(raster: &Raster<T>, scheme: ColorScheme) -> ColormapParams {
    let nodata = raster.nodata();
    let (min, max) = raster
        .data()
        .iter()
        .filter(|v| !v.is_nodata(nodata))
        .filter_map(|v| v.to_f64())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        ColormapParams::new(scheme)
    } else if (max - min).abs() < f64::EPSILON {
        ColormapParams::with_range(scheme, min, min + 1.0)
    } else {
        ColormapParams::with_range(scheme, min, max)
    }
}

/// Render a continuous raster through a color scheme.
///
/// Nodata, NaN and infinite cells get `params.nodata_color`.
pub fn raster_to_rgba<T: RasterElement>(raster: &Raster<T>, params: &ColormapParams) -> Vec<u8> {
    let nodata = raster.nodata();
    let range = params.max - params.min;
    let inv_range = if range.abs() > f64::EPSILON {
        1.0 / range
    } else {
        1.0
    };

    let mut rgba = Vec::with_capacity(raster.len() * 4);
    for val in raster.data().iter() {
        let pixel = match val.to_f64() {
            Some(v) if v.is_finite() && !val.is_nodata(nodata) => {
                evaluate(params.scheme, (v - params.min) * inv_range).to_rgba()
            }
            _ => params.nodata_color,
        };
        rgba.extend_from_slice(&pixel);
    }
    rgba
}

/// Render a classified raster with a discrete palette.
///
/// Unclassified (NaN) cells are transparent.
pub fn classes_to_rgba(classes: &ClassRaster, palette: &Palette) -> Vec<u8> {
    let raster = classes.raster();
    let mut rgba = Vec::with_capacity(raster.len() * 4);
    for &v in raster.data().iter() {
        let pixel = if v.is_nan() {
            TRANSPARENT
        } else {
            palette.color(v as u8).to_rgba()
        };
        rgba.extend_from_slice(&pixel);
    }
    rgba
}

/// Render an integer-coded raster (e.g. an SCL band) with a palette.
///
/// Cells equal to the raster's nodata value are transparent.
pub fn codes_to_rgba(codes: &Raster<u8>, palette: &Palette) -> Vec<u8> {
    let nodata = codes.nodata();
    let mut rgba = Vec::with_capacity(codes.len() * 4);
    for &code in codes.data().iter() {
        let pixel = if code.is_nodata(nodata) {
            TRANSPARENT
        } else {
            palette.color(code).to_rgba()
        };
        rgba.extend_from_slice(&pixel);
    }
    rgba
}

/// Render a 3-band composite with values in [0, 1].
///
/// A pixel with any NaN channel is transparent.
///
/// # Errors
/// [`Error::InvalidParameter`] unless the scene has exactly three bands.
pub fn composite_to_rgba(rgb: &Scene<f64>) -> Result<Vec<u8>> {
    if rgb.band_count() != 3 {
        return Err(Error::InvalidParameter {
            name: "bands",
            value: rgb.band_count().to_string(),
            reason: "composite must have exactly 3 bands".to_string(),
        });
    }

    let (rows, cols) = rgb.shape();
    let data = rgb.data();
    let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

    let mut rgba = Vec::with_capacity(rows * cols * 4);
    for row in 0..rows {
        for col in 0..cols {
            let (r, g, b) = (data[(row, col, 0)], data[(row, col, 1)], data[(row, col, 2)]);
            let pixel = if r.is_nan() || g.is_nan() || b.is_nan() {
                TRANSPARENT
            } else {
                Rgb::new(to_byte(r), to_byte(g), to_byte(b)).to_rgba()
            };
            rgba.extend_from_slice(&pixel);
        }
    }
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnmap_algorithms::imagery::{classify_dnbr, classify_vci};
    use ndarray::Array3;

    #[test]
    fn raster_to_rgba_basic() {
        let mut r = Raster::from_rows(&[vec![0.0, 0.5], vec![1.0, f64::NAN]]).unwrap();
        r.set_nodata(Some(f64::NAN));

        let params = ColormapParams::with_range(ColorScheme::Grayscale, 0.0, 1.0);
        let rgba = raster_to_rgba(&r, &params);

        assert_eq!(rgba.len(), 16);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[128, 128, 128, 255]);
        assert_eq!(&rgba[8..12], &[255, 255, 255, 255]);
        assert_eq!(&rgba[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn raster_to_rgba_nan_without_nodata() {
        let r = Raster::from_rows(&[vec![f64::NAN]]).unwrap();
        let rgba = raster_to_rgba(&r, &ColormapParams::new(ColorScheme::Viridis));
        assert_eq!(rgba, vec![0, 0, 0, 0]);
    }

    #[test]
    fn auto_params_range() {
        let r = Raster::from_rows(&[vec![10.0, 50.0, 100.0]]).unwrap();
        let params = auto_params(&r, ColorScheme::Viridis);
        assert!((params.min - 10.0).abs() < f64::EPSILON);
        assert!((params.max - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn auto_params_skips_nan() {
        let mut r = Raster::from_rows(&[vec![f64::NAN, -0.2, 0.8]]).unwrap();
        r.set_nodata(Some(f64::NAN));
        let params = auto_params(&r, ColorScheme::Ndvi);
        assert!((params.min + 0.2).abs() < f64::EPSILON);
        assert!((params.max - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn auto_params_degenerate() {
        let empty = Raster::from_rows(&[vec![f64::NAN, f64::NAN]]).unwrap();
        let params = auto_params(&empty, ColorScheme::Grayscale);
        assert_eq!((params.min, params.max), (0.0, 1.0));

        let constant = Raster::<f64>::filled(2, 2, 42.0);
        let params = auto_params(&constant, ColorScheme::Grayscale);
        assert_eq!((params.min, params.max), (42.0, 43.0));
    }

    #[test]
    fn symmetric_range() {
        let params = ColormapParams::symmetric(ColorScheme::Divergent, -1.5);
        assert_eq!((params.min, params.max), (-1.5, 1.5));
    }

    #[test]
    fn classes_to_rgba_uses_palette() {
        let dnbr = Raster::from_rows(&[vec![-0.5, 0.0, f64::NAN, 2.0]]).unwrap();
        let classes = classify_dnbr(&dnbr).unwrap();
        let rgba = classes_to_rgba(&classes, &Palette::DNBR_CLASSES);

        assert_eq!(&rgba[0..4], &[0, 0, 255, 255]); // class 1: blue
        assert_eq!(&rgba[4..8], &[0, 128, 0, 255]); // class 3: green
        assert_eq!(&rgba[8..12], &[0, 0, 0, 0]); // unclassified
        assert_eq!(&rgba[12..16], &[128, 0, 128, 255]); // class 8 clamps to purple
    }

    #[test]
    fn classes_to_rgba_vci() {
        let vci = Raster::from_rows(&[vec![0.1, 0.4, 0.9]]).unwrap();
        let rgba = classes_to_rgba(&classify_vci(&vci).unwrap(), &Palette::VCI_CLASSES);
        assert_eq!(rgba, vec![255, 0, 0, 255, 255, 255, 0, 255, 0, 128, 0, 255]);
    }

    #[test]
    fn codes_to_rgba_scl() {
        let scl = Raster::from_rows(&[vec![4u8, 9]]).unwrap();
        let rgba = codes_to_rgba(&scl, &Palette::SCL);
        assert_eq!(&rgba[0..4], &[0, 255, 0, 255]);
        assert_eq!(&rgba[4..8], &[211, 211, 211, 255]);
    }

    #[test]
    fn composite_rendering() {
        let mut data = Array3::zeros((1, 2, 3));
        data[(0, 0, 0)] = 1.0;
        data[(0, 0, 1)] = 0.5;
        data[(0, 1, 2)] = f64::NAN;
        let rgba = composite_to_rgba(&Scene::from_array(data)).unwrap();
        assert_eq!(rgba, vec![255, 128, 0, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn composite_requires_three_bands() {
        let scene = Scene::from_array(Array3::<f64>::zeros((1, 1, 12)));
        assert!(composite_to_rgba(&scene).is_err());
    }
}

//! Cell value trait shared by rasters and scenes

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Types that can be stored in a raster cell.
///
/// Implemented for the unsigned integer types used by Sentinel-2 products
/// (SCL codes, digital numbers), signed integers and both float widths.
pub trait RasterElement:
    Copy + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// No-data value used when a cast from the source type fails
    fn default_nodata() -> Self;

    /// Whether this value should be treated as missing
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Whether every value of this type is exactly representable as f32
    fn fits_f32() -> bool;

    /// Lossy conversion to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_element_int {
    ($($t:ty),*) => {$(
        impl RasterElement for $t {
            fn default_nodata() -> Self {
                <$t>::MAX
            }

            fn fits_f32() -> bool {
                std::mem::size_of::<$t>() <= 2
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                nodata == Some(*self)
            }
        }
    )*};
}

macro_rules! impl_element_float {
    ($($t:ty),*) => {$(
        impl RasterElement for $t {
            fn default_nodata() -> Self {
                <$t>::NAN
            }

            fn fits_f32() -> bool {
                std::mem::size_of::<$t>() <= 4
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                    None => false,
                }
            }
        }
    )*};
}

impl_element_int!(u8, u16, u32, i16, i32);
impl_element_float!(f32, f64);

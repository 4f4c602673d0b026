//! Native TIFF reading/writing built on the `tiff` crate.
//!
//! Rasters are single-band images. Scenes are either one page per band,
//! one page with interleaved samples, or a mix of both; bands are numbered
//! in file order. Georeferencing tags are neither read nor written.

use crate::error::{Error, Result};
use crate::raster::{Raster, RasterElement, Scene};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray32Float, Gray64Float, RGBA8};
use tiff::encoder::TiffEncoder;

/// Read the first page of a single-band TIFF into a raster
pub fn read_raster<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = BufReader::new(File::open(path.as_ref())?);
    decode_raster(file)
}

/// Same as [`read_raster`] but from an in-memory buffer
pub fn read_raster_from_buffer<T: RasterElement>(data: &[u8]) -> Result<Raster<T>> {
    decode_raster(Cursor::new(data))
}

/// Read every page and sample of a TIFF into a multi-band scene
pub fn read_scene<T, P>(path: P) -> Result<Scene<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = BufReader::new(File::open(path.as_ref())?);
    decode_scene(file)
}

/// Same as [`read_scene`] but from an in-memory buffer
pub fn read_scene_from_buffer<T: RasterElement>(data: &[u8]) -> Result<Scene<T>> {
    decode_scene(Cursor::new(data))
}

fn decode_raster<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)?;
    let page = decode_page::<T, R>(&mut decoder)?;
    if page.samples != 1 {
        return Err(Error::UnsupportedDataType(format!(
            "expected a single-band raster, found {} samples per pixel",
            page.samples
        )));
    }
    Raster::from_vec(page.data, page.rows, page.cols)
}

fn decode_scene<T, R>(reader: R) -> Result<Scene<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)?;
    let mut bands: Vec<Raster<T>> = Vec::new();

    loop {
        let page = decode_page::<T, R>(&mut decoder)?;
        let (rows, cols, samples) = (page.rows, page.cols, page.samples);
        if samples == 1 {
            bands.push(Raster::from_vec(page.data, rows, cols)?);
        } else {
            for s in 0..samples {
                let band: Vec<T> = page.data.iter().skip(s).step_by(samples).copied().collect();
                bands.push(Raster::from_vec(band, rows, cols)?);
            }
        }

        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    Scene::from_bands(&bands)
}

struct Page<T> {
    rows: usize,
    cols: usize,
    samples: usize,
    data: Vec<T>,
}

macro_rules! cast_buffer {
    ($buf:expr) => {
        $buf.into_iter()
            .map(|v| num_traits::cast(v).unwrap_or(T::default_nodata()))
            .collect()
    };
}

fn decode_page<T, R>(decoder: &mut Decoder<R>) -> Result<Page<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;

    let data: Vec<T> = match decoder.read_image()? {
        DecodingResult::U8(buf) => cast_buffer!(buf),
        DecodingResult::U16(buf) => cast_buffer!(buf),
        DecodingResult::U32(buf) => cast_buffer!(buf),
        DecodingResult::U64(buf) => cast_buffer!(buf),
        DecodingResult::I8(buf) => cast_buffer!(buf),
        DecodingResult::I16(buf) => cast_buffer!(buf),
        DecodingResult::I32(buf) => cast_buffer!(buf),
        DecodingResult::I64(buf) => cast_buffer!(buf),
        DecodingResult::F32(buf) => cast_buffer!(buf),
        DecodingResult::F64(buf) => cast_buffer!(buf),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedDataType(
                "unsupported TIFF sample format".to_string(),
            ))
        }
    };

    let pixels = rows * cols;
    if pixels == 0 || data.len() % pixels != 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    Ok(Page {
        rows,
        cols,
        samples: data.len() / pixels,
        data,
    })
}

/// Write a raster as a single-band float TIFF
///
/// Element types that fit in f32 (u8, u16, i16, f32) are stored as 32-bit
/// float, everything else as 64-bit float so values round-trip exactly.
pub fn write_raster<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let mut file = BufWriter::new(File::create(path.as_ref())?);
    encode_raster(raster, &mut file)?;
    file.flush()?;
    Ok(())
}

/// Same as [`write_raster`] but into a byte vector
pub fn write_raster_to_buffer<T: RasterElement>(raster: &Raster<T>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_raster(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_raster<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let (rows, cols) = raster.shape();
    let (width, height) = (cols as u32, rows as u32);
    let mut encoder = TiffEncoder::new(writer)?;

    if T::fits_f32() {
        let data: Vec<f32> = raster
            .data()
            .iter()
            .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
            .collect();
        encoder.write_image::<Gray32Float>(width, height, &data)?;
    } else {
        let data: Vec<f64> = raster
            .data()
            .iter()
            .map(|&v| v.to_f64().unwrap_or(f64::NAN))
            .collect();
        encoder.write_image::<Gray64Float>(width, height, &data)?;
    }
    Ok(())
}

/// Write an RGBA8 pixel buffer (`rows * cols * 4` bytes, row-major) as TIFF
pub fn write_rgba<P: AsRef<Path>>(rgba: &[u8], rows: usize, cols: usize, path: P) -> Result<()> {
    if rgba.len() != rows * cols * 4 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }
    let mut file = BufWriter::new(File::create(path.as_ref())?);
    {
        let mut encoder = TiffEncoder::new(&mut file)?;
        encoder.write_image::<RGBA8>(cols as u32, rows as u32, rgba)?;
    }
    file.flush()?;
    Ok(())
}

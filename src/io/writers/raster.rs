use gdal::raster::{Buffer, ColorInterpretation, GdalType};
use gdal::{Dataset, DriverManager};
use ndarray::{ArrayView3, Axis};
use num_traits::{NumCast, Zero};
use std::path::Path;
use tracing::debug;

use crate::io::GdalError;
use crate::types::{OutputDriver, PixelType};

/// Georeferencing and encoding of one output file
#[derive(Debug, Clone)]
pub struct RasterTarget<'a> {
    pub driver: OutputDriver,
    pub pixel_type: PixelType,
    pub geotransform: [f64; 6],
    pub projection: &'a str,
    pub no_data: f64,
}

/// Write a `(bands, rows, cols)` array as a raster with one band per plane.
pub fn write_raster(
    output: &Path,
    data: ArrayView3<f64>,
    target: &RasterTarget<'_>,
) -> Result<Dataset, GdalError> {
    match target.pixel_type {
        PixelType::Byte => write_bands::<u8>(output, data, target),
        PixelType::UInt16 => write_bands::<u16>(output, data, target),
        PixelType::Int16 => write_bands::<i16>(output, data, target),
        PixelType::UInt32 => write_bands::<u32>(output, data, target),
        PixelType::Int32 => write_bands::<i32>(output, data, target),
        PixelType::Float32 => write_bands::<f32>(output, data, target),
        PixelType::Float64 => write_bands::<f64>(output, data, target),
    }
}

// Values that do not fit T (NaN or out of range for integer types) become the no-data value.
fn cast_plane<T: NumCast + Zero + Copy>(plane: ArrayView3<f64>, band: usize, no_data: f64) -> Vec<T> {
    let fallback: T = NumCast::from(no_data).unwrap_or_else(T::zero);
    plane
        .index_axis(Axis(0), band)
        .iter()
        .map(|&v| NumCast::from(v).unwrap_or(fallback))
        .collect()
}

fn write_bands<T: GdalType + NumCast + Zero + Copy>(
    output: &Path,
    data: ArrayView3<f64>,
    target: &RasterTarget<'_>,
) -> Result<Dataset, GdalError> {
    let (bands, rows, cols) = data.dim();
    let driver = DriverManager::get_driver_by_name(target.driver.gdal_name())?;
    let mut ds = driver.create_with_band_type::<T, _>(output, cols, rows, bands)?;

    ds.set_geo_transform(&target.geotransform)?;
    if !target.projection.is_empty() {
        ds.set_projection(target.projection)?;
    }

    for b in 0..bands {
        let mut band = ds.rasterband(b + 1)?;
        if bands > 1 {
            band.set_color_interpretation(ColorInterpretation::GrayIndex)?;
        }
        let mut buf = Buffer::new((cols, rows), cast_plane::<T>(data, b, target.no_data));
        band.write((0, 0), (cols, rows), &mut buf)?;
        band.set_no_data_value(Some(target.no_data))?;
    }
    debug!(
        "write_raster: {} band(s) of {}x{} {} to {:?}",
        bands, cols, rows, target.pixel_type, output
    );
    Ok(ds)
}

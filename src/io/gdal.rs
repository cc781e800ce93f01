use gdal::raster::GdalDataType;
use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::source::{DEFAULT_NO_DATA, IDENTITY_GEOTRANSFORM, RasterSource, SourceInfo};
use crate::types::PixelType;

/// Errors encountered when using GDAL reader
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1} pixels, got {2} values")]
    DimensionMismatch(usize, usize, usize),
}

/// Raster source backed by a GDAL dataset (GeoTIFF, ENVI, ...)
pub struct GdalRaster {
    pub path: PathBuf,
    pub dataset: Dataset,
    info: SourceInfo,
}

impl std::fmt::Debug for GdalRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GdalRaster")
            .field("path", &self.path)
            .field("info", &self.info)
            .finish()
    }
}

fn pixel_type_of(data_type: GdalDataType) -> Option<PixelType> {
    match data_type {
        GdalDataType::UInt8 => Some(PixelType::Byte),
        GdalDataType::UInt16 => Some(PixelType::UInt16),
        GdalDataType::Int16 => Some(PixelType::Int16),
        GdalDataType::UInt32 => Some(PixelType::UInt32),
        GdalDataType::Int32 => Some(PixelType::Int32),
        GdalDataType::Float32 => Some(PixelType::Float32),
        GdalDataType::Float64 => Some(PixelType::Float64),
        _ => None,
    }
}

impl GdalRaster {
    /// Open a GDAL-supported dataset. A file GDAL cannot open maps to `Error::NotFound`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let dataset = Dataset::open(path).map_err(|e| {
            debug!("GDAL failed to open {:?}: {}", path, e);
            Error::NotFound {
                path: path.to_path_buf(),
            }
        })?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()).into());
        }
        let geotransform = dataset.geo_transform().unwrap_or(IDENTITY_GEOTRANSFORM);
        let projection = dataset.projection();

        let first = dataset.rasterband(1).map_err(GdalError::from)?;
        let pixel_type = match pixel_type_of(first.band_type()) {
            Some(pixel_type) => pixel_type,
            None => {
                warn!(
                    "{:?}: unsupported band type {:?}, treating as Float64",
                    path,
                    first.band_type()
                );
                PixelType::Float64
            }
        };
        let no_data = first.no_data_value().unwrap_or(DEFAULT_NO_DATA);

        // Collect metadata entries (domain "")
        let mut metadata = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    metadata.insert(key.to_string(), val.to_string());
                }
            }
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(GdalRaster {
            path: path.to_path_buf(),
            dataset,
            info: SourceInfo {
                name,
                size_x,
                size_y,
                bands,
                pixel_type,
                geotransform,
                projection,
                no_data,
                metadata,
            },
        })
    }
}

impl RasterSource for GdalRaster {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn read_band(&self, index: usize) -> Result<Array2<f64>> {
        if index == 0 || index > self.info.bands {
            return Err(GdalError::UnsupportedFormat(format!(
                "Band index {} out of range",
                index
            ))
            .into());
        }
        let band = self.dataset.rasterband(index).map_err(GdalError::from)?;
        let window = (self.info.size_x, self.info.size_y);
        let buf = band
            .read_as::<f64>((0, 0), window, window, None)
            .map_err(GdalError::from)?;
        Ok(plane(
            buf.data().to_vec(),
            self.info.size_y,
            self.info.size_x,
        )?)
    }
}

// Shape a band buffer read from GDAL into `(rows, cols)`.
fn plane(values: Vec<f64>, rows: usize, cols: usize) -> std::result::Result<Array2<f64>, GdalError> {
    let len = values.len();
    Array2::from_shape_vec((rows, cols), values)
        .map_err(|_| GdalError::DimensionMismatch(cols, rows, len))
}

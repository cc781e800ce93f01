//! In-memory raster source, for synthetic data and for grids assembled from
//! arrays computed elsewhere.
use std::collections::HashMap;

use ndarray::{Array2, Array3, Axis};

use crate::error::{Error, Result};
use crate::io::source::{DEFAULT_NO_DATA, IDENTITY_GEOTRANSFORM, RasterSource, SourceInfo};
use crate::types::PixelType;

#[derive(Debug, Clone)]
pub struct MemoryRaster {
    data: Array3<f64>,
    info: SourceInfo,
}

impl MemoryRaster {
    /// Wrap a `(bands, rows, cols)` array.
    pub fn new(name: impl Into<String>, data: Array3<f64>) -> Self {
        let (bands, rows, cols) = data.dim();
        MemoryRaster {
            data,
            info: SourceInfo {
                name: name.into(),
                size_x: cols,
                size_y: rows,
                bands,
                pixel_type: PixelType::Float64,
                geotransform: IDENTITY_GEOTRANSFORM,
                projection: String::new(),
                no_data: DEFAULT_NO_DATA,
                metadata: HashMap::new(),
            },
        }
    }

    pub fn with_geotransform(mut self, geotransform: [f64; 6]) -> Self {
        self.info.geotransform = geotransform;
        self
    }

    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.info.projection = projection.into();
        self
    }

    pub fn with_no_data(mut self, no_data: f64) -> Self {
        self.info.no_data = no_data;
        self
    }

    pub fn with_pixel_type(mut self, pixel_type: PixelType) -> Self {
        self.info.pixel_type = pixel_type;
        self
    }
}

impl RasterSource for MemoryRaster {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn read_band(&self, index: usize) -> Result<Array2<f64>> {
        if index == 0 || index > self.info.bands {
            return Err(Error::InvalidArgument {
                arg: "band",
                value: index.to_string(),
            });
        }
        Ok(self.data.index_axis(Axis(0), index - 1).to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_one_based_bands() {
        let data = Array3::from_shape_fn((2, 3, 4), |(b, r, c)| (b * 100 + r * 10 + c) as f64);
        let raster = MemoryRaster::new("mem", data);
        assert_eq!(raster.info().size_x, 4);
        assert_eq!(raster.info().size_y, 3);
        assert_eq!(raster.info().bands, 2);

        let band = raster.read_band(2).unwrap();
        assert_eq!(band.dim(), (3, 4));
        assert_eq!(band[[2, 3]], 123.0);
        assert!(raster.read_band(0).is_err());
        assert!(raster.read_band(3).is_err());
    }
}

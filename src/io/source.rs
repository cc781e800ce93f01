//! The `RasterSource` seam between the grid and the pixel I/O backend.
//! A source reports its size, band count, georeferencing and no-data value, and
//! hands out one band at a time as an `(rows, cols)` array.
use std::collections::HashMap;
use std::fmt::Debug;

use ndarray::Array2;
use serde::Serialize;

use crate::error::Result;
use crate::types::PixelType;

/// No-data value used when a file does not declare one.
pub const DEFAULT_NO_DATA: f64 = -99999.0;

/// Identity geotransform used when a file carries none.
pub const IDENTITY_GEOTRANSFORM: [f64; 6] = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Metadata of one opened raster source
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    /// File name or label of the source
    pub name: String,
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Pixel type of the first band
    pub pixel_type: PixelType,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection in WKT format, possibly empty
    pub projection: String,
    /// No-data value of the first band, `DEFAULT_NO_DATA` when undeclared
    pub no_data: f64,
    /// Additional metadata key-value pairs
    pub metadata: HashMap<String, String>,
}

/// Origin, pixel size and projection of a source, as carried into written files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoReference {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub origin_y: f64,
    pub pixel_height: f64,
    pub projection: String,
}

impl SourceInfo {
    pub fn geo_reference(&self) -> GeoReference {
        GeoReference {
            origin_x: self.geotransform[0],
            pixel_width: self.geotransform[1],
            origin_y: self.geotransform[3],
            pixel_height: self.geotransform[5],
            projection: self.projection.clone(),
        }
    }

    /// EPSG code from the projection's authority tag, e.g. `EPSG:4326`.
    pub fn epsg(&self) -> Option<String> {
        parse_epsg(&self.projection)
    }
}

// Helper to extract EPSG code from WKT authority tag
fn parse_epsg(wkt: &str) -> Option<String> {
    if wkt.starts_with("EPSG:") {
        return Some(wkt.to_string());
    }
    const KEY: &str = "AUTHORITY[\"EPSG\",\"";
    if let Some(idx) = wkt.rfind(KEY) {
        let start = idx + KEY.len();
        if let Some(end) = wkt[start..].find('"') {
            let code = &wkt[start..start + end];
            return Some(format!("EPSG:{}", code));
        }
    }
    None
}

/// A readable raster dataset.
pub trait RasterSource: Debug {
    fn info(&self) -> &SourceInfo;

    /// Read a single band (1-based index) as an f64 array of shape (rows, cols)
    fn read_band(&self, index: usize) -> Result<Array2<f64>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const WGS84: &str = "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563,AUTHORITY[\"EPSG\",\"7030\"]],AUTHORITY[\"EPSG\",\"6326\"]],PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433],AUTHORITY[\"EPSG\",\"4326\"]]";

    #[test]
    fn epsg_comes_from_last_authority_tag() {
        assert_eq!(parse_epsg(WGS84).as_deref(), Some("EPSG:4326"));
        assert_eq!(parse_epsg("EPSG:32633").as_deref(), Some("EPSG:32633"));
        assert_eq!(parse_epsg(""), None);
    }

    #[test]
    fn geo_reference_picks_origin_and_resolution() {
        let info = SourceInfo {
            name: "a".into(),
            size_x: 2,
            size_y: 2,
            bands: 1,
            pixel_type: PixelType::Int32,
            geotransform: [12.2, 0.0001, 0.0, 50.9, 0.0, -0.0001],
            projection: WGS84.into(),
            no_data: DEFAULT_NO_DATA,
            metadata: HashMap::new(),
        };
        let geo = info.geo_reference();
        assert_eq!(geo.origin_x, 12.2);
        assert_eq!(geo.pixel_width, 0.0001);
        assert_eq!(geo.origin_y, 50.9);
        assert_eq!(geo.pixel_height, -0.0001);
        assert_eq!(geo.projection, WGS84);
    }
}

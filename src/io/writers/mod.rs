//! GDAL writers: raster creation per output driver and pixel type, plus
//! metadata embedding.
pub mod metadata;
pub mod raster;

pub use metadata::{embed_metadata, processing_metadata};
pub use raster::{RasterTarget, write_raster};

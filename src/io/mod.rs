//! I/O layer: the `RasterSource` seam, the GDAL-backed reader, an in-memory
//! source, input discovery, and `writers` for GeoTIFF/ENVI outputs.
pub mod source;
pub use source::{DEFAULT_NO_DATA, GeoReference, RasterSource, SourceInfo};

pub mod gdal;
pub use self::gdal::{GdalError, GdalRaster};

pub mod memory;
pub use memory::MemoryRaster;

pub mod discover;

pub mod writers;

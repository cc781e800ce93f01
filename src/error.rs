//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, GDAL, ndarray and JSON errors, and provides semantic
//! variants for configuration, precondition and argument validation failures.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Couldn't open file {path:?}. Perhaps you need an .hdr file?")]
    NotFound { path: PathBuf },

    #[error("Input dimensions must agree: cols = {cols:?}, rows = {rows:?}")]
    DimensionMismatch { cols: Vec<usize>, rows: Vec<usize> },

    #[error("{0}")]
    Precondition(String),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },
}

impl Error {
    pub(crate) fn not_loaded(operation: &str) -> Self {
        Error::Precondition(format!(
            "Before you can {} you must load the raster files with Grid::to_array()",
            operation
        ))
    }
}

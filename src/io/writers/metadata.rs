use gdal::Dataset;
use gdal::Metadata;
use std::collections::BTreeMap;
use tracing::debug;

use crate::io::GdalError;
use crate::types::{Scale, UnitSystem};

/// Extract the radiometric state of a grid into `RADGRID_*` metadata items
pub fn processing_metadata(
    units: Option<(UnitSystem, Scale)>,
    no_data: f64,
) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    if let Some((system, scale)) = units {
        metadata.insert("RADGRID_UNIT_SYSTEM".to_string(), system.to_string());
        metadata.insert("RADGRID_SCALE".to_string(), scale.to_string());
    }
    metadata.insert("RADGRID_NODATA".to_string(), no_data.to_string());
    metadata.insert(
        "RADGRID_CREATED".to_string(),
        chrono::Utc::now().to_rfc3339(),
    );
    metadata.insert(
        "RADGRID_VERSION".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    metadata
}

/// Embed metadata items into the default domain of a dataset
pub fn embed_metadata(
    ds: &mut Dataset,
    metadata: &BTreeMap<String, String>,
) -> Result<(), GdalError> {
    for (key, value) in metadata {
        ds.set_metadata_item(key, value, "")?;
    }
    debug!("Embedded {} metadata item(s)", metadata.len());
    Ok(())
}

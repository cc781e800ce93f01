//! Input discovery and path resolution.
//!
//! Relative paths are joined onto an explicit base directory; the process working
//! directory is never changed.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Resolve `path` against `base`. Absolute paths and a missing base leave `path` as is.
pub fn resolve_path(base: Option<&Path>, path: &Path) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

/// Files directly inside `dir` whose name ends with `extension`, sorted by name.
pub fn find_by_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if extension.is_empty() {
        return Err(Error::Configuration(
            "Extension must not be empty. For example '.bin'".to_string(),
        ));
    }
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .map(|name| name.to_string_lossy().ends_with(extension))
            .unwrap_or(false);
        if matches {
            debug!("Matched input file {:?}", path);
            found.push(path);
        }
    }
    found.sort();
    info!(
        "Found {} file(s) with extension {:?} in {:?}",
        found.len(),
        extension,
        dir
    );
    Ok(found)
}

//! CLI command implementations.

pub mod append;
pub mod inspect;
pub mod query;
pub mod rotate;

use logstore_core::{LogStore, StoreConfig};
use std::path::Path;

/// Opens an existing log file for reading.
pub(crate) fn open_existing(path: &Path) -> Result<LogStore, Box<dyn std::error::Error>> {
    open_attached(path, u64::MAX)
}

/// Opens an existing log file without creating or replacing anything.
///
/// A mistyped path, or a path to some other file, is an error rather than
/// a new log or a rotated-away original.
pub(crate) fn open_attached(
    path: &Path,
    max_size: u64,
) -> Result<LogStore, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No log file found at {:?}", path).into());
    }
    tracing::debug!(path = %path.display(), "opening existing log file");
    let config = StoreConfig::default()
        .max_file_size(max_size)
        .attach_only(true);
    Ok(LogStore::open_with_config(path, config)?)
}

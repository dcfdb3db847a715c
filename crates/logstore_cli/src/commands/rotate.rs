//! Rotate and extract command implementations.

use super::open_attached;
use std::path::Path;

/// Runs the rotate command.
pub fn run(path: &Path, max_size: u64) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_attached(path, max_size)?;
    let archive = store.rotate_now()?;
    println!("Rotated {} into {}", path.display(), archive.display());
    store.close()?;
    Ok(())
}

/// Runs the extract command.
pub fn extract(archive: &Path, dest: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if dest.exists() {
        return Err(format!("Refusing to overwrite {:?}", dest).into());
    }
    logstore_core::extract(archive, dest)?;
    println!("Extracted {} to {}", archive.display(), dest.display());
    Ok(())
}

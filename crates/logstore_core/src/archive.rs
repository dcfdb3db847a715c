//! Archival of rotated log files.
//!
//! Rotation hands a closed, renamed log file to an [`Archiver`], which
//! writes a compressed copy next to it. The store deletes the uncompressed
//! file only after the archiver reports success.
//!
//! Archives are written through a temporary `<archive>.partial` file that is
//! synced and then renamed into place, so a crash mid-compression never
//! leaves a truncated file under the final archive name.

use crate::error::{CoreError, CoreResult};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Suffix of in-progress archive files.
const PARTIAL_SUFFIX: &str = "partial";

/// Compresses a completed log file into an archive.
pub trait Archiver: Send + Sync {
    /// File extension appended to the rotated name (without the dot).
    fn extension(&self) -> &str;

    /// Writes a compressed copy of `source` to `dest`.
    ///
    /// `source` is left untouched; the caller deletes it.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` cannot be read or `dest` cannot be
    /// written. No file is left at `dest` on failure.
    fn archive(&self, source: &Path, dest: &Path) -> CoreResult<()>;
}

/// Archiver producing zstd-compressed copies.
#[derive(Debug, Clone)]
pub struct ZstdArchiver {
    level: i32,
}

impl ZstdArchiver {
    /// Extension of archives written by this archiver.
    pub const EXTENSION: &'static str = "zst";

    /// Creates an archiver with the given zstd compression level.
    #[must_use]
    pub const fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdArchiver {
    fn default() -> Self {
        Self::new(zstd::DEFAULT_COMPRESSION_LEVEL)
    }
}

impl Archiver for ZstdArchiver {
    fn extension(&self) -> &str {
        Self::EXTENSION
    }

    fn archive(&self, source: &Path, dest: &Path) -> CoreResult<()> {
        let partial = partial_path(dest);

        let result = (|| -> std::io::Result<()> {
            let input = BufReader::new(File::open(source)?);
            let mut output = BufWriter::new(File::create(&partial)?);
            zstd::stream::copy_encode(input, &mut output, self.level)?;
            output.flush()?;
            let file = output.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
            drop(file);
            fs::rename(&partial, dest)
        })();

        if let Err(err) = result {
            let _ = fs::remove_file(&partial);
            return Err(CoreError::archive(source, err.to_string()));
        }

        sync_parent(dest)?;
        Ok(())
    }
}

/// Decompresses a zstd archive produced by [`ZstdArchiver`] into `dest`.
///
/// The result is a plain log file that can be opened with
/// [`LogStore::open`](crate::LogStore::open). Output goes through
/// `<dest>.partial` and is renamed into place only once fully decoded.
///
/// # Errors
///
/// Returns an error if the archive cannot be read or is not valid zstd data.
/// Nothing is left at `dest` on failure.
pub fn extract(archive: &Path, dest: &Path) -> CoreResult<()> {
    let input = BufReader::new(File::open(archive)?);
    let partial = partial_path(dest);

    let result = (|| -> std::io::Result<()> {
        let mut output = BufWriter::new(File::create(&partial)?);
        zstd::stream::copy_decode(input, &mut output)?;
        output.flush()?;
        let file = output.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&partial, dest)
    })();

    if let Err(err) = result {
        let _ = fs::remove_file(&partial);
        return Err(CoreError::archive(archive, err.to_string()));
    }
    Ok(())
}

/// Returns `<path>.<extension>`.
#[must_use]
pub fn archive_path_for(path: &Path, extension: &str) -> PathBuf {
    append_suffix(path, extension)
}

fn partial_path(dest: &Path) -> PathBuf {
    append_suffix(dest, PARTIAL_SUFFIX)
}

pub(crate) fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Syncs the directory holding `path` so renames and deletions are durable.
#[cfg(unix)]
pub(crate) fn sync_parent(path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        File::open(parent)?.sync_all()?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn sync_parent(_path: &Path) -> CoreResult<()> {
    // NTFS journals metadata updates
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn archive_and_extract() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("app.log.20240101000000");
        let payload: Vec<u8> = (0..10_000u32).flat_map(|i| i.to_le_bytes()).collect();
        fs::write(&source, &payload).unwrap();

        let archiver = ZstdArchiver::default();
        let dest = archive_path_for(&source, archiver.extension());
        archiver.archive(&source, &dest).unwrap();

        assert!(dest.exists());
        assert!(source.exists());
        assert!(!partial_path(&dest).exists());
        assert!(fs::metadata(&dest).unwrap().len() < payload.len() as u64);

        let restored = dir.path().join("restored");
        extract(&dest, &restored).unwrap();
        assert_eq!(fs::read(&restored).unwrap(), payload);
    }

    #[test]
    fn missing_source_leaves_nothing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("gone");
        let dest = archive_path_for(&source, ZstdArchiver::EXTENSION);

        let result = ZstdArchiver::new(1).archive(&source, &dest);
        assert!(matches!(result, Err(CoreError::Archive { .. })));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn extract_rejects_garbage() {
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("bogus.zst");
        fs::write(&bogus, b"definitely not zstd").unwrap();

        let out = dir.path().join("out");
        let result = extract(&bogus, &out);
        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn truncated_archive_leaves_no_output() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("app.log.20240101000000");
        let payload: Vec<u8> = (0..50_000u32)
            .flat_map(|i| i.wrapping_mul(2_654_435_761).to_le_bytes())
            .collect();
        fs::write(&source, &payload).unwrap();

        let archiver = ZstdArchiver::default();
        let dest = archive_path_for(&source, archiver.extension());
        archiver.archive(&source, &dest).unwrap();
        let compressed = fs::read(&dest).unwrap();
        fs::write(&dest, &compressed[..compressed.len() / 2]).unwrap();

        let restored = dir.path().join("restored");
        let result = extract(&dest, &restored);
        assert!(matches!(result, Err(CoreError::Archive { .. })));
        assert!(!restored.exists());
        assert!(!partial_path(&restored).exists());

        fs::write(&dest, &compressed).unwrap();
        extract(&dest, &restored).unwrap();
        assert_eq!(fs::read(&restored).unwrap(), payload);
    }

    #[test]
    fn suffixes_append() {
        let path = Path::new("/var/log/app.db.20240102030405");
        assert_eq!(
            archive_path_for(path, "zst"),
            PathBuf::from("/var/log/app.db.20240102030405.zst")
        );
    }
}

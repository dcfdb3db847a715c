//! Log store configuration.

use crate::error::{CoreError, CoreResult};
use std::time::Duration;

/// Configuration for opening a log store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Estimated file size (page size times page count) above which the
    /// active file is rotated.
    pub max_file_size: u64,

    /// zstd compression level used when archiving rotated files.
    pub compression_level: i32,

    /// How long the engine waits on a file locked by another process.
    pub busy_timeout: Duration,

    /// Whether to fully sync the file on every commit (safer but slower).
    pub sync_on_commit: bool,

    /// Whether to create missing parent directories of the log path.
    pub create_dirs: bool,

    /// Only attach to a file that already holds a log table.
    ///
    /// When set, opening never creates a file or table and never moves an
    /// unusable file aside; it fails instead. Rotation still starts a fresh
    /// file.
    pub attach_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10 MB
            compression_level: 3,
            busy_timeout: Duration::from_secs(5),
            sync_on_commit: true,
            create_dirs: true,
            attach_only: false,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rotation threshold in bytes.
    #[must_use]
    pub const fn max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Sets the zstd compression level for archives.
    #[must_use]
    pub const fn compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets the engine busy timeout.
    #[must_use]
    pub const fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to sync on every commit.
    #[must_use]
    pub const fn sync_on_commit(mut self, value: bool) -> Self {
        self.sync_on_commit = value;
        self
    }

    /// Sets whether missing parent directories are created.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }

    /// Sets whether opening only attaches to an existing log file.
    #[must_use]
    pub const fn attach_only(mut self, value: bool) -> Self {
        self.attach_only = value;
        self
    }

    /// Checks that the configuration can be used to open a store.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `max_file_size` is zero or the compression
    /// level is outside the range zstd accepts.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_file_size == 0 {
            return Err(CoreError::invalid_config("max_file_size must be non-zero"));
        }
        let levels = zstd::compression_level_range();
        if !levels.contains(&self.compression_level) {
            return Err(CoreError::invalid_config(format!(
                "compression_level {} outside {}..={}",
                self.compression_level,
                levels.start(),
                levels.end()
            )));
        }
        Ok(())
    }

    pub(crate) fn synchronous_pragma(&self) -> &'static str {
        if self.sync_on_commit {
            "FULL"
        } else {
            "NORMAL"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert!(config.sync_on_commit);
        assert!(config.create_dirs);
        assert!(!config.attach_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new()
            .max_file_size(4096)
            .sync_on_commit(false)
            .compression_level(9);

        assert_eq!(config.max_file_size, 4096);
        assert!(!config.sync_on_commit);
        assert_eq!(config.compression_level, 9);
        assert_eq!(config.synchronous_pragma(), "NORMAL");
    }

    #[test]
    fn zero_size_rejected() {
        let config = StoreConfig::new().max_file_size(0);
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn bad_level_rejected() {
        let config = StoreConfig::new().compression_level(1000);
        assert!(config.validate().is_err());
    }
}

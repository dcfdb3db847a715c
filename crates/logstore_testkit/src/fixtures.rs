//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up temporary log stores
//! and pre-populated scenarios.

use logstore_core::{LogStore, ProcessIdentity, Record, StoreConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Application name stamped on fixture records.
pub const TEST_APP: &str = "logstore-testkit";

/// Machine name stamped on fixture records.
pub const TEST_MACHINE: &str = "test-host";

/// Threshold large enough that fixtures never rotate on their own.
pub const NO_ROTATION: u64 = 1 << 40;

/// Identity used by fixture records.
pub fn test_identity() -> ProcessIdentity {
    ProcessIdentity::new(TEST_APP, TEST_MACHINE)
}

/// Builds an unwritten record with the fixture identity.
pub fn sample_record(channel: i32, message: impl Into<String>) -> Record {
    Record::new(&test_identity(), "fixtures.rs", 1, channel, message)
}

/// A log store in a temporary directory with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: LogStore,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TestStore {
    /// Creates a store that never rotates.
    pub fn new() -> Self {
        Self::with_max_size(NO_ROTATION)
    }

    /// Creates a store rotating past `max_file_size` bytes.
    pub fn with_max_size(max_file_size: u64) -> Self {
        Self::with_config(StoreConfig::default().max_file_size(max_file_size))
    }

    /// Creates a store with custom configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = LogStore::open_with_config(temp_dir.path().join("test-log.db"), config)
            .expect("Failed to open log store");
        Self { store, temp_dir }
    }

    /// Returns the path of the active log file.
    pub fn path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }

    /// Returns the temporary directory holding the log and its archives.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Returns the rotated archives in the directory, sorted by name.
    pub fn archives(&self) -> Vec<PathBuf> {
        let active = self.store.path();
        let mut found: Vec<PathBuf> = std::fs::read_dir(self.temp_dir.path())
            .expect("Failed to read temp directory")
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| logstore_core::rotation::is_rotated_name(active, p))
            .collect();
        found.sort();
        found
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = LogStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary store that never rotates.
///
/// # Example
///
/// ```rust,ignore
/// use logstore_testkit::with_temp_store;
///
/// #[test]
/// fn my_test() {
///     with_temp_store(|store| {
///         assert_eq!(store.count().unwrap(), 0);
///     });
/// }
/// ```
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&LogStore) -> R,
{
    let test_store = TestStore::new();
    f(&test_store.store)
}

/// Runs a test with a temporary store and its directory.
pub fn with_rotating_store<F, R>(max_file_size: u64, f: F) -> R
where
    F: FnOnce(&TestStore) -> R,
{
    let test_store = TestStore::with_max_size(max_file_size);
    f(&test_store)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a store holding `count` records spread over `channels`
    /// channels round-robin, written in one batch.
    pub fn populated_store(count: usize, channels: i32) -> TestStore {
        let test_store = TestStore::new();
        let mut batch: Vec<Record> = (0..count)
            .map(|i| {
                let channel = i as i32 % channels.max(1);
                sample_record(channel, format!("record {i}"))
            })
            .collect();
        test_store
            .write_batch(&mut batch)
            .expect("Failed to populate store");
        test_store
    }
}

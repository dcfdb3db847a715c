//! Benchmark utilities.

use logstore_core::{LogStore, ProcessIdentity, Record};
use tempfile::TempDir;

/// Threshold large enough that benchmarks never rotate.
pub const NO_ROTATION: u64 = 1 << 40;

/// Identity stamped on benchmark records.
pub fn bench_identity() -> ProcessIdentity {
    ProcessIdentity::new("logstore-bench", "bench-host")
}

/// Generate a batch of records with messages of `message_size` bytes,
/// cycling through `channels` channels.
pub fn generate_records(count: usize, message_size: usize, channels: i32) -> Vec<Record> {
    let identity = bench_identity();
    let payload = "m".repeat(message_size);
    (0..count)
        .map(|i| Record::new(&identity, "bench.rs", i as u32, i as i32 % channels, payload.clone()))
        .collect()
}

/// Opens a store in a fresh temporary directory.
pub fn temp_store(max_file_size: u64) -> (TempDir, LogStore) {
    let dir = TempDir::new().unwrap();
    let store = LogStore::open(dir.path().join("bench.db"), max_file_size).unwrap();
    (dir, store)
}

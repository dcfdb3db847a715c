//! Stress helpers for LogStore.
//!
//! These run heavy or concurrent write loads against a store and report
//! throughput.

use crate::fixtures::sample_record;
use logstore_core::{LogStore, Record};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Rotations triggered by the writes.
    pub rotations: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, rotations: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            rotations,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Rotations: {}", self.rotations);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of write calls per thread.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
    /// Records per write call; 1 means single-record writes.
    pub batch_size: usize,
    /// Size of each message in bytes.
    pub message_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
            batch_size: 1,
            message_size: 128,
        }
    }
}

fn make_batch(config: &StressConfig, thread: usize, op: usize) -> Vec<Record> {
    let payload = "x".repeat(config.message_size);
    (0..config.batch_size.max(1))
        .map(|i| sample_record(thread as i32, format!("t{thread} op{op} #{i} {payload}")))
        .collect()
}

/// Runs a sequential write stress test.
pub fn stress_sequential_writes(store: &LogStore, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;
    let mut rotations = 0usize;

    for op in 0..config.operations {
        let mut batch = make_batch(config, 0, op);
        match store.write_batch(&mut batch) {
            Ok(outcome) => {
                successful += 1;
                if outcome.rotated() {
                    rotations += 1;
                }
            }
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, rotations, start.elapsed())
}

/// Runs writes from `config.threads` threads against one shared store.
///
/// Each thread writes on its own channel (the thread index).
pub fn stress_concurrent_writes(store: Arc<LogStore>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let rotations = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let config = config.clone();
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let rotations = Arc::clone(&rotations);

            thread::spawn(move || {
                for op in 0..config.operations {
                    let mut batch = make_batch(&config, t, op);
                    match store.write_batch(&mut batch) {
                        Ok(outcome) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                            if outcome.rotated() {
                                rotations.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Writer thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        rotations.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Runs concurrent writers alongside one reader polling counts.
///
/// Returns the write result and the number of reads that observed a
/// count lower than an earlier read (always zero for a store that never
/// rotates).
pub fn stress_writes_with_reader(
    store: Arc<LogStore>,
    config: &StressConfig,
) -> (StressTestResult, usize) {
    let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let reader = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut last = 0u64;
            let mut regressions = 0usize;
            while !done.load(Ordering::Acquire) {
                if let Ok(n) = store.count() {
                    if n < last {
                        regressions += 1;
                    }
                    last = n;
                }
                thread::yield_now();
            }
            regressions
        })
    };

    let result = stress_concurrent_writes(store, config);
    done.store(true, Ordering::Release);
    let regressions = reader.join().expect("Reader thread panicked");
    (result, regressions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestStore;

    fn small() -> StressConfig {
        StressConfig {
            operations: 50,
            threads: 3,
            batch_size: 2,
            message_size: 16,
        }
    }

    #[test]
    fn sequential_writes_all_land() {
        let test_store = TestStore::new();
        let result = stress_sequential_writes(&test_store, &small());
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.rotations, 0);
        assert_eq!(test_store.count().unwrap(), 100);
    }

    #[test]
    fn concurrent_writes_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LogStore::open(dir.path().join("c.db"), 1 << 40).unwrap());

        let result = stress_concurrent_writes(Arc::clone(&store), &small());
        assert_eq!(result.successful_ops, 150);
        assert_eq!(store.count().unwrap(), 300);
        for t in 0..3 {
            let n = store.count_where(&format!("where channel = {t}")).unwrap();
            assert_eq!(n, 100);
        }
    }
}

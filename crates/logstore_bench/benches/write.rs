//! Write path benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use logstore_bench::{generate_records, temp_store, NO_ROTATION};
use logstore_core::StoreConfig;

/// Benchmark one record per transaction.
fn bench_single_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_write");

    for size in [64, 256, 1024].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let (_dir, store) = temp_store(NO_ROTATION);
            let template = generate_records(1, size, 1).remove(0);

            b.iter(|| {
                let mut record = template.clone();
                store.write(black_box(&mut record)).unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmark many records per transaction.
fn bench_batch_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_write");

    for batch_size in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                let (_dir, store) = temp_store(NO_ROTATION);
                let template = generate_records(batch_size, 256, 4);

                b.iter(|| {
                    let mut batch = template.clone();
                    store.write_batch(black_box(&mut batch)).unwrap();
                });
            },
        );
    }
    group.finish();
}

/// Benchmark commits without fsync.
fn bench_unsynced_write(c: &mut Criterion) {
    c.bench_function("unsynced_write", |b| {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::default()
            .max_file_size(NO_ROTATION)
            .sync_on_commit(false);
        let store = logstore_core::LogStore::open_with_config(dir.path().join("bench.db"), config)
            .unwrap();
        let template = generate_records(1, 256, 1).remove(0);

        b.iter(|| {
            let mut record = template.clone();
            store.write(black_box(&mut record)).unwrap();
        });
    });
}

/// Benchmark writes that keep crossing a small threshold.
fn bench_rotating_write(c: &mut Criterion) {
    c.bench_function("rotating_write", |b| {
        let (_dir, store) = temp_store(256 * 1024);
        let template = generate_records(50, 1024, 4);

        b.iter(|| {
            let mut batch = template.clone();
            store.write_batch(black_box(&mut batch)).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_single_write,
    bench_batch_write,
    bench_unsynced_write,
    bench_rotating_write
);
criterion_main!(benches);

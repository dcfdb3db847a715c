//! Query path benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logstore_bench::{generate_records, temp_store, NO_ROTATION};
use logstore_core::{Filter, RecordId};

fn populated(count: usize) -> (tempfile::TempDir, logstore_core::LogStore) {
    let (dir, store) = temp_store(NO_ROTATION);
    let mut batch = generate_records(count, 128, 8);
    store.write_batch(&mut batch).unwrap();
    (dir, store)
}

/// Benchmark counts with raw and bound filters.
fn bench_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("count");
    let (_dir, store) = populated(10_000);

    group.bench_function("all", |b| b.iter(|| store.count().unwrap()));
    group.bench_function("raw_filter", |b| {
        b.iter(|| store.count_where(black_box("where channel = 3")).unwrap())
    });
    group.bench_function("bound_filter", |b| {
        let filter = Filter::new().channel(3);
        b.iter(|| store.count_matching(black_box(&filter)).unwrap())
    });
    group.finish();
}

/// Benchmark point lookups.
fn bench_get_by_id(c: &mut Criterion) {
    let (_dir, store) = populated(10_000);
    let mut id = 0i64;

    c.bench_function("get_by_id", |b| {
        b.iter(|| {
            id = id % 10_000 + 1;
            store.get_by_id(black_box(RecordId::new(id))).unwrap()
        })
    });
}

/// Benchmark paged range reads.
fn bench_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");
    let (_dir, store) = populated(10_000);

    for limit in [10u32, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(limit), limit, |b, &limit| {
            b.iter(|| {
                store
                    .get_range(black_box("where channel = 1"), limit, 100)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_count, bench_get_by_id, bench_range);
criterion_main!(benches);

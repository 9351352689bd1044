//! Criterion harness: full benchmark runs (insert + bounded select) at
//! small workload sizes across worker counts.

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlite_pool_bench::config::BenchConfig;
use sqlite_pool_bench::runner::BenchmarkRunner;

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    for workers in [1usize, 2, 4] {
        group.bench_with_input(
            BenchmarkId::from_parameter(workers),
            &workers,
            |b, &workers| {
                b.iter(|| {
                    let dir = tempfile::tempdir().expect("tempdir");
                    let config = BenchConfig {
                        total_records: 2_000,
                        worker_count: workers,
                        deadline: Duration::from_secs(60),
                        commit_granularity: 500,
                        progress_interval: 500,
                        // Indexed lookups keep the select phase proportional
                        // to the workload rather than to full table scans.
                        with_index: true,
                        db_path: dir.path().join("bench.db"),
                        ..BenchConfig::default()
                    };
                    let result = BenchmarkRunner::new(config).run().expect("run");
                    assert_eq!(result.row_count, 2_000);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_full_run);
criterion_main!(benches);

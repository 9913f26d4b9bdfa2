//! Criterion benchmarks for the resample → rolling-return hot path.
//!
//! Benchmarks:
//! 1. Calendar resampling of a sparse multi-year, multi-symbol table
//! 2. Rolling-return derivation at a one-year horizon
//! 3. Distribution binning of the resulting return series

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use returnlab_core::domain::{RawRow, RawTable};
use returnlab_core::timeseries::{
    distribution, resample, rolling_returns, DistributionOptions,
};

/// Sparse table: trading-day-like cadence (5 rows, 2-day gap) over `years`
/// years for two symbols.
fn make_sparse_table(years: usize) -> RawTable {
    let base = chrono::NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    let mut rows = Vec::new();
    let mut offset = 0i64;
    while offset < (years * 365) as i64 {
        for d in 0..5 {
            let day = offset + d;
            let a = 100.0 + (day as f64 * 0.01).sin() * 10.0;
            let b = 50.0 + (day as f64 * 0.02).cos() * 5.0;
            rows.push(RawRow {
                date: Some(base + chrono::Duration::days(day)),
                values: [("A".to_string(), a), ("B".to_string(), b)]
                    .into_iter()
                    .collect(),
            });
        }
        offset += 7;
    }
    RawTable {
        columns: vec!["Date".to_string(), "A".to_string(), "B".to_string()],
        rows,
    }
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");
    for years in [1usize, 5, 20] {
        let table = make_sparse_table(years);
        group.bench_with_input(BenchmarkId::from_parameter(years), &table, |b, table| {
            b.iter(|| resample(black_box(table)).unwrap());
        });
    }
    group.finish();
}

fn bench_rolling_returns(c: &mut Criterion) {
    let dense = resample(&make_sparse_table(20)).unwrap();
    let observations = dense.observations();

    c.bench_function("rolling_returns_365d_20y", |b| {
        b.iter(|| rolling_returns(black_box(&observations), 365).unwrap());
    });
}

fn bench_distribution(c: &mut Criterion) {
    let dense = resample(&make_sparse_table(20)).unwrap();
    let returns = rolling_returns(&dense.observations(), 365).unwrap();

    c.bench_function("distribution_100_bins", |b| {
        b.iter(|| {
            distribution(
                black_box(&returns),
                &DistributionOptions {
                    cumulative: false,
                    thresholds: 100,
                },
            )
        });
    });
}

criterion_group!(
    benches,
    bench_resample,
    bench_rolling_returns,
    bench_distribution
);
criterion_main!(benches);

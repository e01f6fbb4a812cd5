//! Windowed lookup vs. a full linear scan over a synthetic `.scid` file.
//!
//! Run with: `cargo bench --package sierra-bench`

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sierra_bench::{TradeFixture, linear_count};
use sierra_lib::prelude::*;
use std::hint::black_box;

/// Record counts to benchmark.
const SIZES: [usize; 3] = [10_000, 100_000, 1_000_000];

fn window_benchmark(c: &mut Criterion) {
    let day = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
    let mut group = c.benchmark_group("window");
    group.sample_size(20);

    for len in SIZES {
        let fixture = TradeFixture::generate(day, len, 50_000).unwrap();
        let file = open_trade(fixture.path()).unwrap();
        // A 1% slice from the middle of the file.
        let start = fixture.timestamp_at_fraction(0.50);
        let end = fixture.timestamp_at_fraction(0.51);
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("lower_bound", len), &file, |b, file| {
            b.iter(|| {
                let count = file
                    .records_in_window(black_box(start), black_box(end))
                    .unwrap()
                    .count();
                black_box(count)
            });
        });

        group.bench_with_input(BenchmarkId::new("linear_scan", len), &file, |b, file| {
            b.iter(|| black_box(linear_count(file, black_box(start), black_box(end)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, window_benchmark);
criterion_main!(benches);

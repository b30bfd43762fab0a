//! Criterion benchmarks for MDL segmentation in `trajseg-core`.
//!
//! Benchmarks the span cost table, the full segment-count search and the
//! dissimilarity transform of a synthetic trip.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trajseg_config::PipelineConfig;
use trajseg_core::logging::LogContext;
use trajseg_core::segment::{SegmentCosts, Segmenter};
use trajseg_core::summary::RunReport;
use trajseg_core::trajectory::{TrajectoryPoint, Trip};
use trajseg_core::Pipeline;

/// Piecewise signal with a level change every `run` points.
fn stepped_signal(n: usize, run: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let level = (i / run) as f64;
            level + 0.05 * ((i * 7919) % 13) as f64
        })
        .collect()
}

fn synthetic_trip(n: usize) -> Trip {
    Trip {
        id: "bench".into(),
        points: (0..n)
            .map(|i| TrajectoryPoint {
                time_step: i as i64,
                speed: 20.0 + ((i / 25) % 4) as f64 * 8.0 + (i % 3) as f64,
                acceleration: [-0.5, 0.0, 0.5, 1.0][i % 4],
                heading: ((i / 40) * 90 % 360) as f64,
                latitude: 41.1,
                longitude: -8.6,
            })
            .collect(),
    }
}

fn bench_segment_costs(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment/costs");

    for n in [50usize, 200, 500] {
        let signal = stepped_signal(n, 40);
        group.bench_with_input(BenchmarkId::new("points", n), &signal, |b, s| {
            b.iter(|| black_box(SegmentCosts::new(black_box(s))))
        });
    }

    group.finish();
}

fn bench_segmenter(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment/search");

    // Short trip: every candidate count fits
    let short = stepped_signal(60, 15);
    group.bench_with_input(BenchmarkId::new("points", 60), &short, |b, s| {
        let segmenter = Segmenter::new(50);
        b.iter(|| black_box(segmenter.segment(black_box(s)).segment_count()))
    });

    // Long trip: capped by max_segments
    let long = stepped_signal(400, 50);
    group.bench_with_input(BenchmarkId::new("points", 400), &long, |b, s| {
        let segmenter = Segmenter::new(20);
        b.iter(|| black_box(segmenter.segment(black_box(s)).segment_count()))
    });

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let pipeline = Pipeline::new(PipelineConfig::default(), LogContext::new("run-bench"));
    let trips = vec![synthetic_trip(300)];
    let mut report = RunReport::new();
    let Ok(built) = pipeline.build_graph(&trips, &mut report) else {
        return;
    };

    c.bench_function("transform/trip_300", |b| {
        b.iter(|| {
            let mut report = RunReport::new();
            let signals = pipeline
                .transform(black_box(&trips), &built.graph, &built.interner, &mut report)
                .map(|s| s.len())
                .unwrap_or(0);
            black_box(signals)
        })
    });
}

criterion_group!(benches, bench_segment_costs, bench_segmenter, bench_transform);
criterion_main!(benches);

//! Criterion benchmarks for the gesture recognition hot path
//!
//! Covers: normalization, arc-length resampling, and full recognition
//! against template sets of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use aircut_server::gesture::{normalize, resample, GestureMatcher, Point, Template};

fn generate_circle_points(count: usize) -> Vec<Point> {
    (0..count)
        .map(|i| {
            let angle = (i as f64 / count as f64) * std::f64::consts::TAU;
            Point::new(200.0 + 80.0 * angle.cos(), 150.0 + 80.0 * angle.sin())
        })
        .collect()
}

fn generate_zigzag_points(count: usize) -> Vec<Point> {
    (0..count)
        .map(|i| {
            let y = if i % 2 == 0 { 0.0 } else { 40.0 };
            Point::new(i as f64 * 5.0, y)
        })
        .collect()
}

fn template_set(size: usize) -> Vec<Template> {
    (0..size)
        .map(|i| {
            let raw = if i % 2 == 0 {
                generate_circle_points(30 + i)
            } else {
                generate_zigzag_points(10 + i)
            };
            Template::new(format!("t{}", i), format!("gesture-{}", i), &raw)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Trajectory benchmarks
// ---------------------------------------------------------------------------

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for count in [50, 200, 1000] {
        let circle = generate_circle_points(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &circle, |b, points| {
            b.iter(|| black_box(normalize(black_box(points))));
        });
    }
    group.finish();
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");
    for count in [50, 200, 1000] {
        let zigzag = generate_zigzag_points(count);
        group.bench_with_input(BenchmarkId::new("zigzag", count), &zigzag, |b, points| {
            b.iter(|| black_box(resample(black_box(points), 50)));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Recognition benchmarks
// ---------------------------------------------------------------------------

fn bench_recognize(c: &mut Criterion) {
    let matcher = GestureMatcher::new();
    let drawn = generate_circle_points(120);

    let mut group = c.benchmark_group("recognize");
    for size in [1, 10, 50] {
        let templates = template_set(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &templates, |b, templates| {
            b.iter(|| black_box(matcher.recognize(black_box(&drawn), templates, 0.85)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_resample, bench_recognize);
criterion_main!(benches);

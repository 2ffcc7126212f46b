//! Benchmark for Poisson disk sampling and triangulation.
//!
//! Run with: cargo bench --package isleforge_procgen --bench sampling_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use isleforge_procgen::{Bounds, PointSampler, Triangulation, WorldSeed};

fn benchmark_poisson_sampling(c: &mut Criterion) {
    let bounds = Bounds::new(0.0, 0.0, 500.0, 500.0);
    let mut group = c.benchmark_group("poisson_sampling");

    for spacing in [20.0, 10.0, 5.0] {
        group.bench_with_input(BenchmarkId::from_parameter(spacing), &spacing, |b, &spacing| {
            let sampler = PointSampler::new(spacing);
            b.iter(|| black_box(sampler.generate(black_box(&bounds), WorldSeed::new(42))));
        });
    }

    group.finish();
}

fn benchmark_triangulation(c: &mut Criterion) {
    let bounds = Bounds::new(0.0, 0.0, 500.0, 500.0);
    let points = PointSampler::new(5.0).generate(&bounds, WorldSeed::new(42));

    let mut group = c.benchmark_group("delaunay");
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("sampled_sites", |b| {
        b.iter(|| black_box(Triangulation::new(black_box(&points))));
    });
    group.finish();
}

criterion_group!(benches, benchmark_poisson_sampling, benchmark_triangulation);
criterion_main!(benches);

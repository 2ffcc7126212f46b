//! Benchmark for a full island generation run.
//!
//! TARGET: 200x200 island at spacing 5 in well under a second
//!
//! Run with: cargo bench --package isleforge_procgen --bench pipeline_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use isleforge_procgen::{
    Bounds, EntitySpawner, GenerationConfig, IslandGenerator, NeighborStrategy, Point2,
};

/// Spawner that accepts everything and keeps nothing.
struct NullSpawner;

impl EntitySpawner for NullSpawner {
    type Handle = ();

    fn create_entity_at(&mut self, _kind: &str, _position: Point2) -> Option<()> {
        Some(())
    }
}

fn config(strategy: NeighborStrategy) -> GenerationConfig {
    GenerationConfig {
        bounds: Bounds::new(0.0, 0.0, 200.0, 200.0),
        min_distance: 5.0,
        neighbor_strategy: strategy,
        ..GenerationConfig::default()
    }
}

fn benchmark_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("island_pipeline");
    group.sample_size(20);

    for (name, strategy) in [
        ("radius", NeighborStrategy::Radius),
        ("mesh_adjacency", NeighborStrategy::MeshAdjacency),
    ] {
        let Ok(generator) = IslandGenerator::new(config(strategy)) else {
            continue;
        };
        group.bench_function(name, |b| {
            b.iter(|| black_box(generator.generate(&mut NullSpawner)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_full_pipeline);
criterion_main!(benches);

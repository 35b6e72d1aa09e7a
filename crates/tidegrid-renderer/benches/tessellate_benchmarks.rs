//! Tessellation Benchmarks
//!
//! Cost of building grid tiles and of serving cached mesh lists

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tidegrid_renderer::{GroupTier, QualityLevel, Tessellator, ViewportMeshCache};

fn bench_tessellate(c: &mut Criterion) {
    let mut group = c.benchmark_group("tessellate_1920x1080");
    let tessellator = Tessellator::default();

    for quality in [QualityLevel::Low, QualityLevel::Medium, QualityLevel::High] {
        group.bench_with_input(BenchmarkId::from_parameter(quality), &quality, |b, &quality| {
            b.iter(|| {
                black_box(
                    tessellator
                        .tessellate(1920, 1080, quality, GroupTier::Medium)
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_cache_hit(c: &mut Criterion) {
    let mut cache = ViewportMeshCache::default();
    cache.get_meshes(1920, 1080, QualityLevel::High, GroupTier::Single);

    c.bench_function("cache_hit", |b| {
        b.iter(|| {
            black_box(cache.get_meshes(1920, 1080, QualityLevel::High, GroupTier::Single).len())
        });
    });
}

fn bench_resolution_flip(c: &mut Criterion) {
    let mut cache = ViewportMeshCache::default();
    let mut wide = false;

    c.bench_function("resolution_flip", |b| {
        b.iter(|| {
            wide = !wide;
            let width = if wide { 1280 } else { 1024 };
            black_box(cache.get_meshes(width, 720, QualityLevel::Medium, GroupTier::Single).len())
        });
    });
}

criterion_group!(benches, bench_tessellate, bench_cache_hit, bench_resolution_flip);
criterion_main!(benches);

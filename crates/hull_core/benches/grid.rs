//! Hull grid benchmarks for hull_core.
//!
//! Run with: `cargo bench -p hull_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hull_core::prelude::*;
use hull_test_utils::fixtures::{block_hull, fixed, vec2};

/// Point, radial and ray queries on a 32x16 hull.
pub fn query_benchmark(c: &mut Criterion) {
    let hull = block_hull(32, 16, Vec2Fixed::ZERO);

    c.bench_function("hit_test_single", |b| {
        b.iter(|| hull.hit_test_single(black_box(vec2(37, -21)), black_box(fixed(6)), true));
    });

    c.bench_function("find_closest_unshielded_from_center", |b| {
        b.iter(|| hull.find_closest_unshielded_module(black_box(Vec2Fixed::ZERO)));
    });

    c.bench_function("ray_hit_test_single", |b| {
        b.iter(|| {
            hull.ray_hit_test_single(
                black_box(vec2(-600, -300)),
                black_box(vec2(40, 20)),
                Fixed::ZERO,
                true,
            )
        });
    });

    c.bench_function("ray_hit_test_modules", |b| {
        b.iter(|| hull.ray_hit_test_modules(black_box(vec2(-300, 4)), vec2(1, 0), fixed(600), fixed(4)));
    });
}

/// Radial damage including exposure updates for destroyed modules.
pub fn damage_benchmark(c: &mut Criterion) {
    let hull = block_hull(32, 16, Vec2Fixed::ZERO);

    c.bench_function("damage_modules_in_range", |b| {
        b.iter_batched(
            || hull.clone(),
            |mut hull| hull.damage_modules_in_range(1, fixed(900), black_box(vec2(10, 10)), fixed(40), false),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("build_hull", |b| {
        let modules = hull.modules().to_vec();
        b.iter(|| ShipHull::new(black_box(modules.clone()), ShipTransform::default()));
    });
}

criterion_group!(benches, query_benchmark, damage_benchmark);
criterion_main!(benches);

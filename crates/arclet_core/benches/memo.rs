//! Memoization overhead: cache hits against recomputing the geometry

use arclet_core::memo::{memoize, LruMemoCache, MemberKind, Memoize};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::f64::consts::PI;

fn circumference(diameter: f64, stroke_width: f64) -> f64 {
    2.0 * PI * (diameter - stroke_width) / 2.0
}

fn bench_memo(c: &mut Criterion) {
    let mut group = c.benchmark_group("memo");

    group.bench_function("direct", |b| {
        b.iter(|| circumference(black_box(18.0), black_box(2.0)))
    });

    let cached = memoize(|(d, sw): (f64, f64)| circumference(d, sw));
    group.bench_function("hash_hit", |b| {
        b.iter(|| cached.call((black_box(18.0), black_box(2.0))))
    });

    let lru = Memoize::<(f64, f64), f64>::options()
        .cache_with(|| Box::new(LruMemoCache::with_capacity(4)))
        .decorate(MemberKind::Method, |(d, sw): (f64, f64)| circumference(d, sw))
        .expect("methods accept arguments");
    group.bench_function("lru_hit", |b| {
        b.iter(|| lru.call((black_box(18.0), black_box(2.0))))
    });

    let mut diameter = 0.0;
    group.bench_function("hash_miss", |b| {
        b.iter(|| {
            diameter += 1.0;
            cached.call((diameter, 2.0))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_memo);
criterion_main!(benches);

//! Criterion benchmarks for the lazy composition primitives.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ranked_belief_rs::{Rank, Ranking};

fn rank(n: u64) -> Rank {
    Rank::from_value(n).unwrap()
}

fn bench_map_take(c: &mut Criterion) {
    c.bench_function("map_take_1k_of_infinite", |b| {
        b.iter(|| {
            let naturals = Ranking::from_generator(|i| Some((i as u64, rank(i as u64))), 0);
            let mapped = naturals.map(|n| n.wrapping_mul(2_654_435_761));
            black_box(mapped.take_n(1_000).unwrap())
        });
    });
}

fn bench_merge(c: &mut Criterion) {
    c.bench_function("merge_two_1k_sequences", |b| {
        let evens = Ranking::from_generator(|i| Some((2 * i as u64, rank(i as u64))), 0);
        let odds = Ranking::from_generator(|i| Some((2 * i as u64 + 1, rank(i as u64))), 0);
        b.iter(|| {
            let merged = evens.merge(&odds);
            black_box(merged.take_n(1_000).unwrap())
        });
    });
}

fn bench_merge_apply(c: &mut Criterion) {
    c.bench_function("bind_32x32_pair_grid", |b| {
        let outer = Ranking::from_values_uniform((0_u64..32).collect(), Rank::ZERO);
        b.iter(|| {
            let grid = outer.merge_apply(|a| {
                let a = *a;
                Ranking::from_values_uniform((0_u64..32).collect(), Rank::ZERO)
                    .map(move |inner| a * 32 + inner)
            });
            black_box(grid.with_dedup(false).take_n(32 * 32).unwrap())
        });
    });
}

fn bench_observe(c: &mut Criterion) {
    c.bench_function("observe_sparse_predicate", |b| {
        let naturals = Ranking::from_generator(|i| Some((i as u64, rank(i as u64))), 0);
        b.iter(|| {
            let observed = naturals.observe(|n| n % 97 == 0);
            black_box(observed.take_n(64).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_map_take,
    bench_merge,
    bench_merge_apply,
    bench_observe
);
criterion_main!(benches);

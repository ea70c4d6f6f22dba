//! Criterion micro-benchmarks for arena allocation and reset.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use sluice_arena::{Arena, ArenaConfig, ArenaPool};

fn bench_alloc_reset(c: &mut Criterion) {
    let mut arena = Arena::new(64 * 1024);
    c.bench_function("arena_alloc_i64_then_reset", |b| {
        b.iter(|| {
            let slot = arena.alloc(black_box(42i64)).unwrap();
            black_box(arena.get(slot).unwrap());
            arena.reset();
        });
    });
}

fn bench_alloc_bytes(c: &mut Criterion) {
    let mut arena = Arena::new(64 * 1024 * 1024);
    c.bench_function("arena_alloc_4k_bytes", |b| {
        b.iter(|| {
            if arena.remaining() < 8192 {
                arena.reset();
            }
            black_box(arena.alloc_bytes(4096, 64).unwrap().len());
        });
    });
}

fn bench_pool_cycle(c: &mut Criterion) {
    let pool = ArenaPool::new(&ArenaConfig::default()).unwrap();
    pool.release(pool.acquire());
    c.bench_function("pool_acquire_release_64mb", |b| {
        b.iter(|| {
            let arena = pool.acquire();
            pool.release(black_box(arena));
        });
    });
}

criterion_group!(benches, bench_alloc_reset, bench_alloc_bytes, bench_pool_cycle);
criterion_main!(benches);

//! # Cast Resolution Benchmark
//!
//! Measures the pure parts of a cast (rate derivation, the three-stage
//! resolve, tier selection) and one full cast over the in-memory store.
//!
//! Run with: `cargo bench --package fishy_economy`

// Benchmarks don't need strict docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use fishy_economy::{
    resolve, select_tier, CastRates, Catalog, Dice, EngineConfig, FishingService,
};
use fishy_store::{ManualClock, MemoryStore};

fn bench_resolve(c: &mut Criterion) {
    let dice = Dice::seeded(1);
    let rates = CastRates::derive(100, 3, 2);

    c.bench_function("derive_rates", |b| {
        b.iter(|| black_box(CastRates::derive(black_box(87), 3, 2)));
    });
    c.bench_function("resolve_cast_outcome", |b| {
        b.iter(|| black_box(resolve(&dice, &rates)));
    });
}

fn bench_select_tier(c: &mut Criterion) {
    let dice = Dice::seeded(2);
    let mut group = c.benchmark_group("select_tier");

    for max in [1u8, 3, 5] {
        group.bench_with_input(BenchmarkId::from_parameter(max), &max, |b, &max| {
            b.iter(|| black_box(select_tier(&dice, max)));
        });
    }
    group.finish();
}

fn bench_full_cast(c: &mut Criterion) {
    let clock = ManualClock::default();
    let store = Arc::new(MemoryStore::with_clock(Arc::new(clock.clone())));
    let catalog = Catalog::load(concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/catalog.toml"))
        .expect("shipped catalog loads");
    let config = EngineConfig::default();
    let cooldown = config.cast_cooldown;
    let service = FishingService::new(
        store,
        Arc::new(catalog),
        config,
        Arc::new(Dice::seeded(3)),
        Arc::new(clock.clone()),
    )
    .expect("service starts");

    service.buy_item("bench", "rod", 3, &[3]).expect("rod");
    service.buy_item("bench", "hook", 3, &[3]).expect("hook");
    service.buy_item("bench", "vehicle", 4, &[4]).expect("vehicle");
    service.buy_item("bench", "baitbox", 4, &[4]).expect("baitbox");

    c.bench_function("full_cast", |b| {
        b.iter(|| {
            clock.advance(cooldown);
            if service.bait_inventory("bench").map_or(0, |bait| bait.tier(1)) < 1 {
                let _ = service.add_bait("bench", 1, 100);
            }
            if let Ok(fishy_economy::CastResult::InventoryFull { .. }) =
                black_box(service.resolve_cast("bench", "guild"))
            {
                let _ = service.sell_inventory("bench");
            }
        });
    });
    let _ = service.flush_tasks();
}

criterion_group!(benches, bench_resolve, bench_select_tier, bench_full_cast);
criterion_main!(benches);

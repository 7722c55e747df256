//! Benchmarks for the simulation tick.
//!
//! Runs the bundled skirmish: scripted thinking, weapons and projectiles
//! for a handful of actors.

#![allow(missing_docs)]

use std::hint::black_box;
use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};
use wingman::Scenario;

fn load_skirmish() -> Scenario {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/skirmish.json");
    Scenario::load(Path::new(path)).unwrap_or_else(|e| panic!("failed to load {path}: {e}"))
}

fn bench_build(c: &mut Criterion) {
    let scenario = load_skirmish();

    c.bench_function("skirmish_build", |b| {
        b.iter(|| {
            let sim = scenario.build_with_seed(black_box(42));
            black_box(sim.is_ok())
        });
    });
}

fn bench_ticks(c: &mut Criterion) {
    let scenario = load_skirmish();

    c.bench_function("skirmish_600_ticks", |b| {
        b.iter(|| {
            let Ok(mut sim) = scenario.build_with_seed(black_box(42)) else {
                return;
            };
            black_box(sim.run(black_box(600)));
        });
    });
}

fn bench_single_tick(c: &mut Criterion) {
    let scenario = load_skirmish();
    let Ok(mut sim) = scenario.build_with_seed(7) else {
        return;
    };
    // Let the fight start before measuring.
    sim.run(300);

    c.bench_function("skirmish_single_tick", |b| {
        b.iter(|| {
            sim.tick();
            black_box(sim.ticks())
        });
    });
}

criterion_group!(benches, bench_build, bench_ticks, bench_single_tick);
criterion_main!(benches);

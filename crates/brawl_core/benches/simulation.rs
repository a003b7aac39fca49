//! Simulation benchmarks for brawl_core.
//!
//! Run with: `cargo bench -p brawl_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use brawl_core::input::{InputEvent, Intent};
use brawl_core::math::Fixed;
use brawl_test_utils::fixtures::{Duel, CLOSE};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn exchange_inputs(duel: &Duel, tick: u64) -> Vec<InputEvent> {
    match tick % 60 {
        0 => vec![InputEvent::new(duel.left, Intent::LightAttack)],
        5 => vec![InputEvent::new(duel.right, Intent::Block(true))],
        20 => vec![InputEvent::new(duel.right, Intent::Block(false))],
        24 => vec![
            InputEvent::new(duel.right, Intent::Special(1)),
            InputEvent::new(duel.left, Intent::Move(-Fixed::ONE)),
        ],
        40 => vec![
            InputEvent::new(duel.left, Intent::Move(Fixed::ZERO)),
            InputEvent::new(duel.left, Intent::HeavyAttack),
        ],
        _ => Vec::new(),
    }
}

/// A full scripted exchange of 600 ticks (ten seconds).
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("duel_exchange_600_ticks", |b| {
        b.iter(|| {
            let mut duel = Duel::new(CLOSE);
            for tick in 0..600 {
                let inputs = exchange_inputs(&duel, tick);
                black_box(duel.sim.tick(&inputs));
            }
            duel.sim.state_hash()
        })
    });

    c.bench_function("state_hash", |b| {
        let duel = Duel::new(CLOSE);
        b.iter(|| black_box(duel.sim.state_hash()))
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);

//! Simulation benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skirmish_core::combat::battle_step;
use skirmish_core::components::{Owner, Unit, UnitKind};
use skirmish_core::math::{Bounds, Position};
use skirmish_core::roster::Roster;

/// Two blocks of `per_side` soldiers facing each other across the field.
fn crowded_roster(per_side: i32) -> Roster {
    let columns = 10;
    (0..per_side * 2)
        .filter_map(|i| {
            let (owner, row_base) = if i < per_side {
                (Owner::Blue, 40)
            } else {
                (Owner::Red, 300)
            };
            let slot = i % per_side;
            let position = Position::new(100 + (slot % columns) * 8, row_base + (slot / columns) * 8);
            Unit::new(0, UnitKind::Soldier, owner, position).ok()
        })
        .collect()
}

/// Benchmarks one battle tick over crowded rosters.
pub fn battle_step_benchmark(c: &mut Criterion) {
    let bounds = Bounds::square(400);
    let mut group = c.benchmark_group("battle_step");

    for per_side in [10, 50, 100] {
        let roster = crowded_roster(per_side);
        group.bench_with_input(BenchmarkId::from_parameter(per_side), &roster, |b, roster| {
            b.iter(|| {
                let mut roster = roster.clone();
                let mut now = Duration::ZERO;
                for _ in 0..10 {
                    now += Duration::from_millis(40);
                    black_box(battle_step(&mut roster, &bounds, now));
                }
                roster
            });
        });
    }

    group.finish();
}

criterion_group!(benches, battle_step_benchmark);
criterion_main!(benches);

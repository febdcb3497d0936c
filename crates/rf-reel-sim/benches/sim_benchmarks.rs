//! Engine and Statistics Benchmarks
//!
//! Line evaluation, cascade spins, exhaustive enumeration and Monte Carlo
//! throughput per worker count.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rf_reel_sim::{SimulationConfig, enumerate, simulate};
use rf_reels::{CascadeEngine, GameConfig, Line, SeededEntropy, StageTrace, Symbol, evaluate};

const PRESETS: &[&str] = &["classic", "cascade", "scatter_boost"];

/// Evaluate every possible line once per iteration
fn bench_evaluate(c: &mut Criterion) {
    let game = GameConfig::cascade().build().unwrap();
    let lines: Vec<Line> = Symbol::ALL
        .into_iter()
        .flat_map(|a| {
            Symbol::ALL.into_iter().flat_map(move |b| {
                Symbol::ALL
                    .into_iter()
                    .map(move |third| Line::new([a, b, third]))
            })
        })
        .collect();

    let mut group = c.benchmark_group("evaluate");
    group.throughput(Throughput::Elements(lines.len() as u64));
    group.bench_function("all_lines", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(evaluate(black_box(line), game.paytable()));
            }
        })
    });
    group.finish();
}

/// Single cascade spin, no trace
fn bench_cascade_spin(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade_spin");

    for &name in PRESETS {
        let Some(config) = GameConfig::preset(name) else {
            continue;
        };
        let game = config.build().unwrap();
        let engine = CascadeEngine::new(&game);
        let mut entropy = SeededEntropy::new(7);
        let mut trace = StageTrace::disabled();

        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| black_box(engine.run(10.0, 1, &mut entropy, &mut trace).unwrap()))
        });
    }

    group.finish();
}

fn bench_enumerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate");

    for &name in PRESETS {
        let Some(config) = GameConfig::preset(name) else {
            continue;
        };
        let game = config.build().unwrap();
        group.throughput(Throughput::Elements(game.total_combinations()));
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| black_box(enumerate(&game)))
        });
    }

    group.finish();
}

/// Monte Carlo throughput per worker count
fn bench_monte_carlo(c: &mut Criterion) {
    let game = GameConfig::cascade().build().unwrap();
    let trials = 100_000;

    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(10);
    group.throughput(Throughput::Elements(trials));

    for threads in [1, 2, 4, num_cpus::get()] {
        let config = SimulationConfig::default()
            .with_trials(trials)
            .with_seed(1)
            .with_threads(threads);
        group.bench_with_input(BenchmarkId::new("threads", threads), &config, |b, config| {
            b.iter(|| black_box(simulate(Arc::clone(&game), config.clone()).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_evaluate,
    bench_cascade_spin,
    bench_enumerate,
    bench_monte_carlo
);
criterion_main!(benches);

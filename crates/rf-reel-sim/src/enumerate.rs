//! Exhaustive enumeration of base-line outcomes
//!
//! Walks the full Cartesian product of strip positions without cascading.
//! Work is split over the first reel's positions; partial counts are
//! collected in position order and summed sequentially, so the report is
//! bit-identical for any worker count.

use std::collections::BTreeMap;

use rayon::prelude::*;
use rf_reels::{Game, Line, SCATTER_TRIGGER, Symbol, evaluate_with, scatter_count};

use crate::report::{EnumerationReport, one_in, percent};

#[derive(Debug, Default)]
struct Partial {
    total: u64,
    winning: u64,
    scatter: u64,
    pay_units: f64,
    symbol_wins: BTreeMap<Symbol, u64>,
}

impl Partial {
    fn merge(mut self, other: Partial) -> Self {
        self.total += other.total;
        self.winning += other.winning;
        self.scatter += other.scatter;
        self.pay_units += other.pay_units;
        for (symbol, count) in other.symbol_wins {
            *self.symbol_wins.entry(symbol).or_default() += count;
        }
        self
    }
}

fn enumerate_from(game: &Game, first: Symbol) -> Partial {
    let paytable = game.paytable();
    let mode = game.evaluator();
    let [_, second, third] = game.strips();
    let mut partial = Partial::default();

    for &s2 in second.symbols() {
        for &s3 in third.symbols() {
            let line = Line::new([first, s2, s3]);
            partial.total += 1;

            let wins = evaluate_with(mode, &line, paytable);
            if !wins.is_empty() {
                partial.winning += 1;
            }
            for win in &wins {
                partial.pay_units += paytable.multiplier(win.symbol);
                *partial.symbol_wins.entry(win.symbol).or_default() += 1;
            }
            if scatter_count(&line, paytable) >= SCATTER_TRIGGER {
                partial.scatter += 1;
            }
        }
    }
    partial
}

/// Exact hit frequency, scatter frequency and base return.
///
/// Runs on the current rayon pool.
pub fn enumerate(game: &Game) -> EnumerationReport {
    let partials: Vec<Partial> = game.strips()[0]
        .symbols()
        .par_iter()
        .map(|&first| enumerate_from(game, first))
        .collect();

    let totals = partials
        .into_iter()
        .fold(Partial::default(), Partial::merge);

    let base_return = if totals.total == 0 {
        0.0
    } else {
        totals.pay_units / totals.total as f64 / game.reference_unit() * 100.0
    };

    let report = EnumerationReport {
        game: game.name().to_string(),
        total_combinations: totals.total,
        winning_combinations: totals.winning,
        scatter_combinations: totals.scatter,
        hit_frequency: percent(totals.winning, totals.total),
        scatter_frequency: one_in(totals.total, totals.scatter),
        base_return,
        symbol_wins: totals.symbol_wins,
    };

    log::info!(
        "Enumerated {} combinations for '{}': hit frequency {:.2}%",
        report.total_combinations,
        report.game,
        report.hit_frequency
    );
    report
}

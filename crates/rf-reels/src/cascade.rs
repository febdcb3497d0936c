//! Cascade engine: evaluate → pay → redraw winning positions → re-evaluate
//!
//! Steps are strictly sequential. Each redraw depends on the previous step's
//! winning positions. The multiplier rises by one for every re-evaluation
//! that still wins.

use serde::{Deserialize, Serialize};

use crate::config::Game;
use crate::error::{SpinError, SpinResult};
use crate::evaluator::{WinEntry, evaluate_with, scatter_count, winning_positions};
use crate::generator::{draw, draw_line};
use crate::rng::Entropy;
use crate::stage::{Stage, StageTrace};
use crate::symbols::Line;

/// One paying step of a cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeStep {
    /// 0 for the initial evaluation
    pub index: u32,
    /// Line as evaluated at this step
    pub line: Line,
    pub wins: Vec<WinEntry>,
    /// Multiplier applied to this step's payout
    pub multiplier: u32,
    pub payout: f64,
}

/// Fully resolved cascade for one spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    pub initial_line: Line,
    pub final_line: Line,
    pub steps: Vec<CascadeStep>,
    /// Multiplier in effect when the loop ended
    pub final_multiplier: u32,
    pub total_payout: f64,
    /// Scatters on the final line only
    pub scatter_count: usize,
}

impl CascadeOutcome {
    pub fn is_win(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Number of redraws that produced another win
    pub fn depth(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Multipliers applied, in step order
    pub fn multipliers(&self) -> Vec<u32> {
        self.steps.iter().map(|s| s.multiplier).collect()
    }
}

/// Drives the cascade loop for one spin
pub struct CascadeEngine<'a> {
    game: &'a Game,
}

impl<'a> CascadeEngine<'a> {
    pub fn new(game: &'a Game) -> Self {
        Self { game }
    }

    /// Draw an initial line and resolve it
    pub fn run<E: Entropy + ?Sized>(
        &self,
        bet: f64,
        start_multiplier: u32,
        entropy: &mut E,
        trace: &mut StageTrace,
    ) -> SpinResult<CascadeOutcome> {
        let line = draw_line(self.game.strips(), entropy);
        trace.push(Stage::ReelsSettled { line });
        self.run_from(line, bet, start_multiplier, entropy, trace)
    }

    /// Resolve a given initial line.
    ///
    /// Fails with [`SpinError::CascadeDepthExceeded`] when a win would need
    /// more than `max_depth` paying steps.
    pub fn run_from<E: Entropy + ?Sized>(
        &self,
        initial_line: Line,
        bet: f64,
        start_multiplier: u32,
        entropy: &mut E,
        trace: &mut StageTrace,
    ) -> SpinResult<CascadeOutcome> {
        let paytable = self.game.paytable();
        let rules = self.game.cascade();
        let mode = self.game.evaluator();
        let reference_unit = self.game.reference_unit();

        let mut line = initial_line;
        let mut multiplier = start_multiplier.max(1);
        let mut steps: Vec<CascadeStep> = Vec::new();
        let mut total_payout = 0.0;
        let mut wins = evaluate_with(mode, &line, paytable);

        while !wins.is_empty() {
            if steps.len() >= rules.max_depth as usize {
                log::error!(
                    "Cascade exceeded {} steps (line {}, multiplier x{})",
                    rules.max_depth,
                    line,
                    multiplier
                );
                return Err(SpinError::CascadeDepthExceeded {
                    max_depth: rules.max_depth,
                });
            }

            let payout: f64 = wins
                .iter()
                .map(|w| paytable.payout(w.symbol, bet, reference_unit, multiplier))
                .sum();
            total_payout += payout;

            let positions = winning_positions(&wins);
            let index = steps.len() as u32;
            log::debug!(
                "Cascade step {index}: {line} x{multiplier} pays {payout:.2} at {positions:?}"
            );
            trace.push(Stage::WinHighlighted {
                step: index,
                symbols: wins.iter().map(|w| w.symbol).collect(),
                positions: positions.clone(),
                multiplier,
                payout,
            });
            steps.push(CascadeStep {
                index,
                line,
                wins,
                multiplier,
                payout,
            });

            if !rules.enabled {
                break;
            }

            let strips = self.game.strips();
            let mut replacements = Vec::with_capacity(positions.len());
            for &position in &positions {
                let symbol = draw(&strips[position], entropy);
                line.replace(position, symbol);
                replacements.push(symbol);
            }
            trace.push(Stage::SymbolsReplaced {
                positions,
                symbols: replacements,
                line,
            });

            wins = evaluate_with(mode, &line, paytable);
            if !wins.is_empty() {
                multiplier = multiplier.saturating_add(1);
                trace.push(Stage::MultiplierRaised { value: multiplier });
            }
        }

        Ok(CascadeOutcome {
            initial_line,
            final_line: line,
            steps,
            final_multiplier: multiplier,
            total_payout,
            scatter_count: scatter_count(&line, paytable),
        })
    }
}

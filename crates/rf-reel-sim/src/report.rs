//! Statistics reports: plain text log lines and JSON

use std::collections::BTreeMap;
use std::fmt;

use rf_reels::Symbol;
use serde::{Deserialize, Serialize};

/// "1 in N spins", or `None` when the event never happens
pub(crate) fn one_in(total: u64, hits: u64) -> Option<f64> {
    (hits > 0).then(|| total as f64 / hits as f64)
}

pub(crate) fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn write_one_in(f: &mut fmt::Formatter<'_>, frequency: Option<f64>) -> fmt::Result {
    match frequency {
        Some(n) => writeln!(f, "1 in {n:.0} spins"),
        None => writeln!(f, "never"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Exact base-line statistics over every strip combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumerationReport {
    pub game: String,
    pub total_combinations: u64,
    pub winning_combinations: u64,
    pub scatter_combinations: u64,
    /// Winning combinations / total × 100
    pub hit_frequency: f64,
    /// Total / scatter combinations
    pub scatter_frequency: Option<f64>,
    /// Multiplier-1 base return, percent of the bet
    pub base_return: f64,
    /// Win entries per paying symbol
    pub symbol_wins: BTreeMap<Symbol, u64>,
}

impl EnumerationReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }
}

impl fmt::Display for EnumerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Combinations: {}", self.total_combinations)?;
        writeln!(f, "Winning Combinations: {}", self.winning_combinations)?;
        writeln!(f, "Hit Frequency: {:.2}%", self.hit_frequency)?;
        writeln!(f, "Base Game Return: {:.2}%", self.base_return)?;

        writeln!(f)?;
        writeln!(f, "--- Scatter Trigger ---")?;
        write_one_in(f, self.scatter_frequency)?;

        if !self.symbol_wins.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Wins by Symbol ---")?;
            for (symbol, count) in &self.symbol_wins {
                writeln!(f, "{symbol}: {count}")?;
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MONTE CARLO
// ═══════════════════════════════════════════════════════════════════════════════

/// Aggregate Monte Carlo result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub game: String,
    pub seed: u64,
    /// Paid spins
    pub trials: u64,
    pub bet: f64,
    pub total_bet: f64,
    pub total_won: f64,
    /// Total won / total bet × 100
    pub rtp: f64,
    /// Paid spins whose initial line won, percent
    pub base_hit_frequency: f64,
    pub scatter_triggers: u64,
    /// Paid spins per scatter trigger on the final line
    pub scatter_frequency: Option<f64>,
    /// Most winning redraws seen in one spin
    pub max_cascade_depth: usize,
    pub with_bonus: bool,
    /// Unwagered spins played inside the bonus
    pub free_spins: u64,
    /// Winnings from free spins
    pub bonus_won: f64,
}

impl SimulationResult {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulated {} spins.", self.trials)?;
        writeln!(f, "Total Bet: {}", self.total_bet)?;
        writeln!(f, "Total Won: {:.2}", self.total_won)?;
        writeln!(f, "Return to Player (RTP): {:.2}%", self.rtp)?;
        writeln!(f, "Base Hit Frequency: {:.2}%", self.base_hit_frequency)?;
        writeln!(f, "Deepest Cascade: {}", self.max_cascade_depth)?;

        writeln!(f)?;
        writeln!(f, "--- Scatter Trigger ---")?;
        write_one_in(f, self.scatter_frequency)?;

        if self.with_bonus {
            writeln!(f)?;
            writeln!(f, "--- Free Spins ---")?;
            writeln!(f, "Free Spins Played: {}", self.free_spins)?;
            writeln!(f, "Bonus Won: {:.2}", self.bonus_won)?;
        }
        Ok(())
    }
}

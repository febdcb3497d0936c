//! Win evaluation over a three-position line
//!
//! Two evaluators:
//!
//! - [`evaluate`]: multi-entry, used with cascades. Every symbol that fills
//!   the line together with wilds produces its own [`WinEntry`].
//! - [`evaluate_single`]: single-winner, for non-cascading games only. It
//!   cannot represent simultaneous win groups.

use serde::{Deserialize, Serialize};

use crate::config::EvaluatorMode;
use crate::paytable::PayTable;
use crate::symbols::{Line, REEL_COUNT, Symbol};

/// One matched group on a line.
///
/// `positions` is non-empty, ascending, and each position holds `symbol`
/// or the wild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinEntry {
    pub symbol: Symbol,
    pub positions: Vec<usize>,
}

impl WinEntry {
    /// Entry covering every position
    pub fn full_line(symbol: Symbol) -> Self {
        Self {
            symbol,
            positions: (0..REEL_COUNT).collect(),
        }
    }
}

/// Multi-entry evaluation.
///
/// For each distinct non-wild symbol `s` (in order of first appearance) with
/// `count(s) + wilds >= 3`, emit an entry over the positions holding `s` or
/// wild. An all-wild line additionally pays the wild itself.
pub fn evaluate(line: &Line, paytable: &PayTable) -> Vec<WinEntry> {
    let wild = paytable.wild();
    let wild_count = line.count(wild);
    let mut wins = Vec::new();
    let mut seen: Vec<Symbol> = Vec::with_capacity(REEL_COUNT);

    for symbol in line.iter() {
        if seen.contains(&symbol) {
            continue;
        }
        seen.push(symbol);

        if !paytable.forms_line_win(symbol) {
            continue;
        }

        if line.count(symbol) + wild_count >= REEL_COUNT {
            let positions = (0..REEL_COUNT)
                .filter(|&i| line[i] == symbol || line[i] == wild)
                .collect();
            wins.push(WinEntry { symbol, positions });
        }
    }

    if wild_count == REEL_COUNT {
        wins.push(WinEntry::full_line(wild));
    }

    wins
}

/// Single-winner evaluation for non-cascading games.
///
/// All wilds pays the wild; otherwise every non-wild position must hold the
/// same symbol (two wilds plus anything pays that symbol).
pub fn evaluate_single(line: &Line, paytable: &PayTable) -> Option<Symbol> {
    let wild = paytable.wild();
    let mut non_wild = line.iter().filter(|&s| s != wild);

    let Some(first) = non_wild.next() else {
        return Some(wild);
    };
    if !paytable.forms_line_win(first) {
        return None;
    }
    non_wild.all(|s| s == first).then_some(first)
}

/// Evaluate with whichever evaluator the game is configured for.
///
/// Single-winner results are widened to a full-line [`WinEntry`] so callers
/// can treat both modes alike.
pub fn evaluate_with(mode: EvaluatorMode, line: &Line, paytable: &PayTable) -> Vec<WinEntry> {
    match mode {
        EvaluatorMode::Cascading => evaluate(line, paytable),
        EvaluatorMode::SingleWinner => evaluate_single(line, paytable)
            .map(WinEntry::full_line)
            .into_iter()
            .collect(),
    }
}

/// Scatter symbols on the line. Wilds never count.
pub fn scatter_count(line: &Line, paytable: &PayTable) -> usize {
    paytable.scatter().map(|s| line.count(s)).unwrap_or(0)
}

/// Ascending union of all winning positions
pub fn winning_positions(wins: &[WinEntry]) -> Vec<usize> {
    let mut covered = [false; REEL_COUNT];
    for position in wins.iter().flat_map(|w| w.positions.iter()) {
        if let Some(slot) = covered.get_mut(*position) {
            *slot = true;
        }
    }
    (0..REEL_COUNT).filter(|&i| covered[i]).collect()
}

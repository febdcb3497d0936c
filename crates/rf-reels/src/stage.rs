//! Stage events: the ordered presentation stream a spin produces
//!
//! A stage is the semantic meaning of a moment in the spin, not an animation.
//! The renderer replays the list in `seq` order; the engine never waits on it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::symbols::{Line, Symbol};

/// Canonical spin stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Spin accepted, wager taken (0 during free spins)
    SpinStart { bet: f64, wagered: f64, in_bonus: bool },

    /// Initial line drawn
    ReelsSettled { line: Line },

    /// Spin resolved and credited
    SpinEnd { total_payout: f64, balance: f64 },

    // ═══════════════════════════════════════════════════════════════════════
    // WINS & CASCADES
    // ═══════════════════════════════════════════════════════════════════════
    /// A winning step: positions to highlight and what they paid
    WinHighlighted {
        step: u32,
        symbols: Vec<Symbol>,
        positions: Vec<usize>,
        multiplier: u32,
        payout: f64,
    },

    /// Winning positions redrawn
    SymbolsReplaced {
        positions: Vec<usize>,
        symbols: Vec<Symbol>,
        line: Line,
    },

    /// Cascade multiplier escalated
    MultiplierRaised { value: u32 },

    // ═══════════════════════════════════════════════════════════════════════
    // BONUS
    // ═══════════════════════════════════════════════════════════════════════
    /// Free spins awarded
    BonusEntered { free_spins: u32, multiplier: u32 },

    /// One free spin consumed
    BonusSpinRemaining { remaining: u32 },

    /// Scatters during free spins added more spins
    BonusRetriggered { added: u32, remaining: u32 },

    /// Free spins over
    BonusExited { total: f64 },
}

impl Stage {
    /// Snake-case type name, matching the serialized `type` tag
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SpinStart { .. } => "spin_start",
            Self::ReelsSettled { .. } => "reels_settled",
            Self::SpinEnd { .. } => "spin_end",
            Self::WinHighlighted { .. } => "win_highlighted",
            Self::SymbolsReplaced { .. } => "symbols_replaced",
            Self::MultiplierRaised { .. } => "multiplier_raised",
            Self::BonusEntered { .. } => "bonus_entered",
            Self::BonusSpinRemaining { .. } => "bonus_spin_remaining",
            Self::BonusRetriggered { .. } => "bonus_retriggered",
            Self::BonusExited { .. } => "bonus_exited",
        }
    }

    /// Is this a bonus lifecycle stage?
    pub fn is_bonus(&self) -> bool {
        matches!(
            self,
            Self::BonusEntered { .. }
                | Self::BonusSpinRemaining { .. }
                | Self::BonusRetriggered { .. }
                | Self::BonusExited { .. }
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpinStart {
                bet,
                wagered,
                in_bonus,
            } => {
                if *in_bonus {
                    write!(f, "spin_start bet={bet} (free spin)")
                } else {
                    write!(f, "spin_start bet={bet} wagered={wagered}")
                }
            }
            Self::ReelsSettled { line } => write!(f, "reels_settled {line}"),
            Self::SpinEnd {
                total_payout,
                balance,
            } => write!(f, "spin_end payout={total_payout:.2} balance={balance:.2}"),
            Self::WinHighlighted {
                step,
                symbols,
                positions,
                multiplier,
                payout,
            } => {
                let names: Vec<&str> = symbols.iter().map(|s| s.name()).collect();
                write!(
                    f,
                    "win_highlighted step={step} [{}] at {positions:?} x{multiplier} = {payout:.2}",
                    names.join(", ")
                )
            }
            Self::SymbolsReplaced {
                positions, line, ..
            } => write!(f, "symbols_replaced {positions:?} -> {line}"),
            Self::MultiplierRaised { value } => write!(f, "multiplier_raised x{value}"),
            Self::BonusEntered {
                free_spins,
                multiplier,
            } => write!(f, "bonus_entered spins={free_spins} x{multiplier}"),
            Self::BonusSpinRemaining { remaining } => {
                write!(f, "bonus_spin_remaining {remaining}")
            }
            Self::BonusRetriggered { added, remaining } => {
                write!(f, "bonus_retriggered +{added} ({remaining} left)")
            }
            Self::BonusExited { total } => write!(f, "bonus_exited total={total:.2}"),
        }
    }
}

/// A stage with its position in the spin's stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    /// Strictly increasing within one spin
    pub seq: u32,
    pub stage: Stage,
}

impl fmt::Display for StageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02} {}", self.seq, self.stage)
    }
}

/// Collects the events of one spin in emission order.
///
/// A disabled trace drops everything, for bulk simulation.
#[derive(Debug, Clone)]
pub struct StageTrace {
    events: Vec<StageEvent>,
    next_seq: u32,
    recording: bool,
}

impl StageTrace {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
            next_seq: 0,
            recording: true,
        }
    }

    /// Trace that records nothing
    pub fn disabled() -> Self {
        Self {
            events: Vec::new(),
            next_seq: 0,
            recording: false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Append a stage with the next sequence number
    pub fn push(&mut self, stage: Stage) {
        if !self.recording {
            return;
        }
        self.events.push(StageEvent {
            seq: self.next_seq,
            stage,
        });
        self.next_seq += 1;
    }

    pub fn events(&self) -> &[StageEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of one stage type
    pub fn of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a StageEvent> + 'a {
        self.events
            .iter()
            .filter(move |e| e.stage.type_name() == type_name)
    }

    pub fn into_events(self) -> Vec<StageEvent> {
        self.events
    }
}

impl Default for StageTrace {
    fn default() -> Self {
        Self::new()
    }
}

//! Free-spin bonus state machine (NORMAL ⇄ BONUS)
//!
//! Per spin the machine is driven in a fixed order:
//!
//! 1. [`BonusMachine::begin_spin`]: consume one free spin (BONUS only)
//! 2. [`BonusMachine::start_multiplier`]: multiplier the cascade starts from
//! 3. [`BonusMachine::record_win`]: accumulate winnings (BONUS only)
//! 4. [`BonusMachine::settle`]: scatter check on the final line, then the
//!    retrigger and exit checks

use serde::{Deserialize, Serialize};

use crate::config::{BonusConfig, BonusMultiplierPolicy};
use crate::spin::SpinState;
use crate::stage::{Stage, StageTrace};

/// Scatters needed on the final line to trigger the bonus
pub const SCATTER_TRIGGER: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusPhase {
    Normal,
    Bonus,
}

/// Bonus state change produced by one spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BonusTransition {
    Entered { free_spins: u32, multiplier: u32 },
    Retriggered { added: u32, remaining: u32 },
    Exited { total: f64 },
}

/// Applies bonus rules to a [`SpinState`]
#[derive(Debug, Clone, Copy)]
pub struct BonusMachine<'a> {
    config: Option<&'a BonusConfig>,
}

impl<'a> BonusMachine<'a> {
    /// `None` for games without a bonus feature
    pub fn new(config: Option<&'a BonusConfig>) -> Self {
        Self { config }
    }

    /// Consume one free spin before the spin is evaluated.
    ///
    /// Returns the spins left, or `None` outside the bonus.
    pub fn begin_spin(&self, state: &mut SpinState, trace: &mut StageTrace) -> Option<u32> {
        if !state.in_bonus {
            return None;
        }
        state.bonus_spins_remaining = state.bonus_spins_remaining.saturating_sub(1);
        trace.push(Stage::BonusSpinRemaining {
            remaining: state.bonus_spins_remaining,
        });
        Some(state.bonus_spins_remaining)
    }

    /// Normal spins start at 1. Free spins start at the policy value, or
    /// continue from the previous spin's multiplier under `Retain`.
    pub fn start_multiplier(&self, state: &SpinState) -> u32 {
        match self.config {
            Some(config) if state.in_bonus => match config.multiplier_policy {
                BonusMultiplierPolicy::Retain => state.multiplier.max(1),
                BonusMultiplierPolicy::Reset => 1,
                BonusMultiplierPolicy::Fixed(value) => value.max(1),
            },
            _ => 1,
        }
    }

    /// Add a spin's payout to the bonus accumulator
    pub fn record_win(&self, state: &mut SpinState, payout: f64) {
        if state.in_bonus {
            state.accumulated_bonus_winnings += payout;
        }
    }

    /// Close out the spin: store the multiplier, then enter, retrigger or exit.
    pub fn settle(
        &self,
        state: &mut SpinState,
        scatter_count: usize,
        final_multiplier: u32,
        trace: &mut StageTrace,
    ) -> Option<BonusTransition> {
        state.multiplier = final_multiplier.max(1);
        let config = self.config?;
        let triggered = scatter_count >= SCATTER_TRIGGER;

        if !state.in_bonus {
            if !triggered {
                return None;
            }
            let multiplier = config.multiplier_policy.entry_multiplier(state.multiplier);
            state.in_bonus = true;
            state.bonus_spins_remaining = config.free_spins;
            state.accumulated_bonus_winnings = 0.0;
            state.multiplier = multiplier;

            log::info!(
                "Bonus entered: {} free spins at x{}",
                config.free_spins,
                multiplier
            );
            trace.push(Stage::BonusEntered {
                free_spins: config.free_spins,
                multiplier,
            });
            return Some(BonusTransition::Entered {
                free_spins: config.free_spins,
                multiplier,
            });
        }

        if triggered && config.retrigger_spins > 0 {
            state.bonus_spins_remaining += config.retrigger_spins;
            let remaining = state.bonus_spins_remaining;
            log::info!(
                "Bonus retriggered: +{} spins ({remaining} left)",
                config.retrigger_spins
            );
            trace.push(Stage::BonusRetriggered {
                added: config.retrigger_spins,
                remaining,
            });
            return Some(BonusTransition::Retriggered {
                added: config.retrigger_spins,
                remaining,
            });
        }

        if state.bonus_spins_remaining == 0 {
            let total = state.accumulated_bonus_winnings;
            state.last_bonus_total = total;
            state.accumulated_bonus_winnings = 0.0;
            state.in_bonus = false;
            state.multiplier = 1;

            log::info!("Bonus exited: total {total:.2}");
            trace.push(Stage::BonusExited { total });
            return Some(BonusTransition::Exited { total });
        }

        None
    }
}

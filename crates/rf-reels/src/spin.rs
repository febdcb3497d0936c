//! Spin state and the spin engine
//!
//! [`ReelEngine::spin`] is transactional. It validates the request, works on
//! a copy of the [`SpinState`] and commits only when the spin resolves. A
//! rejection or an internal error leaves the caller's state untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bonus::{BonusMachine, BonusPhase, BonusTransition, SCATTER_TRIGGER};
use crate::cascade::{CascadeEngine, CascadeStep};
use crate::config::{BetLimits, Game};
use crate::error::{SpinError, SpinResult};
use crate::rng::Entropy;
use crate::stage::{Stage, StageEvent, StageTrace};
use crate::symbols::Line;

const BET_EPSILON: f64 = 1e-9;

// ═══════════════════════════════════════════════════════════════════════════════
// SPIN STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Mutable per-player state, owned by the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinState {
    pub(crate) balance: f64,
    pub(crate) bet_amount: f64,
    /// Last multiplier in effect (≥ 1)
    pub(crate) multiplier: u32,
    pub(crate) in_bonus: bool,
    pub(crate) bonus_spins_remaining: u32,
    pub(crate) accumulated_bonus_winnings: f64,
    pub(crate) last_bonus_total: f64,
}

impl SpinState {
    /// Fresh state with the game's starting balance and default bet
    pub fn new(game: &Game) -> Self {
        Self::with_balance(game, game.starting_balance())
    }

    pub fn with_balance(game: &Game, balance: f64) -> Self {
        Self {
            balance,
            bet_amount: game.bet_limits().default,
            multiplier: 1,
            in_bonus: false,
            bonus_spins_remaining: 0,
            accumulated_bonus_winnings: 0.0,
            last_bonus_total: 0.0,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn bet_amount(&self) -> f64 {
        self.bet_amount
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn in_bonus(&self) -> bool {
        self.in_bonus
    }

    pub fn phase(&self) -> BonusPhase {
        if self.in_bonus {
            BonusPhase::Bonus
        } else {
            BonusPhase::Normal
        }
    }

    pub fn bonus_spins_remaining(&self) -> u32 {
        self.bonus_spins_remaining
    }

    pub fn accumulated_bonus_winnings(&self) -> f64 {
        self.accumulated_bonus_winnings
    }

    pub fn last_bonus_total(&self) -> f64 {
        self.last_bonus_total
    }

    /// Change the bet. Refused during free spins.
    pub fn set_bet(&mut self, bet: f64, limits: &BetLimits) -> SpinResult<()> {
        self.ensure_bet_unlocked(bet)?;
        limits.check(bet)?;
        self.bet_amount = bet;
        Ok(())
    }

    /// One denomination up; no-op at `max`
    pub fn raise_bet(&mut self, limits: &BetLimits) -> SpinResult<f64> {
        let next = limits.raise(self.bet_amount);
        self.ensure_bet_unlocked(next)?;
        self.bet_amount = next;
        Ok(next)
    }

    /// One denomination down; no-op at `min`
    pub fn lower_bet(&mut self, limits: &BetLimits) -> SpinResult<f64> {
        let next = limits.lower(self.bet_amount);
        self.ensure_bet_unlocked(next)?;
        self.bet_amount = next;
        Ok(next)
    }

    /// Request matching this state at its current bet
    pub fn request(&self) -> SpinRequest {
        SpinRequest {
            bet_amount: self.bet_amount,
            in_bonus: self.in_bonus,
        }
    }

    fn ensure_bet_unlocked(&self, requested: f64) -> SpinResult<()> {
        if self.in_bonus && (requested - self.bet_amount).abs() > BET_EPSILON {
            return Err(SpinError::BetLocked {
                locked: self.bet_amount,
                requested,
            });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST / OUTCOME
// ═══════════════════════════════════════════════════════════════════════════════

/// Spin request from the bet/balance collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinRequest {
    pub bet_amount: f64,
    /// What the caller believes the bonus state is
    pub in_bonus: bool,
}

impl SpinRequest {
    /// Paid spin
    pub fn new(bet_amount: f64) -> Self {
        Self {
            bet_amount,
            in_bonus: false,
        }
    }

    /// Free spin at the locked bet
    pub fn free(bet_amount: f64) -> Self {
        Self {
            bet_amount,
            in_bonus: true,
        }
    }
}

/// Everything one spin produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub initial_line: Line,
    pub final_line: Line,
    pub cascade_steps: Vec<CascadeStep>,
    pub scatter_count: usize,
    /// Final line shows enough scatters to trigger
    pub scatter_triggered: bool,
    /// Amount deducted from balance (0 for free spins)
    pub wagered: f64,
    pub total_payout: f64,
    pub bonus_transition: Option<BonusTransition>,
    /// State after commit
    pub state: SpinState,
    /// Presentation stream, in emission order
    pub events: Vec<StageEvent>,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        !self.cascade_steps.is_empty()
    }

    /// Highest multiplier applied to a payout (1 on a losing spin)
    pub fn peak_multiplier(&self) -> u32 {
        self.cascade_steps
            .iter()
            .map(|s| s.multiplier)
            .max()
            .unwrap_or(1)
    }

    pub fn entered_bonus(&self) -> bool {
        matches!(self.bonus_transition, Some(BonusTransition::Entered { .. }))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Spin procedure over a shared [`Game`]
#[derive(Debug, Clone)]
pub struct ReelEngine {
    game: Arc<Game>,
}

impl ReelEngine {
    pub fn new(game: Arc<Game>) -> Self {
        Self { game }
    }

    pub fn game(&self) -> &Arc<Game> {
        &self.game
    }

    /// Fresh state for this game
    pub fn new_state(&self) -> SpinState {
        SpinState::new(&self.game)
    }

    /// Reject a request that cannot be played against `state`
    pub fn check(&self, state: &SpinState, request: &SpinRequest) -> SpinResult<()> {
        if request.in_bonus != state.in_bonus {
            return Err(SpinError::StaleRequest {
                requested: request.in_bonus,
                actual: state.in_bonus,
            });
        }

        if state.in_bonus {
            if (request.bet_amount - state.bet_amount).abs() > BET_EPSILON {
                return Err(SpinError::BetLocked {
                    locked: state.bet_amount,
                    requested: request.bet_amount,
                });
            }
            return Ok(());
        }

        self.game.bet_limits().check(request.bet_amount)?;
        if state.balance < request.bet_amount {
            return Err(SpinError::InsufficientFunds {
                balance: state.balance,
                bet: request.bet_amount,
            });
        }
        Ok(())
    }

    /// Play one spin, recording the presentation stream
    pub fn spin<E: Entropy + ?Sized>(
        &self,
        state: &mut SpinState,
        request: SpinRequest,
        entropy: &mut E,
    ) -> SpinResult<SpinOutcome> {
        self.spin_traced(state, request, entropy, StageTrace::new())
    }

    /// Play one spin without collecting stage events
    pub fn spin_quiet<E: Entropy + ?Sized>(
        &self,
        state: &mut SpinState,
        request: SpinRequest,
        entropy: &mut E,
    ) -> SpinResult<SpinOutcome> {
        self.spin_traced(state, request, entropy, StageTrace::disabled())
    }

    fn spin_traced<E: Entropy + ?Sized>(
        &self,
        state: &mut SpinState,
        request: SpinRequest,
        entropy: &mut E,
        mut trace: StageTrace,
    ) -> SpinResult<SpinOutcome> {
        if let Err(err) = self.check(state, &request) {
            log::warn!("Spin rejected: {err}");
            return Err(err);
        }

        let bonus = BonusMachine::new(self.game.bonus());
        let mut next = state.clone();
        let bet = request.bet_amount;

        let wagered = if next.in_bonus {
            0.0
        } else {
            next.bet_amount = bet;
            next.balance -= bet;
            bet
        };
        trace.push(Stage::SpinStart {
            bet,
            wagered,
            in_bonus: next.in_bonus,
        });

        bonus.begin_spin(&mut next, &mut trace);
        let start_multiplier = bonus.start_multiplier(&next);

        let cascade =
            CascadeEngine::new(&self.game).run(bet, start_multiplier, entropy, &mut trace)?;

        bonus.record_win(&mut next, cascade.total_payout);
        next.balance += cascade.total_payout;
        let transition = bonus.settle(
            &mut next,
            cascade.scatter_count,
            cascade.final_multiplier,
            &mut trace,
        );

        trace.push(Stage::SpinEnd {
            total_payout: cascade.total_payout,
            balance: next.balance,
        });

        *state = next;
        Ok(SpinOutcome {
            initial_line: cascade.initial_line,
            final_line: cascade.final_line,
            cascade_steps: cascade.steps,
            scatter_count: cascade.scatter_count,
            scatter_triggered: cascade.scatter_count >= SCATTER_TRIGGER,
            wagered,
            total_payout: cascade.total_payout,
            bonus_transition: transition,
            state: state.clone(),
            events: trace.into_events(),
        })
    }
}

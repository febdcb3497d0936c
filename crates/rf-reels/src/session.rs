//! Game session: owns a SpinState and its entropy source
//!
//! The state and entropy sit behind one `parking_lot::Mutex`, so at most one
//! cascade is in flight per session. Auto-repeat is the only long-running
//! operation and is cancelled through a [`CancelToken`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::Game;
use crate::error::{SpinError, SpinResult};
use crate::rng::{Entropy, SecureEntropy};
use crate::spin::{ReelEngine, SpinOutcome, SpinRequest, SpinState};

/// Shared cancellation flag for auto-repeat
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// No further spin is scheduled after the current one resolves
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Re-arm after a cancellation
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Why auto-repeat stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoSpinStop {
    /// All requested spins played
    Completed,
    /// Token cancelled by the caller
    Cancelled,
    /// Balance below the bet
    InsufficientFunds,
    /// Free spins awarded; continuing needs a deliberate decision
    BonusEntered,
}

/// Totals of one auto-repeat run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoSpinSummary {
    pub spins: u32,
    pub total_wagered: f64,
    pub total_won: f64,
    pub stop: AutoSpinStop,
}

struct SessionInner<E> {
    state: SpinState,
    entropy: E,
}

/// One player's session
pub struct GameSession<E: Entropy = SecureEntropy> {
    engine: ReelEngine,
    inner: Mutex<SessionInner<E>>,
}

impl GameSession<SecureEntropy> {
    /// Session for real play, OS-seeded entropy
    pub fn secure(game: Arc<Game>) -> Self {
        Self::new(game, SecureEntropy::new())
    }
}

impl<E: Entropy> GameSession<E> {
    pub fn new(game: Arc<Game>, entropy: E) -> Self {
        let state = SpinState::new(&game);
        Self::with_state(game, state, entropy)
    }

    /// Resume from an existing state
    pub fn with_state(game: Arc<Game>, state: SpinState, entropy: E) -> Self {
        Self {
            engine: ReelEngine::new(game),
            inner: Mutex::new(SessionInner { state, entropy }),
        }
    }

    pub fn engine(&self) -> &ReelEngine {
        &self.engine
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SpinState {
        self.inner.lock().state.clone()
    }

    /// Play one spin at the current bet
    pub fn spin(&self) -> SpinResult<SpinOutcome> {
        let mut inner = self.inner.lock();
        let request = inner.state.request();
        let SessionInner { state, entropy } = &mut *inner;
        self.engine.spin(state, request, entropy)
    }

    /// Play an explicit request
    pub fn submit(&self, request: SpinRequest) -> SpinResult<SpinOutcome> {
        let mut inner = self.inner.lock();
        let SessionInner { state, entropy } = &mut *inner;
        self.engine.spin(state, request, entropy)
    }

    pub fn set_bet(&self, bet: f64) -> SpinResult<()> {
        let limits = *self.engine.game().bet_limits();
        self.inner.lock().state.set_bet(bet, &limits)
    }

    pub fn raise_bet(&self) -> SpinResult<f64> {
        let limits = *self.engine.game().bet_limits();
        self.inner.lock().state.raise_bet(&limits)
    }

    pub fn lower_bet(&self) -> SpinResult<f64> {
        let limits = *self.engine.game().bet_limits();
        self.inner.lock().state.lower_bet(&limits)
    }

    /// Spin repeatedly until `max_spins`, cancellation, insufficient funds or
    /// bonus entry. Bonus entry cancels `token`.
    ///
    /// During free spins the locked bet is used regardless of `bet`.
    pub fn auto_spin(
        &self,
        bet: f64,
        max_spins: u32,
        token: &CancelToken,
    ) -> SpinResult<AutoSpinSummary> {
        let mut summary = AutoSpinSummary {
            spins: 0,
            total_wagered: 0.0,
            total_won: 0.0,
            stop: AutoSpinStop::Completed,
        };

        while summary.spins < max_spins {
            if token.is_cancelled() {
                summary.stop = AutoSpinStop::Cancelled;
                break;
            }

            let outcome = {
                let mut inner = self.inner.lock();
                let request = if inner.state.in_bonus() {
                    inner.state.request()
                } else {
                    SpinRequest::new(bet)
                };
                let SessionInner { state, entropy } = &mut *inner;
                match self.engine.spin(state, request, entropy) {
                    Ok(outcome) => outcome,
                    Err(SpinError::InsufficientFunds { .. }) => {
                        summary.stop = AutoSpinStop::InsufficientFunds;
                        break;
                    }
                    Err(err) => return Err(err),
                }
            };

            summary.spins += 1;
            summary.total_wagered += outcome.wagered;
            summary.total_won += outcome.total_payout;

            if outcome.entered_bonus() {
                token.cancel();
                summary.stop = AutoSpinStop::BonusEntered;
                break;
            }
        }

        log::info!(
            "Auto-spin stopped ({:?}) after {} spins: wagered {:.2}, won {:.2}",
            summary.stop,
            summary.spins,
            summary.total_wagered,
            summary.total_won
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::rng::{ScriptedEntropy, SeededEntropy};

    #[test]
    fn test_session_spin_updates_state() {
        let game = GameConfig::cascade().build().unwrap();
        let session = GameSession::new(game, ScriptedEntropy::new([0, 1, 2]));

        let outcome = session.spin().unwrap();
        assert!(!outcome.is_win());
        assert_eq!(session.state().balance(), 990.0);
        assert_eq!(outcome.state, session.state());
    }

    #[test]
    fn test_cancelled_token_plays_nothing() {
        let game = GameConfig::cascade().build().unwrap();
        let session = GameSession::new(game, SeededEntropy::new(3));
        let token = CancelToken::new();
        token.cancel();

        let summary = session.auto_spin(10.0, 50, &token).unwrap();
        assert_eq!(summary.spins, 0);
        assert_eq!(summary.stop, AutoSpinStop::Cancelled);
        assert_eq!(session.state().balance(), 1000.0);
    }

    #[test]
    fn test_auto_spin_stops_on_bonus_entry() {
        let game = GameConfig::scatter_boost().build().unwrap();
        // Sevens sit at 6..10 on the outer strips and 4..7 on the middle one
        let session = GameSession::new(game, ScriptedEntropy::new([6, 4, 6]));
        let token = CancelToken::new();

        let summary = session.auto_spin(10.0, 20, &token).unwrap();
        assert_eq!(summary.spins, 1);
        assert_eq!(summary.stop, AutoSpinStop::BonusEntered);
        assert!(token.is_cancelled());
        assert!(session.state().in_bonus());
    }

    #[test]
    fn test_auto_spin_runs_out_of_funds() {
        let game = GameConfig::cascade().build().unwrap();
        let state = SpinState::with_balance(&game, 30.0);
        let session = GameSession::with_state(game, state, ScriptedEntropy::new([0, 1, 2]));

        let summary = session.auto_spin(10.0, 10, &CancelToken::new()).unwrap();
        assert_eq!(summary.spins, 3);
        assert_eq!(summary.stop, AutoSpinStop::InsufficientFunds);
        assert!((summary.total_wagered - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_bet_locked_during_free_spins() {
        let game = GameConfig::scatter_boost().build().unwrap();
        let session = GameSession::new(game, ScriptedEntropy::new([6, 4, 6]));
        session.spin().unwrap();
        assert!(session.state().in_bonus());

        assert!(matches!(
            session.raise_bet(),
            Err(SpinError::BetLocked { .. })
        ));
        assert!(matches!(
            session.submit(SpinRequest::new(10.0)),
            Err(SpinError::StaleRequest { .. })
        ));
        assert!(matches!(
            session.submit(SpinRequest::free(20.0)),
            Err(SpinError::BetLocked { .. })
        ));
    }
}

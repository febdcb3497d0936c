//! Monte Carlo RTP simulation
//!
//! Trials are split into fixed-size chunks. Chunk `i` draws from
//! `ChaCha8(seed)` on stream `i`, so every chunk is reproducible on its own
//! and the summed result does not depend on the worker count.

use std::sync::Arc;

use rayon::prelude::*;
use rf_reels::{
    CascadeEngine, Game, ReelEngine, SCATTER_TRIGGER, SeededEntropy, SpinRequest, SpinState,
    StageTrace,
};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::report::{SimulationResult, one_in, percent};

/// Monte Carlo parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Paid spins to simulate
    pub trials: u64,
    /// Fixed bet per paid spin
    pub bet: f64,
    pub seed: u64,
    /// Worker threads
    pub threads: usize,
    /// Trials per RNG stream
    pub chunk_size: u64,
    /// Play triggered free spins (unwagered) inside the same trial
    pub with_bonus: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: 1_000_000,
            bet: 10.0,
            seed: 0,
            threads: num_cpus::get(),
            chunk_size: 10_000,
            with_bonus: false,
        }
    }
}

impl SimulationConfig {
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_bet(mut self, bet: f64) -> Self {
        self.bet = bet;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_bonus(mut self, enabled: bool) -> Self {
        self.with_bonus = enabled;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.trials == 0 {
            return Err(SimError::NoTrials);
        }
        if !self.bet.is_finite() || self.bet <= 0.0 {
            return Err(SimError::InvalidBet(self.bet));
        }
        if self.threads == 0 {
            return Err(SimError::NoThreads);
        }
        if self.chunk_size == 0 {
            return Err(SimError::EmptyChunk);
        }
        Ok(())
    }

    fn chunk_count(&self) -> u64 {
        self.trials.div_ceil(self.chunk_size)
    }

    fn chunk_len(&self, chunk: u64) -> u64 {
        let start = chunk * self.chunk_size;
        self.chunk_size.min(self.trials - start)
    }
}

/// Counters accumulated by one chunk
#[derive(Debug, Clone, Default)]
struct ChunkStats {
    trials: u64,
    total_bet: f64,
    total_won: f64,
    base_hits: u64,
    scatter_triggers: u64,
    max_depth: usize,
    free_spins: u64,
    bonus_won: f64,
}

impl ChunkStats {
    fn merge(mut self, other: ChunkStats) -> Self {
        self.trials += other.trials;
        self.total_bet += other.total_bet;
        self.total_won += other.total_won;
        self.base_hits += other.base_hits;
        self.scatter_triggers += other.scatter_triggers;
        self.max_depth = self.max_depth.max(other.max_depth);
        self.free_spins += other.free_spins;
        self.bonus_won += other.bonus_won;
        self
    }
}

/// Runs the full spin procedure in bulk
pub struct MonteCarlo {
    game: Arc<Game>,
    config: SimulationConfig,
}

impl MonteCarlo {
    pub fn new(game: Arc<Game>, config: SimulationConfig) -> Self {
        Self { game, config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate and aggregate. Chunks are summed in chunk order.
    pub fn run(&self) -> SimResult<SimulationResult> {
        self.config.validate()?;
        self.game.bet_limits().check(self.config.bet)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()?;

        let chunks: Vec<ChunkStats> = pool.install(|| {
            (0..self.config.chunk_count())
                .into_par_iter()
                .map(|chunk| self.run_chunk(chunk))
                .collect::<SimResult<Vec<_>>>()
        })?;

        let stats = chunks
            .into_iter()
            .fold(ChunkStats::default(), ChunkStats::merge);

        let result = SimulationResult {
            game: self.game.name().to_string(),
            seed: self.config.seed,
            trials: stats.trials,
            bet: self.config.bet,
            total_bet: stats.total_bet,
            total_won: stats.total_won,
            rtp: stats.total_won / stats.total_bet * 100.0,
            base_hit_frequency: percent(stats.base_hits, stats.trials),
            scatter_triggers: stats.scatter_triggers,
            scatter_frequency: one_in(stats.trials, stats.scatter_triggers),
            max_cascade_depth: stats.max_depth,
            with_bonus: self.config.with_bonus,
            free_spins: stats.free_spins,
            bonus_won: stats.bonus_won,
        };

        log::info!(
            "Simulated {} spins of '{}' (seed {}): RTP {:.2}%",
            result.trials,
            result.game,
            result.seed,
            result.rtp
        );
        Ok(result)
    }

    fn run_chunk(&self, chunk: u64) -> SimResult<ChunkStats> {
        let mut entropy = SeededEntropy::with_stream(self.config.seed, chunk);
        let trials = self.config.chunk_len(chunk);

        if self.config.with_bonus {
            self.run_with_bonus(trials, &mut entropy)
        } else {
            self.run_base(trials, &mut entropy)
        }
    }

    /// Paid spins only; free-spin triggers are counted but not played
    fn run_base(&self, trials: u64, entropy: &mut SeededEntropy) -> SimResult<ChunkStats> {
        let bet = self.config.bet;
        let engine = CascadeEngine::new(&self.game);
        let mut trace = StageTrace::disabled();
        let mut stats = ChunkStats::default();

        for _ in 0..trials {
            let outcome = engine.run(bet, 1, entropy, &mut trace)?;

            stats.trials += 1;
            stats.total_bet += bet;
            stats.total_won += outcome.total_payout;
            if outcome.is_win() {
                stats.base_hits += 1;
            }
            if outcome.scatter_count >= SCATTER_TRIGGER {
                stats.scatter_triggers += 1;
            }
            stats.max_depth = stats.max_depth.max(outcome.depth());
        }
        Ok(stats)
    }

    /// Each trial is one paid spin plus any free spins it triggers
    fn run_with_bonus(&self, trials: u64, entropy: &mut SeededEntropy) -> SimResult<ChunkStats> {
        let bet = self.config.bet;
        let engine = ReelEngine::new(Arc::clone(&self.game));
        let mut stats = ChunkStats::default();

        for _ in 0..trials {
            let mut state = SpinState::with_balance(&self.game, bet);
            let paid = engine.spin_quiet(&mut state, SpinRequest::new(bet), entropy)?;

            stats.trials += 1;
            stats.total_bet += paid.wagered;
            stats.total_won += paid.total_payout;
            if paid.is_win() {
                stats.base_hits += 1;
            }
            if paid.scatter_count >= SCATTER_TRIGGER {
                stats.scatter_triggers += 1;
            }
            stats.max_depth = stats.max_depth.max(paid.cascade_steps.len().saturating_sub(1));

            while state.in_bonus() {
                let request = state.request();
                let free = engine.spin_quiet(&mut state, request, entropy)?;
                stats.free_spins += 1;
                stats.total_won += free.total_payout;
                stats.bonus_won += free.total_payout;
                stats.max_depth = stats.max_depth.max(free.cascade_steps.len().saturating_sub(1));
            }
        }
        Ok(stats)
    }
}

/// Convenience wrapper around [`MonteCarlo::run`]
pub fn simulate(game: Arc<Game>, config: SimulationConfig) -> SimResult<SimulationResult> {
    MonteCarlo::new(game, config).run()
}

//! Simulation errors

use rf_reels::SpinError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Trial count must be at least 1")]
    NoTrials,

    #[error("Invalid simulation bet: {0}")]
    InvalidBet(f64),

    #[error("Worker thread count must be at least 1")]
    NoThreads,

    #[error("Chunk size must be at least 1")]
    EmptyChunk,

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Spin failed during simulation: {0}")]
    Spin(#[from] SpinError),
}

pub type SimResult<T> = Result<T, SimError>;

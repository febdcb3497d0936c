//! Error types for the reel engine

use thiserror::Error;

use crate::symbols::Symbol;

/// Configuration errors. All of them are fatal at load time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Reel {reel} strip is empty")]
    EmptyStrip { reel: usize },

    #[error("Expected {expected} reels, found {found}")]
    ReelCount { expected: usize, found: usize },

    #[error("Paytable has no entry for {symbol} (referenced on reel {reel})")]
    MissingPay { symbol: Symbol, reel: usize },

    #[error("Invalid pay value for {symbol}: {value}")]
    InvalidPay { symbol: Symbol, value: f64 },

    #[error("Symbol {0} cannot be both wild and scatter")]
    WildIsScatter(Symbol),

    #[error("Invalid bonus parameters: {0}")]
    InvalidBonus(String),

    #[error("Invalid bet limits: {0}")]
    InvalidBet(String),

    #[error("Invalid reference unit: {0}")]
    InvalidReferenceUnit(f64),

    #[error("Invalid cascade settings: {0}")]
    InvalidCascade(String),

    #[error("Invalid starting balance: {0}")]
    InvalidBalance(f64),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Per-spin errors.
///
/// Everything except [`SpinError::CascadeDepthExceeded`] is a rejection
/// raised before any state mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpinError {
    #[error("Bet {bet} outside allowed range [{min}, {max}]")]
    BetOutOfRange { bet: f64, min: f64, max: f64 },

    #[error("Bet {bet} is not a multiple of the denomination {denomination}")]
    BetNotDenomination { bet: f64, denomination: f64 },

    #[error("Bet is locked at {locked} during free spins (requested {requested})")]
    BetLocked { locked: f64, requested: f64 },

    #[error("Insufficient funds: balance {balance}, bet {bet}")]
    InsufficientFunds { balance: f64, bet: f64 },

    #[error("Stale spin request: requested in_bonus={requested}, session in_bonus={actual}")]
    StaleRequest { requested: bool, actual: bool },

    #[error("Cascade exceeded the depth bound of {max_depth} steps")]
    CascadeDepthExceeded { max_depth: u32 },
}

impl SpinError {
    /// Rejected before any draw. The caller may retry with a different request.
    pub fn is_rejection(&self) -> bool {
        !self.is_internal()
    }

    /// Configuration or RNG anomaly, never a valid game outcome.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::CascadeDepthExceeded { .. })
    }
}

/// Result alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for spins
pub type SpinResult<T> = Result<T, SpinError>;

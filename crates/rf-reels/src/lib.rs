//! # rf-reels: Three-Reel Outcome Engine
//!
//! Draws symbols from weighted virtual reels, evaluates wins with wild
//! substitution, resolves cascading re-draws under an escalating multiplier
//! and runs the free-spin bonus. The engine only computes outcomes; a
//! renderer consumes the ordered [`StageEvent`] list each spin produces.
//!
//! ## Architecture
//!
//! ```text
//! GameConfig (JSON / YAML / preset)
//!     │ build()
//!     v
//! Game ── PayTable (multipliers, wild, scatter)
//!     │── [ReelStrip; 3]
//!     │── BetLimits / CascadeConfig / BonusConfig
//!     v
//! ReelEngine::spin(&mut SpinState, SpinRequest, &mut impl Entropy)
//!     │
//!     ├── generator::draw_line      (one independent draw per reel)
//!     ├── CascadeEngine::run        (evaluate → pay → redraw → re-evaluate)
//!     └── BonusMachine              (NORMAL ⇄ BONUS)
//!           │
//!           v
//!     SpinOutcome → Vec<StageEvent>
//! ```

pub mod bonus;
pub mod cascade;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod paytable;
pub mod rng;
pub mod session;
pub mod spin;
pub mod stage;
pub mod symbols;

pub use bonus::*;
pub use cascade::*;
pub use config::*;
pub use error::*;
pub use evaluator::*;
pub use generator::*;
pub use paytable::*;
pub use rng::*;
pub use session::*;
pub use spin::*;
pub use stage::*;
pub use symbols::*;

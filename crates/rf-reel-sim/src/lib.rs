//! rf-reel-sim: statistical validation of the rf-reels engine
//!
//! Two modes over the same evaluator and paytable:
//!
//! - [`enumerate`]: exact hit frequency, scatter frequency and base return
//!   over every strip combination (base line only, no cascades).
//! - [`MonteCarlo`]: full spin procedure (cascades, multiplier escalation,
//!   optionally free spins) for a seeded trial count, reporting RTP.
//!
//! Both parallelize with rayon and reduce in a fixed order, so results are
//! reproducible for any worker count.

pub mod enumerate;
pub mod error;
pub mod monte_carlo;
pub mod report;

pub use enumerate::*;
pub use error::*;
pub use monte_carlo::*;
pub use report::*;

//! Outcome generator: independent weighted draws, one per reel

use crate::rng::Entropy;
use crate::symbols::{Line, REEL_COUNT, ReelStrip, Symbol};

/// Draw one symbol uniformly over the strip's positions.
///
/// Uniform over positions, not distinct symbols: duplicated entries are the
/// weighting mechanism.
pub fn draw<E: Entropy + ?Sized>(strip: &ReelStrip, entropy: &mut E) -> Symbol {
    strip.symbol_at(entropy.next_index(strip.len()))
}

/// Three independent draws, reel 0 first
pub fn draw_line<E: Entropy + ?Sized>(strips: &[ReelStrip; REEL_COUNT], entropy: &mut E) -> Line {
    Line::new([
        draw(&strips[0], entropy),
        draw(&strips[1], entropy),
        draw(&strips[2], entropy),
    ])
}

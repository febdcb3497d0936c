//! Entropy sources for reel draws
//!
//! Real spins use [`SecureEntropy`] (OS-seeded CSPRNG, never reproducible).
//! Simulation and regression tests use [`SeededEntropy`] (ChaCha8, fully
//! reproducible from its seed and stream). [`ScriptedEntropy`] replays a fixed
//! index sequence to force specific lines.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform index source
pub trait Entropy {
    /// Uniform index in `0..upper`. Returns 0 when `upper <= 1`.
    fn next_index(&mut self, upper: usize) -> usize;
}

impl<E: Entropy + ?Sized> Entropy for &mut E {
    fn next_index(&mut self, upper: usize) -> usize {
        (**self).next_index(upper)
    }
}

impl<E: Entropy + ?Sized> Entropy for Box<E> {
    fn next_index(&mut self, upper: usize) -> usize {
        (**self).next_index(upper)
    }
}

/// Cryptographically secure, non-reproducible source for real spins
pub struct SecureEntropy {
    rng: StdRng,
}

impl SecureEntropy {
    /// Seed from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Default for SecureEntropy {
    fn default() -> Self {
        Self::new()
    }
}

impl Entropy for SecureEntropy {
    fn next_index(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        self.rng.random_range(0..upper)
    }
}

/// Seedable source for simulation and tests
#[derive(Debug, Clone)]
pub struct SeededEntropy {
    rng: ChaCha8Rng,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self::with_stream(seed, 0)
    }

    /// Independent stream for the same seed (one per simulation chunk)
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self { rng }
    }
}

impl Entropy for SeededEntropy {
    fn next_index(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        self.rng.random_range(0..upper)
    }
}

/// Replays a fixed list of strip positions, cycling when exhausted.
///
/// Each scripted value is reduced modulo the strip length it is drawn from.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEntropy {
    script: Vec<usize>,
    cursor: usize,
}

impl ScriptedEntropy {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: script.into_iter().collect(),
            cursor: 0,
        }
    }

    /// Number of draws served so far
    pub fn draws(&self) -> usize {
        self.cursor
    }

    /// Positions still queued before the script cycles
    pub fn remaining(&self) -> usize {
        self.script.len().saturating_sub(self.cursor)
    }
}

impl Entropy for ScriptedEntropy {
    fn next_index(&mut self, upper: usize) -> usize {
        if self.script.is_empty() || upper == 0 {
            return 0;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        value % upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SeededEntropy::new(42);
        let mut b = SeededEntropy::new(42);
        let xs: Vec<usize> = (0..32).map(|_| a.next_index(19)).collect();
        let ys: Vec<usize> = (0..32).map(|_| b.next_index(19)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&x| x < 19));
    }

    #[test]
    fn test_streams_differ() {
        let mut a = SeededEntropy::with_stream(7, 0);
        let mut b = SeededEntropy::with_stream(7, 1);
        let xs: Vec<usize> = (0..32).map(|_| a.next_index(1000)).collect();
        let ys: Vec<usize> = (0..32).map(|_| b.next_index(1000)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_secure_in_range() {
        let mut secure = SecureEntropy::new();
        for _ in 0..100 {
            assert!(secure.next_index(22) < 22);
        }
        assert_eq!(secure.next_index(1), 0);
    }

    #[test]
    fn test_scripted_cycles() {
        let mut script = ScriptedEntropy::new([1, 5, 2]);
        assert_eq!(script.next_index(4), 1);
        assert_eq!(script.next_index(4), 1); // 5 % 4
        assert_eq!(script.next_index(4), 2);
        assert_eq!(script.remaining(), 0);
        assert_eq!(script.next_index(4), 1); // Cycles
        assert_eq!(script.draws(), 4);
    }

    #[test]
    fn test_empty_script_yields_zero() {
        let mut script = ScriptedEntropy::default();
        assert_eq!(script.next_index(10), 0);
    }

    #[test]
    fn test_boxed_entropy() {
        let mut boxed: Box<dyn Entropy> = Box::new(ScriptedEntropy::new([3]));
        assert_eq!(boxed.next_index(10), 3);
    }
}

//! Symbol definitions, reel strips and drawn lines

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of reels (and therefore positions on a line)
pub const REEL_COUNT: usize = 3;

/// Reel symbol.
///
/// Wild and scatter roles are assigned by the [`PayTable`](crate::PayTable),
/// not by the symbol itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Symbol {
    Cherry = 0,
    Plum = 1,
    Orange = 2,
    Melon = 3,
    Seven = 4,
    Bar = 5,
    Bell = 6,
    Banana = 7,
    Lemon = 8,
}

impl Symbol {
    /// Every symbol, in declaration order
    pub const ALL: [Symbol; 9] = [
        Symbol::Cherry,
        Symbol::Plum,
        Symbol::Orange,
        Symbol::Melon,
        Symbol::Seven,
        Symbol::Bar,
        Symbol::Bell,
        Symbol::Banana,
        Symbol::Lemon,
    ];

    /// Lowercase name used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cherry => "cherry",
            Self::Plum => "plum",
            Self::Orange => "orange",
            Self::Melon => "melon",
            Self::Seven => "seven",
            Self::Bar => "bar",
            Self::Bell => "bell",
            Self::Banana => "banana",
            Self::Lemon => "lemon",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Symbol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|sym| sym.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ConfigError::UnknownSymbol(s.to_string()))
    }
}

/// A virtual reel strip.
///
/// The multiplicity of a symbol encodes its draw probability:
/// `occurrences / len`. Never empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReelStrip {
    /// Symbols in strip order
    symbols: Vec<Symbol>,
}

impl ReelStrip {
    /// Create the strip for reel `reel_index`, rejecting an empty symbol list
    pub fn new(reel_index: u8, symbols: Vec<Symbol>) -> Result<Self, ConfigError> {
        if symbols.is_empty() {
            return Err(ConfigError::EmptyStrip {
                reel: reel_index as usize,
            });
        }
        Ok(Self { symbols })
    }

    /// Symbols in strip order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Get symbol at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> Symbol {
        self.symbols[position % self.symbols.len()]
    }

    /// Total strip length
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Never true for a constructed strip
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Occurrences of `symbol` on this strip
    pub fn count(&self, symbol: Symbol) -> usize {
        self.symbols.iter().filter(|&&s| s == symbol).count()
    }

    /// Probability of drawing `symbol` from this strip
    pub fn probability(&self, symbol: Symbol) -> f64 {
        self.count(symbol) as f64 / self.len() as f64
    }
}

/// One visible result: a symbol per reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line([Symbol; REEL_COUNT]);

impl Line {
    pub fn new(symbols: [Symbol; REEL_COUNT]) -> Self {
        Self(symbols)
    }

    pub fn symbols(&self) -> &[Symbol; REEL_COUNT] {
        &self.0
    }

    pub fn get(&self, position: usize) -> Option<Symbol> {
        self.0.get(position).copied()
    }

    /// Overwrite one position. Out-of-range positions are ignored.
    pub fn replace(&mut self, position: usize, symbol: Symbol) {
        if let Some(slot) = self.0.get_mut(position) {
            *slot = symbol;
        }
    }

    /// Occurrences of `symbol` on the line
    pub fn count(&self, symbol: Symbol) -> usize {
        self.0.iter().filter(|&&s| s == symbol).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.iter().copied()
    }
}

impl Index<usize> for Line {
    type Output = Symbol;

    fn index(&self, position: usize) -> &Symbol {
        &self.0[position]
    }
}

impl From<[Symbol; REEL_COUNT]> for Line {
    fn from(symbols: [Symbol; REEL_COUNT]) -> Self {
        Self(symbols)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.0[0], self.0[1], self.0[2])
    }
}

//! Symbol catalog and paytable

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::symbols::Symbol;

/// Catalog view of one symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: Symbol,
    pub payout_multiplier: f64,
    pub is_wild: bool,
    pub is_scatter: bool,
}

/// Paytable plus wild/scatter designation.
///
/// Exactly one wild. At most one scatter, never the same symbol as the wild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayTable {
    /// Symbol -> payout multiplier
    pays: BTreeMap<Symbol, f64>,
    /// Wild symbol
    wild: Symbol,
    /// Scatter symbol (games with a bonus feature)
    scatter: Option<Symbol>,
    /// Whether the scatter also forms ordinary line wins
    scatter_pays: bool,
}

impl PayTable {
    /// Create a paytable, validating pay values and the wild/scatter split
    pub fn new(
        pays: BTreeMap<Symbol, f64>,
        wild: Symbol,
        scatter: Option<Symbol>,
        scatter_pays: bool,
    ) -> Result<Self, ConfigError> {
        if scatter == Some(wild) {
            return Err(ConfigError::WildIsScatter(wild));
        }
        if let Some((&symbol, &value)) = pays.iter().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(ConfigError::InvalidPay { symbol, value });
        }

        Ok(Self {
            pays,
            wild,
            scatter,
            scatter_pays,
        })
    }

    /// Pay multiplier, if the paytable lists the symbol
    pub fn pay(&self, symbol: Symbol) -> Option<f64> {
        self.pays.get(&symbol).copied()
    }

    /// Pay multiplier, 0 for unlisted symbols
    pub fn multiplier(&self, symbol: Symbol) -> f64 {
        self.pay(symbol).unwrap_or(0.0)
    }

    pub fn wild(&self) -> Symbol {
        self.wild
    }

    pub fn scatter(&self) -> Option<Symbol> {
        self.scatter
    }

    pub fn scatter_pays(&self) -> bool {
        self.scatter_pays
    }

    pub fn is_wild(&self, symbol: Symbol) -> bool {
        symbol == self.wild
    }

    pub fn is_scatter(&self, symbol: Symbol) -> bool {
        self.scatter == Some(symbol)
    }

    /// Whether `symbol` can anchor a line win of its own (wild handled separately)
    pub fn forms_line_win(&self, symbol: Symbol) -> bool {
        !self.is_wild(symbol) && (self.scatter_pays || !self.is_scatter(symbol))
    }

    /// Catalog entry for a symbol
    pub fn info(&self, symbol: Symbol) -> SymbolInfo {
        SymbolInfo {
            symbol,
            payout_multiplier: self.multiplier(symbol),
            is_wild: self.is_wild(symbol),
            is_scatter: self.is_scatter(symbol),
        }
    }

    /// Winnings for one win entry:
    /// `pay × (bet / reference_unit) × multiplier`
    pub fn payout(&self, symbol: Symbol, bet: f64, reference_unit: f64, multiplier: u32) -> f64 {
        self.multiplier(symbol) * (bet / reference_unit) * multiplier as f64
    }
}

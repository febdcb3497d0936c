//! Game configuration: serde document, validation and built-in presets

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, SpinError, SpinResult};
use crate::paytable::PayTable;
use crate::symbols::{REEL_COUNT, ReelStrip, Symbol};

/// Names accepted by [`GameConfig::preset`]
pub const PRESET_NAMES: [&str; 3] = ["classic", "cascade", "scatter_boost"];

/// Tolerance for denomination arithmetic on f64 amounts
const AMOUNT_EPSILON: f64 = 1e-9;

fn is_multiple(value: f64, step: f64) -> bool {
    let ratio = value / step;
    (ratio - ratio.round()).abs() < AMOUNT_EPSILON
}

// ═══════════════════════════════════════════════════════════════════════════════
// RULE SECTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Bet range and step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetLimits {
    pub min: f64,
    pub max: f64,
    pub denomination: f64,
    pub default: f64,
}

impl BetLimits {
    /// Reject a bet outside `[min, max]` or off the denomination grid
    pub fn check(&self, bet: f64) -> SpinResult<()> {
        if !bet.is_finite() || bet < self.min - AMOUNT_EPSILON || bet > self.max + AMOUNT_EPSILON {
            return Err(SpinError::BetOutOfRange {
                bet,
                min: self.min,
                max: self.max,
            });
        }
        if !is_multiple(bet, self.denomination) {
            return Err(SpinError::BetNotDenomination {
                bet,
                denomination: self.denomination,
            });
        }
        Ok(())
    }

    /// One denomination up, capped at `max`
    pub fn raise(&self, bet: f64) -> f64 {
        let next = bet + self.denomination;
        if next > self.max + AMOUNT_EPSILON { bet } else { next }
    }

    /// One denomination down, floored at `min`
    pub fn lower(&self, bet: f64) -> f64 {
        let next = bet - self.denomination;
        if next < self.min - AMOUNT_EPSILON { bet } else { next }
    }

    fn validate(&self) -> ConfigResult<()> {
        let invalid = |msg: String| Err(ConfigError::InvalidBet(msg));

        if !(self.min.is_finite() && self.max.is_finite() && self.denomination.is_finite()) {
            return invalid("limits must be finite".into());
        }
        if self.min <= 0.0 {
            return invalid(format!("min {} must be positive", self.min));
        }
        if self.min > self.max {
            return invalid(format!("min {} exceeds max {}", self.min, self.max));
        }
        if self.denomination <= 0.0 {
            return invalid(format!("denomination {} must be positive", self.denomination));
        }
        for (label, value) in [("min", self.min), ("max", self.max), ("default", self.default)] {
            if !is_multiple(value, self.denomination) {
                return invalid(format!(
                    "{label} {value} is not a multiple of {}",
                    self.denomination
                ));
            }
        }
        if self.default < self.min || self.default > self.max {
            return invalid(format!(
                "default {} outside [{}, {}]",
                self.default, self.min, self.max
            ));
        }
        Ok(())
    }
}

impl Default for BetLimits {
    fn default() -> Self {
        Self {
            min: 10.0,
            max: 100.0,
            denomination: 10.0,
            default: 10.0,
        }
    }
}

/// Which win evaluator a game uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorMode {
    /// Multi-entry evaluator, required for cascades
    #[default]
    Cascading,
    /// One winning symbol or none; non-cascading games only
    SingleWinner,
}

fn default_max_depth() -> u32 {
    64
}

/// Cascade rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Redraw winning positions and re-evaluate
    pub enabled: bool,
    /// Upper bound on steps per spin; exceeding it is an internal error
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default)]
    pub evaluator: EvaluatorMode,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: default_max_depth(),
            evaluator: EvaluatorMode::Cascading,
        }
    }
}

/// Multiplier each free spin starts from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusMultiplierPolicy {
    /// Carry the multiplier over: from the triggering spin into the first
    /// free spin, then from each free spin into the next
    #[default]
    Retain,
    /// Every free spin starts at 1
    Reset,
    /// Every free spin starts at this boost
    Fixed(u32),
}

impl BonusMultiplierPolicy {
    /// Multiplier in effect once the bonus is entered
    pub fn entry_multiplier(&self, current: u32) -> u32 {
        match self {
            Self::Retain => current.max(1),
            Self::Reset => 1,
            Self::Fixed(value) => *value,
        }
    }
}

/// Free-spin bonus rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusConfig {
    /// Spins granted on entry
    pub free_spins: u32,
    #[serde(default)]
    pub multiplier_policy: BonusMultiplierPolicy,
    /// Spins added by a scatter trigger during the bonus (0 = no retrigger)
    #[serde(default)]
    pub retrigger_spins: u32,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            free_spins: 10,
            multiplier_policy: BonusMultiplierPolicy::Retain,
            retrigger_spins: 0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG DOCUMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Serialized config format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_reference_unit() -> f64 {
    1.0
}

fn default_starting_balance() -> f64 {
    1000.0
}

/// Complete game definition as written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub name: String,
    pub wild: Symbol,
    #[serde(default)]
    pub scatter: Option<Symbol>,
    /// Whether the scatter also forms ordinary line wins
    #[serde(default = "default_true")]
    pub scatter_pays: bool,
    /// Bet that pays the paytable value at multiplier 1
    #[serde(default = "default_reference_unit")]
    pub reference_unit: f64,
    pub paytable: BTreeMap<Symbol, f64>,
    /// One ordered strip per reel
    pub reels: Vec<Vec<Symbol>>,
    #[serde(default)]
    pub bet: BetLimits,
    #[serde(default)]
    pub cascade: CascadeConfig,
    #[serde(default)]
    pub bonus: Option<BonusConfig>,
    #[serde(default = "default_starting_balance")]
    pub starting_balance: f64,
}

impl GameConfig {
    // ---- Presets ----

    /// Nine equally weighted symbols, single-winner evaluation, no cascades
    pub fn classic() -> Self {
        use Symbol::*;

        let strip = vec![Banana, Seven, Cherry, Plum, Orange, Bell, Bar, Lemon, Melon];
        Self {
            name: "classic".into(),
            wild: Bell,
            scatter: None,
            scatter_pays: true,
            reference_unit: 1.0,
            paytable: BTreeMap::from([
                (Bell, 200.0),
                (Seven, 100.0),
                (Bar, 50.0),
                (Melon, 30.0),
                (Orange, 20.0),
                (Plum, 15.0),
                (Cherry, 10.0),
                (Lemon, 5.0),
                (Banana, 5.0),
            ]),
            reels: vec![strip.clone(), strip.clone(), strip],
            bet: BetLimits::default(),
            cascade: CascadeConfig {
                enabled: false,
                max_depth: default_max_depth(),
                evaluator: EvaluatorMode::SingleWinner,
            },
            bonus: None,
            starting_balance: 1000.0,
        }
    }

    /// Weighted 17/22/17 strips with cascades and a 10-spin bonus.
    ///
    /// Sevens both pay and scatter here, so three sevens always cascade away
    /// and no final line can hold them: the bonus is configured but never
    /// reached. Use [`GameConfig::scatter_boost`] for a reachable bonus.
    pub fn cascade() -> Self {
        use Symbol::*;

        let outer = expand(&[
            (Cherry, 1),
            (Plum, 1),
            (Orange, 1),
            (Melon, 3),
            (Seven, 2),
            (Bar, 3),
            (Bell, 4),
            (Banana, 1),
            (Lemon, 1),
        ]);
        let middle = expand(&[
            (Cherry, 1),
            (Plum, 1),
            (Orange, 1),
            (Melon, 1),
            (Seven, 1),
            (Bar, 1),
            (Bell, 14),
            (Banana, 1),
            (Lemon, 1),
        ]);

        Self {
            name: "cascade".into(),
            wild: Bell,
            scatter: Some(Seven),
            scatter_pays: true,
            reference_unit: 10.0,
            paytable: BTreeMap::from([
                (Bell, 30.0),
                (Bar, 15.0),
                (Melon, 12.0),
                (Orange, 8.0),
                (Plum, 6.0),
                (Cherry, 5.0),
                (Lemon, 3.0),
                (Banana, 3.0),
                (Seven, 2.0),
            ]),
            reels: vec![outer.clone(), middle, outer],
            bet: BetLimits::default(),
            cascade: CascadeConfig::default(),
            bonus: Some(BonusConfig::default()),
            starting_balance: 1000.0,
        }
    }

    /// Extra sevens (19/24/19), scatter only triggers, fixed ×3 free spins
    pub fn scatter_boost() -> Self {
        use Symbol::*;

        let outer = expand(&[
            (Cherry, 1),
            (Plum, 1),
            (Orange, 1),
            (Melon, 3),
            (Seven, 4),
            (Bar, 3),
            (Bell, 4),
            (Banana, 1),
            (Lemon, 1),
        ]);
        let middle = expand(&[
            (Cherry, 1),
            (Plum, 1),
            (Orange, 1),
            (Melon, 1),
            (Seven, 3),
            (Bar, 1),
            (Bell, 14),
            (Banana, 1),
            (Lemon, 1),
        ]);

        Self {
            name: "scatter_boost".into(),
            scatter_pays: false,
            reels: vec![outer.clone(), middle, outer],
            bonus: Some(BonusConfig {
                free_spins: 10,
                multiplier_policy: BonusMultiplierPolicy::Fixed(3),
                retrigger_spins: 0,
            }),
            ..Self::cascade()
        }
    }

    /// Look up a built-in preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "classic" => Some(Self::classic()),
            "cascade" => Some(Self::cascade()),
            "scatter_boost" => Some(Self::scatter_boost()),
            _ => None,
        }
    }

    // ---- Serialization ----

    /// Parse a config document
    pub fn parse(source: &str, format: ConfigFormat) -> ConfigResult<Self> {
        let config = match format {
            ConfigFormat::Json => serde_json::from_str(source)?,
            ConfigFormat::Yaml => serde_yml::from_str(source)?,
        };
        Ok(config)
    }

    /// Load a config file, format chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let source = std::fs::read_to_string(path)?;
        let config = Self::parse(&source, format)?;
        log::debug!("Loaded config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Serialize in the requested format
    pub fn render(&self, format: ConfigFormat) -> ConfigResult<String> {
        match format {
            ConfigFormat::Json => self.to_json(),
            ConfigFormat::Yaml => self.to_yaml(),
        }
    }

    // ---- Validation ----

    /// Validate without building
    pub fn validate(&self) -> ConfigResult<()> {
        self.build().map(|_| ())
    }

    /// Validate and freeze into a shareable [`Game`]
    pub fn build(&self) -> ConfigResult<Arc<Game>> {
        if self.reels.len() != REEL_COUNT {
            return Err(ConfigError::ReelCount {
                expected: REEL_COUNT,
                found: self.reels.len(),
            });
        }

        let mut strips = Vec::with_capacity(REEL_COUNT);
        for (reel, symbols) in self.reels.iter().enumerate() {
            let strip = ReelStrip::new(reel as u8, symbols.clone())?;
            if let Some(&symbol) = strip
                .symbols()
                .iter()
                .find(|s| !self.paytable.contains_key(s))
            {
                return Err(ConfigError::MissingPay { symbol, reel });
            }
            strips.push(strip);
        }
        let strips: [ReelStrip; REEL_COUNT] =
            strips
                .try_into()
                .map_err(|v: Vec<ReelStrip>| ConfigError::ReelCount {
                    expected: REEL_COUNT,
                    found: v.len(),
                })?;

        let paytable = PayTable::new(
            self.paytable.clone(),
            self.wild,
            self.scatter,
            self.scatter_pays,
        )?;

        if !self.reference_unit.is_finite() || self.reference_unit <= 0.0 {
            return Err(ConfigError::InvalidReferenceUnit(self.reference_unit));
        }

        self.bet.validate()?;

        if self.cascade.max_depth == 0 {
            return Err(ConfigError::InvalidCascade(
                "max_depth must be at least 1".into(),
            ));
        }
        if self.cascade.enabled && self.cascade.evaluator == EvaluatorMode::SingleWinner {
            return Err(ConfigError::InvalidCascade(
                "single_winner evaluator cannot drive cascades".into(),
            ));
        }

        if let Some(bonus) = &self.bonus {
            if self.scatter.is_none() {
                return Err(ConfigError::InvalidBonus(
                    "bonus requires a scatter symbol".into(),
                ));
            }
            if bonus.free_spins == 0 {
                return Err(ConfigError::InvalidBonus(
                    "free_spins must be at least 1".into(),
                ));
            }
            if bonus.multiplier_policy == BonusMultiplierPolicy::Fixed(0) {
                return Err(ConfigError::InvalidBonus(
                    "fixed multiplier must be at least 1".into(),
                ));
            }
        }

        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            return Err(ConfigError::InvalidBalance(self.starting_balance));
        }

        Ok(Arc::new(Game {
            name: self.name.clone(),
            paytable,
            strips,
            reference_unit: self.reference_unit,
            bet: self.bet,
            cascade: self.cascade,
            bonus: self.bonus,
            starting_balance: self.starting_balance,
        }))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::cascade()
    }
}

fn expand(runs: &[(Symbol, usize)]) -> Vec<Symbol> {
    runs.iter()
        .flat_map(|&(symbol, n)| std::iter::repeat_n(symbol, n))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALIDATED GAME
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable, validated game definition shared by every component
#[derive(Debug, Clone)]
pub struct Game {
    name: String,
    paytable: PayTable,
    strips: [ReelStrip; REEL_COUNT],
    reference_unit: f64,
    bet: BetLimits,
    cascade: CascadeConfig,
    bonus: Option<BonusConfig>,
    starting_balance: f64,
}

impl Game {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn paytable(&self) -> &PayTable {
        &self.paytable
    }

    pub fn strips(&self) -> &[ReelStrip; REEL_COUNT] {
        &self.strips
    }

    pub fn reference_unit(&self) -> f64 {
        self.reference_unit
    }

    pub fn bet_limits(&self) -> &BetLimits {
        &self.bet
    }

    pub fn cascade(&self) -> &CascadeConfig {
        &self.cascade
    }

    pub fn evaluator(&self) -> EvaluatorMode {
        self.cascade.evaluator
    }

    pub fn bonus(&self) -> Option<&BonusConfig> {
        self.bonus.as_ref()
    }

    pub fn starting_balance(&self) -> f64 {
        self.starting_balance
    }

    /// Total base-line combinations (product of strip lengths)
    pub fn total_combinations(&self) -> u64 {
        self.strips.iter().map(|s| s.len() as u64).product()
    }
}

//! Configuration types for the engine and its instrument.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{L2BookError, MarketPair, Result, constants};

/// Per-instrument trading rules. Every limit is optional; `None` means
/// unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Base asset (e.g., "BTC").
    pub base: String,
    /// Quote asset (e.g., "USDT").
    pub quote: String,
    /// Price granularity.
    #[serde(default)]
    pub tick_size: Option<Decimal>,
    /// Volume granularity.
    #[serde(default)]
    pub lot_size: Option<Decimal>,
    /// Smallest accepted order volume.
    #[serde(default)]
    pub min_order_volume: Option<Decimal>,
    /// Largest accepted order volume.
    #[serde(default)]
    pub max_order_volume: Option<Decimal>,
}

impl MarketConfig {
    /// An instrument with no tick, lot, or size restrictions.
    #[must_use]
    pub fn unrestricted(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
            tick_size: None,
            lot_size: None,
            min_order_volume: None,
            max_order_volume: None,
        }
    }

    /// A BTC/USDT market with exchange-style granularity.
    #[must_use]
    pub fn btc_usdt() -> Self {
        Self {
            base: "BTC".to_string(),
            quote: "USDT".to_string(),
            tick_size: Some(Decimal::new(1, 2)),        // 0.01 USDT
            lot_size: Some(Decimal::new(1, 5)),         // 0.00001 BTC
            min_order_volume: Some(Decimal::new(1, 5)), // 0.00001 BTC
            max_order_volume: None,
        }
    }

    #[must_use]
    pub fn pair(&self) -> MarketPair {
        MarketPair::new(self.base.clone(), self.quote.clone())
    }

    /// Returns the market symbol (e.g., "BTC/USDT").
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    /// Reject non-positive granularities and inverted size bounds.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tick_size", self.tick_size),
            ("lot_size", self.lot_size),
            ("min_order_volume", self.min_order_volume),
            ("max_order_volume", self.max_order_volume),
        ] {
            match value {
                Some(v) if v <= Decimal::ZERO => {
                    return Err(L2BookError::Configuration(format!(
                        "{name} must be positive, got {v}"
                    )));
                }
                _ => {}
            }
        }
        match (self.min_order_volume, self.max_order_volume) {
            (Some(min), Some(max)) if min > max => Err(L2BookError::Configuration(format!(
                "min_order_volume {min} exceeds max_order_volume {max}"
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self::unrestricted("BASE", "QUOTE")
    }
}

fn default_ledger_capacity() -> usize {
    constants::DEFAULT_LEDGER_CAPACITY
}

fn default_check_invariants() -> bool {
    true
}

/// Configuration for a single engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The instrument this engine trades.
    #[serde(default)]
    pub market: MarketConfig,
    /// Initial capacity reserved for the execution ledger.
    #[serde(default = "default_ledger_capacity")]
    pub ledger_capacity: usize,
    /// Verify the book is not crossed after every submission.
    #[serde(default = "default_check_invariants")]
    pub check_invariants: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            ledger_capacity: constants::DEFAULT_LEDGER_CAPACITY,
            check_invariants: true,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn for_market(market: MarketConfig) -> Self {
        Self {
            market,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| L2BookError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.market.validate()
    }
}

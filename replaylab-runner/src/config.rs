//! Backtest configuration file.
//!
//! TOML by default, JSON when the file extension is `.json`:
//!
//! ```toml
//! [data]
//! csv_path = "data/SPY.csv"
//! symbol = "SPY"
//!
//! [backtest]
//! initial_capital = 100000.0
//! slippage_bps = 5.0
//! commission_per_trade = 1.0
//!
//! [strategies.ma]
//! short_window = 10
//! long_window = 30
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use replaylab_core::domain::MAX_QUANTITY;
use replaylab_core::engine::{EngineConfig, DEFAULT_WINDOW_BARS};
use replaylab_core::execution::ExecutionSimulator;
use replaylab_core::portfolio::CashPolicy;
use replaylab_core::sizers::fixed_fraction::{DEFAULT_FRACTION, DEFAULT_REFERENCE_PRICE};
use replaylab_core::sizers::FixedFractionSizer;
use replaylab_core::strategy::{create_strategy, FactoryError, StrategyConfig};

/// Sell fills are marked down by half the slippage; at this many basis
/// points the sell price reaches zero.
pub const MAX_SLIPPAGE_BPS: f64 = 20_000.0;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("no strategy configured under [strategies]")]
    NoStrategy,
    #[error("several strategies configured ({0}); set backtest.active_strategy")]
    AmbiguousStrategy(String),
    #[error("active_strategy '{0}' is not configured under [strategies]")]
    UnknownActiveStrategy(String),
    #[error("strategy config error: {0}")]
    Strategy(#[from] FactoryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestConfig {
    pub data: DataSection,
    pub backtest: BacktestSection,
    #[serde(default)]
    pub strategies: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSection {
    pub csv_path: PathBuf,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestSection {
    pub initial_capital: f64,
    pub slippage_bps: f64,
    pub commission_per_trade: f64,
    #[serde(default)]
    pub cash_policy: CashPolicy,
    #[serde(default = "default_sizing_fraction")]
    pub sizing_fraction: f64,
    #[serde(default = "default_sizing_reference_price")]
    pub sizing_reference_price: f64,
    #[serde(default = "default_window_bars")]
    pub window_bars: usize,
    /// Annual risk-free rate used by the Sharpe ratio.
    #[serde(default)]
    pub risk_free_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_strategy: Option<String>,
}

fn default_sizing_fraction() -> f64 {
    DEFAULT_FRACTION
}

fn default_sizing_reference_price() -> f64 {
    DEFAULT_REFERENCE_PRICE
}

fn default_window_bars() -> usize {
    DEFAULT_WINDOW_BARS
}

impl BacktestConfig {
    /// Read and validate a config file. A relative `csv_path` is resolved
    /// against the config file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut config = if is_json {
            Self::from_json_str(&contents)?
        } else {
            Self::from_toml_str(&contents)?
        };

        if config.data.csv_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.data.csv_path = dir.join(&config.data.csv_path);
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.backtest;
        if self.data.symbol.trim().is_empty() {
            return Err(invalid("data.symbol", "must not be empty"));
        }
        if !(b.initial_capital.is_finite() && b.initial_capital > 0.0) {
            return Err(invalid("backtest.initial_capital", "must be a positive number"));
        }
        if !(b.slippage_bps.is_finite() && (0.0..MAX_SLIPPAGE_BPS).contains(&b.slippage_bps)) {
            return Err(invalid(
                "backtest.slippage_bps",
                &format!("must lie in [0, {MAX_SLIPPAGE_BPS})"),
            ));
        }
        if !(b.commission_per_trade.is_finite() && b.commission_per_trade >= 0.0) {
            return Err(invalid("backtest.commission_per_trade", "must be non-negative"));
        }
        if !(b.sizing_fraction.is_finite() && b.sizing_fraction > 0.0 && b.sizing_fraction <= 1.0)
        {
            return Err(invalid("backtest.sizing_fraction", "must lie in (0, 1]"));
        }
        if !(b.sizing_reference_price.is_finite() && b.sizing_reference_price > 0.0) {
            return Err(invalid("backtest.sizing_reference_price", "must be positive"));
        }
        if b.initial_capital * b.sizing_fraction / b.sizing_reference_price >= MAX_QUANTITY as f64 {
            return Err(invalid(
                "backtest.sizing_reference_price",
                "initial sizing exceeds the maximum order quantity",
            ));
        }
        if b.window_bars == 0 {
            return Err(invalid("backtest.window_bars", "must be > 0"));
        }
        if !b.risk_free_rate.is_finite() {
            return Err(invalid("backtest.risk_free_rate", "must be finite"));
        }
        create_strategy(&self.strategy_config()?)?;
        Ok(())
    }

    /// Key of the active entry under `[strategies]`.
    pub fn active_strategy_name(&self) -> Result<&str, ConfigError> {
        if let Some(active) = &self.backtest.active_strategy {
            return self
                .strategies
                .get_key_value(active.as_str())
                .map(|(name, _)| name.as_str())
                .ok_or_else(|| ConfigError::UnknownActiveStrategy(active.clone()));
        }
        let mut names = self.strategies.keys();
        match (names.next(), names.next()) {
            (None, _) => Err(ConfigError::NoStrategy),
            (Some(name), None) => Ok(name.as_str()),
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousStrategy(
                self.strategies
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }

    /// Typed parameters of the active strategy.
    pub fn strategy_config(&self) -> Result<StrategyConfig, ConfigError> {
        let name = self.active_strategy_name()?;
        let params = &self.strategies[name];
        Ok(StrategyConfig::from_named(name, params)?)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.backtest.initial_capital)
            .with_cash_policy(self.backtest.cash_policy)
            .with_window_bars(self.backtest.window_bars)
    }

    pub fn sizer(&self) -> FixedFractionSizer {
        FixedFractionSizer::new(
            self.backtest.sizing_fraction,
            self.backtest.sizing_reference_price,
        )
    }

    pub fn execution(&self) -> ExecutionSimulator {
        ExecutionSimulator::with_bps(
            self.backtest.slippage_bps,
            self.backtest.commission_per_trade,
        )
    }

    /// Deterministic BLAKE3 hash of the resolved configuration.
    ///
    /// Two runs with identical configs share the same RunId. Entries under
    /// `[strategies]` that are not active do not contribute.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        self.run_id_with(&self.strategy_config()?)
    }

    /// RunId of this config with `strategy` substituted for the active one.
    pub fn run_id_with(&self, strategy: &StrategyConfig) -> Result<RunId, ConfigError> {
        let fingerprint = RunFingerprint {
            data: &self.data,
            backtest: &self.backtest,
            strategy,
        };
        let json = serde_json::to_string(&fingerprint)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[derive(Serialize)]
struct RunFingerprint<'a> {
    data: &'a DataSection,
    backtest: &'a BacktestSection,
    strategy: &'a StrategyConfig,
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

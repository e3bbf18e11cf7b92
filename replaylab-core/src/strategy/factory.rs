//! Strategy factory: converts a `StrategyConfig` into a boxed [`Strategy`].
//!
//! Configs arrive either already typed (serde-tagged with `type`) or as a
//! `name → params` pair from a config file, resolved by
//! [`StrategyConfig::from_named`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{MovingAverageCrossover, RsiReversion, Strategy, VolumeBreakout};

// ─── Error type ──────────────────────────────────────────────────────

/// Errors that can occur during strategy construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("invalid parameters for {strategy}: {message}")]
    InvalidParams { strategy: String, message: String },
    #[error("{strategy}: {message}")]
    Rejected { strategy: String, message: String },
    #[error("{strategy} has no parameter named '{param}'")]
    UnknownParam { strategy: String, param: String },
}

// ─── Config ──────────────────────────────────────────────────────────

/// Typed strategy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum StrategyConfig {
    MaCrossover {
        #[serde(default = "default_short_window")]
        short_window: usize,
        #[serde(default = "default_long_window")]
        long_window: usize,
    },
    RsiReversion {
        #[serde(default = "default_rsi_window")]
        window: usize,
        #[serde(default = "default_oversold")]
        oversold: f64,
        #[serde(default = "default_overbought")]
        overbought: f64,
    },
    VolumeBreakout {
        #[serde(default = "default_volume_window")]
        window: usize,
        #[serde(default = "default_volume_multiplier")]
        volume_multiplier: f64,
    },
}

fn default_short_window() -> usize {
    10
}
fn default_long_window() -> usize {
    30
}
fn default_rsi_window() -> usize {
    14
}
fn default_oversold() -> f64 {
    30.0
}
fn default_overbought() -> f64 {
    70.0
}
fn default_volume_window() -> usize {
    20
}
fn default_volume_multiplier() -> f64 {
    1.5
}

/// Map a config-file strategy name (or alias) to its canonical tag.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    match name.trim().to_ascii_lowercase().as_str() {
        "ma" | "ma_crossover" => Some("ma_crossover"),
        "rsi" | "rsi_reversion" => Some("rsi_reversion"),
        "volume" | "volume_breakout" => Some("volume_breakout"),
        _ => None,
    }
}

impl StrategyConfig {
    /// Build from a named entry, e.g. `ma = { short_window = 5, long_window = 20 }`.
    /// Missing parameters take their defaults.
    pub fn from_named(name: &str, params: &Value) -> Result<Self, FactoryError> {
        let tag =
            canonical_name(name).ok_or_else(|| FactoryError::UnknownStrategy(name.to_string()))?;
        let mut object = match params {
            Value::Object(map) => map.clone(),
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(FactoryError::InvalidParams {
                    strategy: tag.to_string(),
                    message: format!("expected a table of parameters, got {other}"),
                })
            }
        };
        object.insert("type".into(), Value::String(tag.to_string()));
        serde_json::from_value(Value::Object(object)).map_err(|e| FactoryError::InvalidParams {
            strategy: tag.to_string(),
            message: e.to_string(),
        })
    }

    /// Canonical strategy name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MaCrossover { .. } => "ma_crossover",
            Self::RsiReversion { .. } => "rsi_reversion",
            Self::VolumeBreakout { .. } => "volume_breakout",
        }
    }

    /// Copy with one parameter overridden. Integer parameters take the value
    /// truncated toward zero.
    pub fn with_param(&self, param: &str, value: f64) -> Result<Self, FactoryError> {
        let Value::Object(mut object) =
            serde_json::to_value(self).map_err(|e| FactoryError::InvalidParams {
                strategy: self.name().to_string(),
                message: e.to_string(),
            })?
        else {
            return Err(FactoryError::InvalidParams {
                strategy: self.name().to_string(),
                message: "config did not serialize to an object".into(),
            });
        };

        let replacement = match object.get(param) {
            Some(Value::Number(n)) if n.is_u64() || n.is_i64() => {
                if value < 0.0 {
                    return Err(FactoryError::Rejected {
                        strategy: self.name().to_string(),
                        message: format!("{param} must be non-negative, got {value}"),
                    });
                }
                Value::from(value.trunc() as u64)
            }
            Some(Value::Number(_)) => serde_json::Number::from_f64(value)
                .map(Value::Number)
                .ok_or_else(|| FactoryError::Rejected {
                    strategy: self.name().to_string(),
                    message: format!("{param} must be finite, got {value}"),
                })?,
            _ => {
                return Err(FactoryError::UnknownParam {
                    strategy: self.name().to_string(),
                    param: param.to_string(),
                })
            }
        };
        object.insert(param.to_string(), replacement);
        serde_json::from_value(Value::Object(object)).map_err(|e| FactoryError::InvalidParams {
            strategy: self.name().to_string(),
            message: e.to_string(),
        })
    }
}

// ─── Factory ─────────────────────────────────────────────────────────

fn reject(strategy: &str, message: impl Into<String>) -> FactoryError {
    FactoryError::Rejected {
        strategy: strategy.to_string(),
        message: message.into(),
    }
}

/// Validate parameters and build the strategy.
pub fn create_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy>, FactoryError> {
    let name = config.name();
    match *config {
        StrategyConfig::MaCrossover {
            short_window,
            long_window,
        } => {
            if short_window == 0 {
                return Err(reject(name, "short_window must be > 0"));
            }
            if short_window >= long_window {
                return Err(reject(
                    name,
                    format!("short_window ({short_window}) must be < long_window ({long_window})"),
                ));
            }
            Ok(Box::new(MovingAverageCrossover::new(short_window, long_window)))
        }
        StrategyConfig::RsiReversion {
            window,
            oversold,
            overbought,
        } => {
            if window == 0 {
                return Err(reject(name, "window must be > 0"));
            }
            if !(0.0..=100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
                return Err(reject(name, "thresholds must lie in [0, 100]"));
            }
            if oversold >= overbought {
                return Err(reject(
                    name,
                    format!("oversold ({oversold}) must be < overbought ({overbought})"),
                ));
            }
            Ok(Box::new(RsiReversion::new(window, oversold, overbought)))
        }
        StrategyConfig::VolumeBreakout {
            window,
            volume_multiplier,
        } => {
            if window == 0 {
                return Err(reject(name, "window must be > 0"));
            }
            if !(volume_multiplier.is_finite() && volume_multiplier > 0.0) {
                return Err(reject(name, "volume_multiplier must be positive"));
            }
            Ok(Box::new(VolumeBreakout::new(window, volume_multiplier)))
        }
    }
}

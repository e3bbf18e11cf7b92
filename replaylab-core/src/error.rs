//! Per-event error type raised inside the simulation loop.
//!
//! None of these are expected in correct operation. A run that hits one is
//! aborted: the error usually points at a sizing or strategy defect, so it is
//! surfaced instead of skipped.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("order for '{symbol}' has non-positive quantity")]
    NonPositiveQuantity { symbol: String },

    #[error("order quantity {quantity} for '{symbol}' exceeds the maximum position size")]
    QuantityTooLarge { symbol: String, quantity: u64 },

    #[error("position in '{symbol}' would overflow ({position} + {delta})")]
    PositionOverflow {
        symbol: String,
        position: i64,
        delta: i64,
    },

    #[error("invalid market price {price} for '{symbol}'")]
    InvalidPrice { symbol: String, price: f64 },

    #[error("invalid commission {commission} for '{symbol}'")]
    InvalidCommission { symbol: String, commission: f64 },

    #[error("signal strength {strength} outside [0, 1] for '{symbol}'")]
    InvalidStrength { symbol: String, strength: f64 },

    #[error("no market data available to fill order for '{symbol}'")]
    NoMarketData { symbol: String },
}

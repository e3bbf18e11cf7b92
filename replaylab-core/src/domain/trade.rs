//! TradeRecord: append-only log entry written for every applied fill.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::event::{FillEvent, OrderSide};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub quantity: u64,
    pub direction: OrderSide,
    pub fill_price: f64,
    pub commission: f64,
    /// Gross P&L realized by the part of this fill that closed existing
    /// exposure. Zero for fills that only open or add.
    pub realized_pnl: f64,
}

impl TradeRecord {
    pub fn from_fill(fill: &FillEvent, realized_pnl: f64) -> Self {
        Self {
            symbol: fill.symbol().to_string(),
            timestamp: fill.timestamp(),
            quantity: fill.quantity(),
            direction: fill.side(),
            fill_price: fill.fill_price(),
            commission: fill.commission(),
            realized_pnl,
        }
    }

    pub fn notional(&self) -> f64 {
        self.quantity as f64 * self.fill_price
    }
}

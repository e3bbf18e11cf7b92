//! Slippage models: price concession paid on a fill
//!
//! Slippage is directional: buyers fill above the market, sellers below it.

use crate::domain::OrderSide;

/// Slippage model: computes the price-unit concession for one fill.
pub trait SlippageModel: Send + Sync {
    /// Non-negative slippage in price units for an order on `side` at `market_price`.
    fn slippage(&self, market_price: f64, side: OrderSide) -> f64;

    /// Name of this model
    fn name(&self) -> &str;
}

/// Buy-side multiplier on the base slippage.
pub const BUY_MULTIPLIER: f64 = 1.5;
/// Sell-side multiplier on the base slippage.
pub const SELL_MULTIPLIER: f64 = 0.5;

/// Basis-point slippage that penalises buys three times harder than sells.
///
/// slippage = price × bps / 10_000 × (1.5 for BUY, 0.5 for SELL)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsymmetricSlippage {
    pub bps: f64,
}

impl AsymmetricSlippage {
    pub fn new(bps: f64) -> Self {
        Self { bps }
    }
}

impl SlippageModel for AsymmetricSlippage {
    fn slippage(&self, market_price: f64, side: OrderSide) -> f64 {
        let base = market_price * (self.bps / 10_000.0);
        match side {
            OrderSide::Buy => base * BUY_MULTIPLIER,
            OrderSide::Sell => base * SELL_MULTIPLIER,
        }
    }

    fn name(&self) -> &str {
        "AsymmetricSlippage"
    }
}

//! Execution simulator: fills every market order immediately and in full.

use tracing::info;

use crate::domain::{FillEvent, OrderEvent, OrderSide};
use crate::error::ExecutionError;

use super::slippage::{AsymmetricSlippage, SlippageModel};

pub struct ExecutionSimulator {
    slippage: Box<dyn SlippageModel>,
    commission_per_trade: f64,
}

impl ExecutionSimulator {
    pub fn new(slippage: Box<dyn SlippageModel>, commission_per_trade: f64) -> Self {
        Self {
            slippage,
            commission_per_trade,
        }
    }

    /// Asymmetric basis-point slippage plus a flat commission.
    pub fn with_bps(slippage_bps: f64, commission_per_trade: f64) -> Self {
        Self::new(
            Box::new(AsymmetricSlippage::new(slippage_bps)),
            commission_per_trade,
        )
    }

    /// Fill `order` at `market_price` adjusted for slippage. No partial fills,
    /// no rejection, no latency.
    pub fn execute(
        &self,
        order: &OrderEvent,
        market_price: f64,
    ) -> Result<FillEvent, ExecutionError> {
        if order.quantity() == 0 {
            return Err(ExecutionError::NonPositiveQuantity {
                symbol: order.symbol().to_string(),
            });
        }
        if !market_price.is_finite() || market_price <= 0.0 {
            return Err(ExecutionError::InvalidPrice {
                symbol: order.symbol().to_string(),
                price: market_price,
            });
        }

        let slip = self.slippage.slippage(market_price, order.side());
        let fill_price = match order.side() {
            OrderSide::Buy => market_price + slip,
            OrderSide::Sell => market_price - slip,
        };
        let fill = FillEvent::from_order(order, fill_price, self.commission_per_trade)?;

        info!(
            symbol = fill.symbol(),
            side = %fill.side(),
            quantity = fill.quantity(),
            market_price,
            fill_price,
            commission = fill.commission(),
            model = self.slippage.name(),
            "order filled"
        );
        Ok(fill)
    }
}

impl std::fmt::Debug for ExecutionSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionSimulator")
            .field("slippage", &self.slippage.name())
            .field("commission_per_trade", &self.commission_per_trade)
            .finish()
    }
}

//! Portfolio ledger: the single authoritative cash/holdings/trades state.
//!
//! `execute_fill` is the only mutation path for holdings and statistics.
//! Everything else is a query or a snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Bar, FillEvent, Holding, Symbol, TradeRecord};
use crate::error::ExecutionError;

use super::snapshot::{PerformanceSnapshot, PortfolioSnapshot};
use super::stats::PortfolioStats;

/// What happens to cash when a new bar is marked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashPolicy {
    /// Cash is restored to initial capital on every bar; fills only move it
    /// within the bar being processed.
    #[default]
    ResetEachBar,
    /// Cash accumulates across bars like a real account.
    CarryForward,
}

#[derive(Debug, Clone)]
pub struct PortfolioLedger {
    initial_capital: f64,
    cash: f64,
    cash_policy: CashPolicy,
    holdings: BTreeMap<Symbol, Holding>,
    last_prices: BTreeMap<Symbol, f64>,
    trades: Vec<TradeRecord>,
    stats: PortfolioStats,
}

impl PortfolioLedger {
    pub fn new(initial_capital: f64, cash_policy: CashPolicy) -> Self {
        Self {
            initial_capital,
            cash: initial_capital,
            cash_policy,
            holdings: BTreeMap::new(),
            last_prices: BTreeMap::new(),
            trades: Vec::new(),
            stats: PortfolioStats::default(),
        }
    }

    /// Record the bar's close as the symbol's price and apply the cash policy.
    /// Called once per Market event, before the strategy runs.
    pub fn mark_to_market(&mut self, bar: &Bar) {
        self.last_prices.insert(bar.symbol.clone(), bar.close);
        if self.cash_policy == CashPolicy::ResetEachBar {
            self.cash = self.initial_capital;
        }
    }

    /// Apply a fill and return the trade record it produced.
    ///
    /// Quantity moves by ±fill quantity. Adding in the same direction
    /// re-weights the average price; opening from flat or flipping sides sets
    /// it to the fill price; a pure reduction leaves it alone; reaching zero
    /// removes the holding. A fill that would overflow the position is
    /// rejected and leaves the ledger untouched.
    pub fn execute_fill(&mut self, fill: &FillEvent) -> Result<&TradeRecord, ExecutionError> {
        let symbol = fill.symbol();
        let price = fill.fill_price();
        let old = self
            .holdings
            .get(symbol)
            .copied()
            .unwrap_or(Holding::new(0, 0.0));
        let delta = fill.signed_quantity();
        let new_quantity = old.quantity.checked_add(delta).ok_or_else(|| {
            ExecutionError::PositionOverflow {
                symbol: symbol.to_string(),
                position: old.quantity,
                delta,
            }
        })?;

        let reducing = old.quantity != 0 && old.quantity.signum() != delta.signum();
        let realized_pnl = if reducing {
            let closed = delta.unsigned_abs().min(old.quantity.unsigned_abs()) as f64;
            closed * (price - old.avg_price) * old.quantity.signum() as f64
        } else {
            0.0
        };

        if new_quantity == 0 {
            self.holdings.remove(symbol);
        } else {
            let avg_price = if old.quantity == 0 || new_quantity.signum() != old.quantity.signum()
            {
                price
            } else if !reducing {
                let old_abs = old.quantity.unsigned_abs() as f64;
                let add_abs = delta.unsigned_abs() as f64;
                (old_abs * old.avg_price + add_abs * price) / (old_abs + add_abs)
            } else {
                old.avg_price
            };
            self.holdings
                .insert(symbol.to_string(), Holding::new(new_quantity, avg_price));
        }

        self.cash -= delta as f64 * price;
        self.cash -= fill.commission();

        self.stats.total_trades += 1;
        self.stats.total_fees += fill.commission();
        if reducing {
            self.stats.record_realized(realized_pnl);
        }

        debug!(
            symbol,
            side = %fill.side(),
            quantity = fill.quantity(),
            price,
            position = new_quantity,
            cash = self.cash,
            realized_pnl,
            "fill applied"
        );

        self.trades.push(TradeRecord::from_fill(fill, realized_pnl));
        Ok(&self.trades[self.trades.len() - 1])
    }

    /// Value the book with every holding priced at `market_price`.
    pub fn calculate_performance(&self, market_price: f64) -> PerformanceSnapshot {
        let (positions_value, unrealized_pnl) =
            self.holdings
                .values()
                .fold((0.0, 0.0), |(value, pnl), holding| {
                    (
                        value + holding.market_value(market_price),
                        pnl + holding.unrealized_pnl(market_price),
                    )
                });
        PerformanceSnapshot {
            total_value: self.cash + positions_value,
            cash: self.cash,
            positions_value,
            unrealized_pnl,
        }
    }

    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            cash: self.cash,
            holdings: self.holdings.clone(),
        }
    }

    pub fn positions(&self) -> &BTreeMap<Symbol, Holding> {
        &self.holdings
    }

    pub fn position(&self, symbol: &str) -> i64 {
        self.holdings.get(symbol).map_or(0, |h| h.quantity)
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn cash_policy(&self) -> CashPolicy {
        self.cash_policy
    }

    /// Close recorded by the most recent `mark_to_market` for `symbol`.
    pub fn last_price(&self, symbol: &str) -> Option<f64> {
        self.last_prices.get(symbol).copied()
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn stats(&self) -> PortfolioStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_bars;
    use crate::domain::OrderSide;
    use chrono::NaiveDate;

    fn fill(side: OrderSide, quantity: u64, price: f64) -> FillEvent {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        FillEvent::new("TEST", ts, quantity, side, price, 1.0).unwrap()
    }

    fn ledger() -> PortfolioLedger {
        PortfolioLedger::new(100_000.0, CashPolicy::CarryForward)
    }

    #[test]
    fn test_weighted_average_then_close() {
        let mut ledger = ledger();
        ledger.execute_fill(&fill(OrderSide::Buy, 10, 50.0)).unwrap();
        assert_eq!(ledger.positions()["TEST"], Holding::new(10, 50.0));

        ledger.execute_fill(&fill(OrderSide::Buy, 10, 60.0)).unwrap();
        assert_eq!(ledger.positions()["TEST"], Holding::new(20, 55.0));

        ledger.execute_fill(&fill(OrderSide::Sell, 20, 70.0)).unwrap();
        assert!(ledger.positions().is_empty());
        assert_eq!(ledger.position("TEST"), 0);
    }

    #[test]
    fn test_cash_moves_with_fills_and_commission() {
        let mut ledger = ledger();
        ledger.execute_fill(&fill(OrderSide::Buy, 10, 50.0)).unwrap();
        assert_eq!(ledger.cash(), 100_000.0 - 500.0 - 1.0);
        ledger.execute_fill(&fill(OrderSide::Sell, 10, 55.0)).unwrap();
        assert_eq!(ledger.cash(), 100_000.0 - 500.0 - 1.0 + 550.0 - 1.0);

        let stats = ledger.stats();
        assert_eq!(stats.total_trades, 2);
        assert_eq!(stats.total_fees, 2.0);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.gross_wins, 50.0);
        assert_eq!(ledger.trades().len(), 2);
        assert_eq!(ledger.trades()[1].realized_pnl, 50.0);
    }

    #[test]
    fn test_partial_reduction_keeps_average() {
        let mut ledger = ledger();
        ledger.execute_fill(&fill(OrderSide::Buy, 10, 50.0)).unwrap();
        let trade = ledger.execute_fill(&fill(OrderSide::Sell, 4, 45.0)).unwrap().clone();
        assert_eq!(trade.realized_pnl, -20.0);
        assert_eq!(ledger.positions()["TEST"], Holding::new(6, 50.0));
        assert_eq!(ledger.stats().losses, 1);
        assert_eq!(ledger.stats().gross_losses, 20.0);
    }

    #[test]
    fn test_flip_sets_fill_price() {
        let mut ledger = ledger();
        ledger.execute_fill(&fill(OrderSide::Buy, 10, 50.0)).unwrap();
        ledger.execute_fill(&fill(OrderSide::Sell, 15, 40.0)).unwrap();
        assert_eq!(ledger.positions()["TEST"], Holding::new(-5, 40.0));
        // only the 10 long shares realize
        assert_eq!(ledger.trades()[1].realized_pnl, -100.0);
    }

    #[test]
    fn test_short_round_trip() {
        let mut ledger = ledger();
        ledger.execute_fill(&fill(OrderSide::Sell, 10, 50.0)).unwrap();
        ledger.execute_fill(&fill(OrderSide::Sell, 10, 40.0)).unwrap();
        assert_eq!(ledger.positions()["TEST"], Holding::new(-20, 45.0));
        let trade = ledger.execute_fill(&fill(OrderSide::Buy, 20, 30.0)).unwrap().clone();
        assert_eq!(trade.realized_pnl, 300.0);
        assert!(ledger.positions().is_empty());
    }

    #[test]
    fn test_reset_policy_restores_cash_each_bar() {
        let bars = test_bars(&[50.0, 51.0]);
        let mut ledger = PortfolioLedger::new(10_000.0, CashPolicy::ResetEachBar);
        ledger.mark_to_market(&bars[0]);
        ledger.execute_fill(&fill(OrderSide::Buy, 10, 50.0)).unwrap();
        assert_eq!(ledger.cash(), 10_000.0 - 501.0);

        ledger.mark_to_market(&bars[1]);
        assert_eq!(ledger.cash(), 10_000.0);
        assert_eq!(ledger.position("TEST"), 10);
        assert_eq!(ledger.last_price("TEST"), Some(51.0));
    }

    #[test]
    fn test_carry_forward_keeps_cash() {
        let bars = test_bars(&[50.0, 51.0]);
        let mut ledger = ledger();
        ledger.mark_to_market(&bars[0]);
        ledger.execute_fill(&fill(OrderSide::Buy, 10, 50.0)).unwrap();
        ledger.mark_to_market(&bars[1]);
        assert_eq!(ledger.cash(), 100_000.0 - 501.0);
    }

    #[test]
    fn test_calculate_performance() {
        let mut ledger = ledger();
        ledger.execute_fill(&fill(OrderSide::Buy, 10, 50.0)).unwrap();
        let perf = ledger.calculate_performance(60.0);
        assert_eq!(perf.cash, 100_000.0 - 501.0);
        assert_eq!(perf.positions_value, 600.0);
        assert_eq!(perf.total_value, 100_000.0 - 501.0 + 600.0);
        assert_eq!(perf.unrealized_pnl, 100.0);
    }

    #[test]
    fn test_position_overflow_is_rejected() {
        let mut ledger = ledger();
        let max = crate::domain::MAX_QUANTITY;
        ledger.execute_fill(&fill(OrderSide::Buy, max, 1.0)).unwrap();
        let cash = ledger.cash();

        let err = ledger.execute_fill(&fill(OrderSide::Buy, 1, 1.0)).unwrap_err();
        assert_eq!(
            err,
            ExecutionError::PositionOverflow {
                symbol: "TEST".into(),
                position: i64::MAX,
                delta: 1,
            }
        );
        assert_eq!(ledger.position("TEST"), i64::MAX);
        assert_eq!(ledger.cash(), cash);
        assert_eq!(ledger.trades().len(), 1);
        assert_eq!(ledger.stats().total_trades, 1);

        // reducing from the extreme still works
        ledger.execute_fill(&fill(OrderSide::Sell, max, 1.0)).unwrap();
        assert_eq!(ledger.position("TEST"), 0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut ledger = ledger();
        ledger.execute_fill(&fill(OrderSide::Buy, 10, 50.0)).unwrap();
        let snapshot = ledger.snapshot();
        ledger.execute_fill(&fill(OrderSide::Sell, 10, 50.0)).unwrap();
        assert_eq!(snapshot.position("TEST"), 10);
        assert_eq!(ledger.position("TEST"), 0);
    }
}

//! Owned, read-only views of the ledger.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Holding, Symbol};

/// Cash plus holdings at a point in time. Strategies receive this instead of
/// a reference into the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub cash: f64,
    pub holdings: BTreeMap<Symbol, Holding>,
}

impl PortfolioSnapshot {
    /// No holdings, only cash.
    pub fn flat(cash: f64) -> Self {
        Self {
            cash,
            holdings: BTreeMap::new(),
        }
    }

    /// Builder used to stage a position; a zero quantity leaves the map untouched.
    pub fn with_holding(mut self, symbol: impl Into<Symbol>, quantity: i64, avg_price: f64) -> Self {
        if quantity != 0 {
            self.holdings
                .insert(symbol.into(), Holding::new(quantity, avg_price));
        }
        self
    }

    /// Signed quantity held in `symbol`, 0 when flat.
    pub fn position(&self, symbol: &str) -> i64 {
        self.holdings.get(symbol).map_or(0, |h| h.quantity)
    }
}

/// Valuation at a given market price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// cash + Σ qty × price
    pub total_value: f64,
    pub cash: f64,
    pub positions_value: f64,
    /// Σ qty × (price − avg_price)
    pub unrealized_pnl: f64,
}

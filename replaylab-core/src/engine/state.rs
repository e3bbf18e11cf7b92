//! Engine configuration and run result types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{FillEvent, SignalEvent, TradeRecord};
use crate::portfolio::{CashPolicy, PortfolioSnapshot, PortfolioStats};

/// Default number of trailing bars handed to the strategy.
pub const DEFAULT_WINDOW_BARS: usize = 500;

/// Configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub initial_capital: f64,
    pub cash_policy: CashPolicy,
    /// Trailing window length; raised to the strategy's lookback if smaller.
    pub window_bars: usize,
}

impl EngineConfig {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            cash_policy: CashPolicy::default(),
            window_bars: DEFAULT_WINDOW_BARS,
        }
    }

    pub fn with_cash_policy(mut self, cash_policy: CashPolicy) -> Self {
        self.cash_policy = cash_policy;
        self
    }

    pub fn with_window_bars(mut self, window_bars: usize) -> Self {
        self.window_bars = window_bars;
        self
    }
}

/// Account value sampled once per bar, after the bar's events drained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub strategy: String,
    pub signals: Vec<SignalEvent>,
    pub fills: Vec<FillEvent>,
    pub trades: Vec<TradeRecord>,
    pub stats: PortfolioStats,
    pub equity_curve: Vec<EquityPoint>,
    pub bar_count: usize,
    pub final_snapshot: PortfolioSnapshot,
}

impl RunResult {
    /// Equity values without timestamps.
    pub fn equity_values(&self) -> Vec<f64> {
        self.equity_curve.iter().map(|p| p.equity).collect()
    }
}

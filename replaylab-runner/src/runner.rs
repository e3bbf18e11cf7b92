//! Backtest runner: wires config, price data, engine, and metrics together.
//!
//! Two entry points:
//! - `run_backtest()`: loads the configured CSV, then runs. Used by the CLI.
//! - `run_with_bars()`: takes pre-loaded bars and an explicit strategy.
//!   Used by parameter sweeps so the CSV is read once.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use replaylab_core::data::{FeedError, HistoricalFeed};
use replaylab_core::domain::{Bar, FillEvent, SignalEvent, TradeRecord};
use replaylab_core::engine::{EquityPoint, SimulationEngine};
use replaylab_core::portfolio::{PortfolioSnapshot, PortfolioStats};
use replaylab_core::strategy::{create_strategy, FactoryError, StrategyConfig};
use replaylab_core::ExecutionError;

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{load_csv, LoadError};
use crate::metrics::Tearsheet;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("strategy error: {0}")]
    Strategy(#[from] FactoryError),
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),
}

/// Current schema version for persisted results.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub strategy: StrategyConfig,
    pub signals: Vec<SignalEvent>,
    pub fills: Vec<FillEvent>,
    pub stats: PortfolioStats,
    pub tearsheet: Tearsheet,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub bar_count: usize,
    pub final_snapshot: PortfolioSnapshot,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    pub fn fill_count(&self) -> usize {
        self.fills.len()
    }
}

/// Load the configured CSV and run the active strategy over it.
pub fn run_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    let bars = load_csv(&config.data.csv_path, &config.data.symbol)?;
    let strategy = config.strategy_config()?;
    run_with_bars(config, &strategy, bars)
}

/// Run `strategy` over pre-loaded bars with the rest of `config` unchanged.
///
/// No I/O. Each call owns its feed, ledger, queue, and strategy instance.
pub fn run_with_bars(
    config: &BacktestConfig,
    strategy: &StrategyConfig,
    bars: Vec<Bar>,
) -> Result<BacktestResult, RunError> {
    let run_id = config.run_id_with(strategy)?;
    let symbol = config.data.symbol.clone();
    let feed = HistoricalFeed::new(symbol.as_str(), bars)?;

    let engine = SimulationEngine::new(
        &config.engine_config(),
        Box::new(feed),
        create_strategy(strategy)?,
        Box::new(config.sizer()),
        config.execution(),
    );
    let run = engine.run()?;

    let tearsheet = Tearsheet::compute(
        &run.equity_values(),
        &run.stats,
        config.backtest.risk_free_rate,
    );
    info!(
        run_id = %short_id(&run_id),
        symbol = %symbol,
        strategy = strategy.name(),
        bars = run.bar_count,
        signals = run.signals.len(),
        fills = run.fills.len(),
        total_return_pct = tearsheet.total_return_pct,
        sharpe = tearsheet.sharpe,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        symbol,
        strategy: strategy.clone(),
        signals: run.signals,
        fills: run.fills,
        stats: run.stats,
        tearsheet,
        equity_curve: run.equity_curve,
        trades: run.trades,
        bar_count: run.bar_count,
        final_snapshot: run.final_snapshot,
    })
}

/// First 12 hex characters of a RunId, for logs and tables.
pub fn short_id(run_id: &str) -> &str {
    run_id.get(..12).unwrap_or(run_id)
}

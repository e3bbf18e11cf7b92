//! ReplayLab Runner: backtest orchestration on top of `replaylab-core`.
//!
//! This crate provides:
//! - TOML/JSON backtest configuration with a BLAKE3 run fingerprint
//! - Price CSV loading and validation
//! - Single-backtest runner with a performance tearsheet
//! - Parallel parameter sweeps
//! - Result artifacts (JSON, equity CSV, trades CSV)

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{load_csv, LoadError};
pub use export::write_artifacts;
pub use metrics::{DrawdownStats, Tearsheet};
pub use runner::{run_backtest, run_with_bars, short_id, BacktestResult, RunError};
pub use sweep::{ParamGrid, ParamGridError, ParamSweep, SweepResults};

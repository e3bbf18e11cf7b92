//! ReplayLab Core: event-driven backtest engine.
//!
//! This crate contains:
//! - Domain types (bars, the four event kinds, holdings, trade records)
//! - Market data feed with a causal window
//! - Indicators and the `Strategy` trait with three strategies
//! - Fixed-fraction order sizing and the execution simulator
//! - Portfolio ledger (cash, holdings, trade log, running statistics)
//! - Simulation engine with FIFO dispatch and pluggable event sinks

pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod portfolio;
pub mod sizers;
pub mod strategy;

pub use error::ExecutionError;

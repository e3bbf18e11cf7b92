//! Portfolio accounting: ledger, statistics, snapshots.

pub mod ledger;
pub mod snapshot;
pub mod stats;

pub use ledger::{CashPolicy, PortfolioLedger};
pub use snapshot::{PerformanceSnapshot, PortfolioSnapshot};
pub use stats::PortfolioStats;

//! Strategies: turn a causal bar window into trade intents.
//!
//! A strategy sees the window handed over by the engine (bars up to and
//! including the current one), the signals already emitted this run, and a
//! snapshot of current holdings. It never mutates anything.

pub mod factory;
pub mod ma_crossover;
pub mod rsi_reversion;
pub mod volume_breakout;

pub use factory::{create_strategy, FactoryError, StrategyConfig};
pub use ma_crossover::MovingAverageCrossover;
pub use rsi_reversion::RsiReversion;
pub use volume_breakout::VolumeBreakout;

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Direction, SignalEvent};
use crate::portfolio::PortfolioSnapshot;

/// What a strategy wants to do at the current bar.
///
/// The engine stamps it with the current bar's symbol and timestamp to build
/// a [`SignalEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalIntent {
    pub direction: Direction,
    pub strength: f64,
}

impl SignalIntent {
    pub fn long() -> Self {
        Self {
            direction: Direction::Long,
            strength: 1.0,
        }
    }

    pub fn short() -> Self {
        Self {
            direction: Direction::Short,
            strength: 1.0,
        }
    }
}

/// Signal generator contract.
///
/// # Invariants
/// - `generate_signals()` returns an empty list when `window.len() < lookback()`
/// - `generate_signals()` is deterministic for the same inputs
/// - a LONG is never emitted while already long, a SHORT never while already short
pub trait Strategy: Send + Sync {
    /// Strategy name for logging and run summaries.
    fn name(&self) -> &str;

    /// Minimum number of bars the window must hold before any signal.
    fn lookback(&self) -> usize;

    fn generate_signals(
        &self,
        window: &[Bar],
        prior_signals: &[SignalEvent],
        positions: &PortfolioSnapshot,
    ) -> Vec<SignalIntent>;
}

/// Signed position for the window's instrument (0 when flat or window empty).
pub(crate) fn current_position(window: &[Bar], positions: &PortfolioSnapshot) -> i64 {
    window
        .last()
        .map(|bar| positions.position(&bar.symbol))
        .unwrap_or(0)
}

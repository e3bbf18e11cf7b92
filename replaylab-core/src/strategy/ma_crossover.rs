//! Moving Average Crossover strategy
//!
//! Trend-following regime signal:
//! - Long when the short SMA is above the long SMA and we are not already long
//! - Short when the short SMA is below the long SMA and we are not already short
//! - Nothing when the averages are equal or the position already matches

use crate::domain::{Bar, SignalEvent};
use crate::indicators::sma;
use crate::portfolio::PortfolioSnapshot;
use crate::strategy::{current_position, SignalIntent, Strategy};

/// Moving Average Crossover
///
/// # Parameters
/// - `short_window`: fast SMA period (e.g., 10)
/// - `long_window`: slow SMA period (e.g., 30)
#[derive(Debug, Clone)]
pub struct MovingAverageCrossover {
    short_window: usize,
    long_window: usize,
}

impl MovingAverageCrossover {
    /// Parameters are validated by the factory; see [`crate::strategy::create_strategy`].
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
        }
    }
}

impl Strategy for MovingAverageCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn lookback(&self) -> usize {
        self.short_window.max(self.long_window)
    }

    fn generate_signals(
        &self,
        window: &[Bar],
        _prior_signals: &[SignalEvent],
        positions: &PortfolioSnapshot,
    ) -> Vec<SignalIntent> {
        if window.len() < self.lookback() {
            return Vec::new();
        }
        let (Some(short_ma), Some(long_ma)) =
            (sma(window, self.short_window), sma(window, self.long_window))
        else {
            return Vec::new();
        };

        let position = current_position(window, positions);
        if short_ma > long_ma && position <= 0 {
            vec![SignalIntent::long()]
        } else if short_ma < long_ma && position >= 0 {
            vec![SignalIntent::short()]
        } else {
            Vec::new()
        }
    }
}

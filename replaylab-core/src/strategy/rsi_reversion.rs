//! RSI mean-reversion strategy
//!
//! Buys oversold, sells overbought, using the rolling-mean RSI from
//! [`crate::indicators::rolling_rsi`].

use crate::domain::{Bar, SignalEvent};
use crate::indicators::rolling_rsi;
use crate::portfolio::PortfolioSnapshot;
use crate::strategy::{current_position, SignalIntent, Strategy};

#[derive(Debug, Clone)]
pub struct RsiReversion {
    window: usize,
    oversold: f64,
    overbought: f64,
}

impl RsiReversion {
    pub fn new(window: usize, oversold: f64, overbought: f64) -> Self {
        Self {
            window,
            oversold,
            overbought,
        }
    }
}

impl Strategy for RsiReversion {
    fn name(&self) -> &str {
        "rsi_reversion"
    }

    /// `window` deltas need `window + 1` closes.
    fn lookback(&self) -> usize {
        self.window + 1
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
        let Some(rsi) = rolling_rsi(window, self.window) else {
            return Vec::new();
        };

        let position = current_position(window, positions);
        if rsi < self.oversold && position <= 0 {
            vec![SignalIntent::long()]
        } else if rsi > self.overbought && position >= 0 {
            vec![SignalIntent::short()]
        } else {
            Vec::new()
        }
    }
}

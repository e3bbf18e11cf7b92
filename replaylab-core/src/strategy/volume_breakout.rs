//! Volume breakout strategy
//!
//! Enters long on a volume surge while price presses against its recent high;
//! exits when volume dries up.

use crate::domain::{Bar, SignalEvent};
use crate::indicators::{highest_high, mean_volume};
use crate::portfolio::PortfolioSnapshot;
use crate::strategy::{current_position, SignalIntent, Strategy};

/// Bars in the rolling high used for the breakout test.
pub const BREAKOUT_HIGH_BARS: usize = 5;
/// Close must be at least this fraction of the rolling high.
pub const BREAKOUT_TOLERANCE: f64 = 0.999;
/// Volume below this fraction of average exits a long.
pub const EXIT_VOLUME_RATIO: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct VolumeBreakout {
    window: usize,
    volume_multiplier: f64,
}

impl VolumeBreakout {
    pub fn new(window: usize, volume_multiplier: f64) -> Self {
        Self {
            window,
            volume_multiplier,
        }
    }
}

impl Strategy for VolumeBreakout {
    fn name(&self) -> &str {
        "volume_breakout"
    }

    fn lookback(&self) -> usize {
        self.window
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
        let (Some(current), Some(avg_volume), Some(recent_high)) = (
            window.last(),
            mean_volume(window, self.window),
            highest_high(window, BREAKOUT_HIGH_BARS),
        ) else {
            return Vec::new();
        };

        let position = current_position(window, positions);
        let surge = current.volume > avg_volume * self.volume_multiplier;
        let at_high = current.close > recent_high * BREAKOUT_TOLERANCE;

        if surge && at_high && position <= 0 {
            vec![SignalIntent::long()]
        } else if current.volume < avg_volume * EXIT_VOLUME_RATIO && position > 0 {
            vec![SignalIntent::short()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_bars;

    fn bars_with_volume(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
        let mut bars = test_bars(closes);
        for (bar, &v) in bars.iter_mut().zip(volumes) {
            bar.volume = v;
            // make the close the high so the breakout test is about volume
            bar.high = bar.close;
        }
        bars
    }

    #[test]
    fn test_short_window_is_silent() {
        let strategy = VolumeBreakout::new(4, 1.5);
        let bars = bars_with_volume(&[1.0, 2.0, 3.0], &[100.0, 100.0, 900.0]);
        let flat = PortfolioSnapshot::flat(1000.0);
        assert!(strategy.generate_signals(&bars, &[], &flat).is_empty());
    }

    #[test]
    fn test_volume_surge_at_high_goes_long() {
        let strategy = VolumeBreakout::new(4, 1.5);
        // avg = (100+100+100+700)/4 = 250, 700 > 375
        let bars = bars_with_volume(&[10.0, 11.0, 12.0, 13.0], &[100.0, 100.0, 100.0, 700.0]);
        let flat = PortfolioSnapshot::flat(1000.0);
        assert_eq!(
            strategy.generate_signals(&bars, &[], &flat),
            vec![SignalIntent::long()]
        );
    }

    #[test]
    fn test_surge_below_high_is_silent() {
        let strategy = VolumeBreakout::new(4, 1.5);
        let bars = bars_with_volume(&[13.0, 12.0, 11.0, 10.0], &[100.0, 100.0, 100.0, 700.0]);
        let flat = PortfolioSnapshot::flat(1000.0);
        assert!(strategy.generate_signals(&bars, &[], &flat).is_empty());
    }

    #[test]
    fn test_volume_dry_up_exits_long_only() {
        let strategy = VolumeBreakout::new(4, 1.5);
        // avg = 325, 10 < 227.5
        let bars = bars_with_volume(&[10.0, 11.0, 12.0, 13.0], &[400.0, 400.0, 500.0, 0.0]);
        let long = PortfolioSnapshot::flat(1000.0).with_holding("TEST", 10, 10.0);
        assert_eq!(
            strategy.generate_signals(&bars, &[], &long),
            vec![SignalIntent::short()]
        );
        let flat = PortfolioSnapshot::flat(1000.0);
        assert!(strategy.generate_signals(&bars, &[], &flat).is_empty());
    }
}

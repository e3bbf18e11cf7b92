//! Relative Strength Index (RSI), rolling-mean variant.
//!
//! Average gain and average loss are plain means of the positive and negative
//! close-to-close deltas over the last `period` deltas (not exponentially
//! smoothed). RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//! Needs `period + 1` bars.
//! Edge cases: avg_loss == 0 with gains → 100; no movement at all → undefined.

use crate::domain::Bar;

/// RSI at the last bar of the slice, or `None` when there is not enough
/// history, the window holds a NaN, or price did not move at all.
pub fn rolling_rsi(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }
    let recent = &bars[bars.len() - (period + 1)..];

    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in recent.windows(2) {
        let delta = pair[1].close - pair[0].close;
        if delta.is_nan() {
            return None;
        }
        if delta > 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }
    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_gain == 0.0 && avg_loss == 0.0 {
        None
    } else if avg_loss == 0.0 {
        Some(100.0)
    } else {
        Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_bars;
    use crate::indicators::assert_approx;

    #[test]
    fn rsi_all_gains() {
        let bars = test_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        assert_approx(rolling_rsi(&bars, 3).unwrap(), 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = test_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        assert_approx(rolling_rsi(&bars, 3).unwrap(), 0.0, 1e-9);
    }

    #[test]
    fn rsi_mixed() {
        // Last 3 deltas: -0.25, -0.48, +0.72
        // avg_gain = 0.72/3, avg_loss = 0.73/3
        let bars = test_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let expected = 100.0 - 100.0 / (1.0 + 0.72 / 0.73);
        assert_approx(rolling_rsi(&bars, 3).unwrap(), expected, 1e-9);
    }

    #[test]
    fn rsi_flat_prices_undefined() {
        let bars = test_bars(&[10.0, 10.0, 10.0, 10.0]);
        assert!(rolling_rsi(&bars, 3).is_none());
    }

    #[test]
    fn rsi_needs_period_plus_one_bars() {
        let bars = test_bars(&[10.0, 11.0, 12.0]);
        assert!(rolling_rsi(&bars, 3).is_none());
        assert!(rolling_rsi(&bars, 2).is_some());
    }

    #[test]
    fn rsi_bounds() {
        let bars = test_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        for end in 4..=bars.len() {
            if let Some(v) = rolling_rsi(&bars[..end], 3) {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds: {v}");
            }
        }
    }
}

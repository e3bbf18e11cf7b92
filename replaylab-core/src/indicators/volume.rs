//! Volume and range helpers used by breakout logic.

use crate::domain::Bar;

/// Mean volume over the trailing `period` bars (current bar included).
pub fn mean_volume(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let recent = &bars[bars.len() - period..];
    let mean = recent.iter().map(|b| b.volume).sum::<f64>() / period as f64;
    (!mean.is_nan()).then_some(mean)
}

/// Highest high over the trailing `period` bars, or over all bars if fewer.
pub fn highest_high(bars: &[Bar], period: usize) -> Option<f64> {
    let start = bars.len().saturating_sub(period);
    bars[start..]
        .iter()
        .map(|b| b.high)
        .filter(|h| !h.is_nan())
        .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.max(h))))
}

//! Simple Moving Average (SMA).
//!
//! Mean of close prices over the trailing `period` bars, evaluated at the last
//! bar of the slice.

use crate::domain::Bar;

/// SMA of closes over the last `period` bars. `None` if the slice is shorter
/// than `period`, `period` is zero, or the window contains a NaN close.
pub fn sma(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let recent = &bars[bars.len() - period..];
    let sum: f64 = recent.iter().map(|b| b.close).sum();
    if sum.is_nan() {
        return None;
    }
    Some(sum / period as f64)
}

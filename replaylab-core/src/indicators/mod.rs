//! Indicator functions evaluated on a causal bar window.
//!
//! Each function looks only at the slice it is given and reports the value at
//! its last bar. Strategies call them with the feed's window, so no indicator
//! can read a bar newer than the current one.

pub mod rsi;
pub mod sma;
pub mod volume;

pub use rsi::rolling_rsi;
pub use sma::sma;
pub use volume::{highest_high, mean_volume};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

//! Fixed-fraction sizer
//!
//! quantity = floor(cash × fraction / reference_price)
//!
//! The reference price is a configured constant, not the live quote.

use serde::{Deserialize, Serialize};

use crate::domain::{SignalEvent, MAX_QUANTITY};
use crate::sizers::OrderSizer;

pub const DEFAULT_FRACTION: f64 = 0.1;
pub const DEFAULT_REFERENCE_PRICE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedFractionSizer {
    pub fraction: f64,
    pub reference_price: f64,
}

impl FixedFractionSizer {
    pub fn new(fraction: f64, reference_price: f64) -> Self {
        Self {
            fraction,
            reference_price,
        }
    }
}

impl Default for FixedFractionSizer {
    fn default() -> Self {
        Self::new(DEFAULT_FRACTION, DEFAULT_REFERENCE_PRICE)
    }
}

impl OrderSizer for FixedFractionSizer {
    fn quantity(&self, cash_reference: f64, _signal: &SignalEvent) -> u64 {
        if !(self.reference_price.is_finite() && self.reference_price > 0.0) {
            return 0;
        }
        let raw = (cash_reference * self.fraction / self.reference_price).floor();
        if !(raw.is_finite() && raw > 0.0) {
            return 0;
        }
        // out-of-range sizes saturate so the order constructor rejects them
        if raw >= MAX_QUANTITY as f64 {
            return u64::MAX;
        }
        raw as u64
    }

    fn name(&self) -> &str {
        "fixed_fraction"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, OrderSide};
    use crate::error::ExecutionError;
    use crate::portfolio::{CashPolicy, PortfolioLedger};
    use chrono::NaiveDate;

    fn signal() -> SignalEvent {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        SignalEvent::new("SPY", ts, Direction::Long, 1.0).unwrap()
    }

    #[test]
    fn test_default_sizing() {
        let sizer = FixedFractionSizer::default();
        // 100_000 × 0.1 / 100 = 100
        assert_eq!(sizer.quantity(100_000.0, &signal()), 100);
        // floor(12_345 × 0.1 / 100) = 12
        assert_eq!(sizer.quantity(12_345.0, &signal()), 12);
    }

    #[test]
    fn test_degenerate_inputs_size_to_zero() {
        let sizer = FixedFractionSizer::default();
        assert_eq!(sizer.quantity(-5_000.0, &signal()), 0);
        assert_eq!(sizer.quantity(500.0, &signal()), 0);
        assert_eq!(FixedFractionSizer::new(0.1, 0.0).quantity(1e6, &signal()), 0);
    }

    #[test]
    fn test_huge_capital_is_rejected_not_wrapped() {
        let sizer = FixedFractionSizer::default();
        assert_eq!(sizer.quantity(1e30, &signal()), u64::MAX);

        let err = sizer.size_order(1e30, &signal()).unwrap_err();
        assert_eq!(
            err,
            ExecutionError::QuantityTooLarge {
                symbol: "SPY".into(),
                quantity: u64::MAX
            }
        );

        // tiny reference price with ordinary capital: 1e8 × 0.1 / 1e-12 = 1e19
        let tiny = FixedFractionSizer::new(0.1, 1e-12);
        assert!(tiny.size_order(1e8, &signal()).is_err());
    }

    #[test]
    fn test_largest_order_stays_long_in_the_ledger() {
        let order = FixedFractionSizer::new(1.0, 1.0)
            .size_order(9.0e18, &signal())
            .unwrap();
        assert_eq!(order.side(), OrderSide::Buy);

        let fill = crate::domain::FillEvent::from_order(&order, 1.0, 0.0).unwrap();
        let mut ledger = PortfolioLedger::new(0.0, CashPolicy::CarryForward);
        ledger.execute_fill(&fill).unwrap();
        assert!(ledger.position("SPY") > 0);
        assert!(ledger.cash() < 0.0);

        // a second buy of the same size would overflow the position
        assert!(matches!(
            ledger.execute_fill(&fill),
            Err(ExecutionError::PositionOverflow { .. })
        ));
        assert_eq!(ledger.trades().len(), 1);
    }
}

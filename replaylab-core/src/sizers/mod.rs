//! Order sizers: turn a signal into exactly one market order.
//!
//! Sizers decide quantity only. Direction comes from the signal and the order
//! type is always market.

pub mod fixed_fraction;

pub use fixed_fraction::FixedFractionSizer;

use crate::domain::{OrderEvent, SignalEvent};
use crate::error::ExecutionError;

pub trait OrderSizer: Send + Sync {
    /// Shares to trade given the cash figure the ledger reports.
    fn quantity(&self, cash_reference: f64, signal: &SignalEvent) -> u64;

    /// Sizer name for logging.
    fn name(&self) -> &str;

    /// Build the order for `signal`. Fails when the sizing rule yields zero shares.
    fn size_order(
        &self,
        cash_reference: f64,
        signal: &SignalEvent,
    ) -> Result<OrderEvent, ExecutionError> {
        OrderEvent::market(
            signal.symbol(),
            signal.timestamp(),
            self.quantity(cash_reference, signal),
            signal.direction().side(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, OrderSide};
    use chrono::NaiveDate;

    struct FixedShares(u64);

    impl OrderSizer for FixedShares {
        fn quantity(&self, _cash_reference: f64, _signal: &SignalEvent) -> u64 {
            self.0
        }

        fn name(&self) -> &str {
            "fixed_shares"
        }
    }

    fn signal(direction: Direction) -> SignalEvent {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        SignalEvent::new("SPY", ts, direction, 1.0).unwrap()
    }

    #[test]
    fn test_size_order_copies_signal() {
        let order = FixedShares(7)
            .size_order(1_000.0, &signal(Direction::Short))
            .unwrap();
        assert_eq!(order.symbol(), "SPY");
        assert_eq!(order.quantity(), 7);
        assert_eq!(order.side(), OrderSide::Sell);
    }

    #[test]
    fn test_zero_quantity_is_an_error() {
        let err = FixedShares(0)
            .size_order(1_000.0, &signal(Direction::Long))
            .unwrap_err();
        assert_eq!(
            err,
            ExecutionError::NonPositiveQuantity {
                symbol: "SPY".into()
            }
        );
    }
}

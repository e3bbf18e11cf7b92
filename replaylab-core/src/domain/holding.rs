use serde::{Deserialize, Serialize};

/// Open position in one symbol.
///
/// `quantity` is signed: positive = long, negative = short. A holding with
/// zero quantity is never stored; the ledger removes it instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub quantity: i64,
    pub avg_price: f64,
}

impl Holding {
    pub fn new(quantity: i64, avg_price: f64) -> Self {
        Self {
            quantity,
            avg_price,
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.avg_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_holding_gains_when_price_falls() {
        let h = Holding {
            quantity: -10,
            avg_price: 50.0,
        };
        assert_eq!(h.market_value(40.0), -400.0);
        assert_eq!(h.unrealized_pnl(40.0), 100.0);
    }
}

//! Running trade statistics kept by the ledger.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Every applied fill counts, opening or closing.
    pub total_trades: u64,
    /// Fills that closed exposure at a profit.
    pub wins: u64,
    /// Fills that closed exposure at a loss.
    pub losses: u64,
    pub gross_wins: f64,
    /// Positive magnitude of losing realized P&L.
    pub gross_losses: f64,
    pub total_fees: f64,
}

impl PortfolioStats {
    /// Count a closing fill's realized P&L. Zero P&L (or an opening fill)
    /// is neither a win nor a loss.
    pub fn record_realized(&mut self, pnl: f64) {
        if pnl > 0.0 {
            self.wins += 1;
            self.gross_wins += pnl;
        } else if pnl < 0.0 {
            self.losses += 1;
            self.gross_losses += -pnl;
        }
    }

    pub fn net_realized(&self) -> f64 {
        self.gross_wins - self.gross_losses
    }
}

//! Performance analysis: pure functions from equity curve and ledger stats
//! to scalar metrics.
//!
//! The equity curve is the per-bar portfolio value produced by the engine;
//! one value per bar, so "daily" below means "per bar".

use serde::{Deserialize, Serialize};

use replaylab_core::portfolio::PortfolioStats;

/// Trading periods per year used to annualize.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Cap applied to the profit factor when there are no losses.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

/// Aggregate performance metrics for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tearsheet {
    /// Percent, e.g. 5.0 = +5%.
    pub total_return_pct: f64,
    pub sharpe: f64,
    /// Negative fraction, e.g. -0.15.
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    /// Percent of fills that realized a win.
    pub win_rate_pct: f64,
    pub profit_factor: f64,
    pub total_trades: u64,
    pub total_fees: f64,
    pub final_equity: f64,
}

impl Tearsheet {
    pub fn compute(equity_curve: &[f64], stats: &PortfolioStats, risk_free_rate: f64) -> Self {
        let drawdown = max_drawdown(equity_curve);
        Self {
            total_return_pct: total_return(equity_curve),
            sharpe: sharpe_ratio(&returns(equity_curve), risk_free_rate),
            max_drawdown: drawdown.fraction,
            max_drawdown_pct: drawdown.pct,
            win_rate_pct: win_rate(stats),
            profit_factor: profit_factor(stats),
            total_trades: stats.total_trades,
            total_fees: stats.total_fees,
            final_equity: equity_curve.last().copied().unwrap_or(0.0),
        }
    }
}

/// Largest peak-to-trough decline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawdownStats {
    /// Negative fraction (0.0 when equity never falls below a prior peak).
    pub fraction: f64,
    /// Same value in percent.
    pub pct: f64,
}

// ─── Individual metric functions ────────────────────────────────────

/// Per-period simple returns. Periods starting from non-positive equity
/// contribute 0.
pub fn returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// Annualized Sharpe ratio.
///
/// mean(excess) / stdev(excess) × √252, with the annual risk-free rate spread
/// evenly over 252 periods and the population standard deviation. Returns 0.0
/// with no returns or zero variance.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let period_rf = risk_free_rate / PERIODS_PER_YEAR;
    let excess: Vec<f64> = returns.iter().map(|r| r - period_rf).collect();
    let std = population_std_dev(&excess);
    if std < 1e-15 || !std.is_finite() {
        return 0.0;
    }
    mean_f64(&excess) / std * PERIODS_PER_YEAR.sqrt()
}

pub fn max_drawdown(equity_curve: &[f64]) -> DrawdownStats {
    let Some(&first) = equity_curve.first() else {
        return DrawdownStats::default();
    };
    let mut peak = first;
    let mut worst = 0.0_f64;
    for &equity in equity_curve {
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.min((equity - peak) / peak);
        }
    }
    DrawdownStats {
        fraction: worst,
        pct: worst * 100.0,
    }
}

/// (final / initial − 1) × 100. Zero for fewer than two points.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(&initial), Some(&last)) if equity_curve.len() >= 2 && initial > 0.0 => {
            (last / initial - 1.0) * 100.0
        }
        _ => 0.0,
    }
}

/// wins / max(total_trades, 1) × 100.
pub fn win_rate(stats: &PortfolioStats) -> f64 {
    stats.wins as f64 / stats.total_trades.max(1) as f64 * 100.0
}

/// gross_wins / gross_losses, capped at 100; 0.0 with no wins.
pub fn profit_factor(stats: &PortfolioStats) -> f64 {
    if stats.gross_wins <= 0.0 {
        return 0.0;
    }
    if stats.gross_losses < 1e-10 {
        return PROFIT_FACTOR_CAP;
    }
    (stats.gross_wins / stats.gross_losses).min(PROFIT_FACTOR_CAP)
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total_trades: u64, wins: u64, gross_wins: f64, gross_losses: f64) -> PortfolioStats {
        PortfolioStats {
            total_trades,
            wins,
            losses: 0,
            gross_wins,
            gross_losses,
            total_fees: 0.0,
        }
    }

    #[test]
    fn returns_basic() {
        let r = returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] + 0.10).abs() < 1e-12);
        assert!(returns(&[100.0]).is_empty());
    }

    #[test]
    fn max_drawdown_known() {
        let dd = max_drawdown(&[100_000.0, 110_000.0, 95_000.0, 105_000.0]);
        assert!((dd.fraction - (-0.136_363_636)).abs() < 1e-6);
        assert!((dd.pct - (-13.636_363_6)).abs() < 1e-4);
    }

    #[test]
    fn max_drawdown_monotonic_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]).fraction, 0.0);
        assert_eq!(max_drawdown(&[]).fraction, 0.0);
    }

    #[test]
    fn sharpe_zero_variance_is_zero() {
        assert_eq!(sharpe_ratio(&[0.01, 0.01, 0.01], 0.0), 0.0);
        assert_eq!(sharpe_ratio(&[], 0.0), 0.0);
    }

    #[test]
    fn sharpe_uses_population_std() {
        let r = [0.01, -0.01, 0.02, 0.0];
        let mean = 0.005;
        let var = r.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / 4.0;
        let expected = mean / var.sqrt() * 252.0_f64.sqrt();
        assert!((sharpe_ratio(&r, 0.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn sharpe_subtracts_risk_free() {
        let r = [0.01, -0.01, 0.02, 0.0];
        assert!(sharpe_ratio(&r, 0.05) < sharpe_ratio(&r, 0.0));
    }

    #[test]
    fn total_return_percent() {
        assert!((total_return(&[100.0, 105.0]) - 5.0).abs() < 1e-12);
        assert_eq!(total_return(&[100.0]), 0.0);
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn win_rate_guards_zero_trades() {
        assert_eq!(win_rate(&stats(0, 0, 0.0, 0.0)), 0.0);
        assert!((win_rate(&stats(4, 1, 10.0, 5.0)) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn profit_factor_cases() {
        assert_eq!(profit_factor(&stats(2, 0, 0.0, 5.0)), 0.0);
        assert_eq!(profit_factor(&stats(2, 2, 5.0, 0.0)), PROFIT_FACTOR_CAP);
        assert!((profit_factor(&stats(2, 1, 30.0, 10.0)) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn tearsheet_assembles_metrics() {
        let sheet = Tearsheet::compute(
            &[100_000.0, 110_000.0, 95_000.0, 105_000.0],
            &stats(4, 2, 20.0, 10.0),
            0.0,
        );
        assert!((sheet.total_return_pct - 5.0).abs() < 1e-9);
        assert!(sheet.max_drawdown < 0.0);
        assert_eq!(sheet.win_rate_pct, 50.0);
        assert_eq!(sheet.profit_factor, 2.0);
        assert_eq!(sheet.total_trades, 4);
        assert_eq!(sheet.final_equity, 105_000.0);
    }
}

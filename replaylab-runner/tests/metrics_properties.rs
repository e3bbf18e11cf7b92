//! Property tests for the performance metrics.

use proptest::prelude::*;
use replaylab_core::portfolio::PortfolioStats;
use replaylab_runner::metrics::{max_drawdown, returns, sharpe_ratio, total_return, Tearsheet};

fn arb_equity() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1_000.0..200_000.0_f64, 0..120)
}

proptest! {
    #[test]
    fn drawdown_is_a_bounded_negative_fraction(equity in arb_equity()) {
        let dd = max_drawdown(&equity);
        prop_assert!(dd.fraction <= 0.0 && dd.fraction > -1.0);
        prop_assert!((dd.pct - dd.fraction * 100.0).abs() < 1e-9);
    }

    #[test]
    fn one_return_per_step(equity in arb_equity()) {
        prop_assert_eq!(returns(&equity).len(), equity.len().saturating_sub(1));
    }

    #[test]
    fn sharpe_is_finite(equity in arb_equity(), rf in 0.0..0.1_f64) {
        prop_assert!(sharpe_ratio(&returns(&equity), rf).is_finite());
    }

    #[test]
    fn scaling_equity_leaves_ratios_unchanged(
        equity in prop::collection::vec(1_000.0..200_000.0_f64, 2..60),
        scale in 0.5..4.0_f64,
    ) {
        let scaled: Vec<f64> = equity.iter().map(|e| e * scale).collect();
        prop_assert!((total_return(&equity) - total_return(&scaled)).abs() < 1e-6);
        prop_assert!((max_drawdown(&equity).fraction - max_drawdown(&scaled).fraction).abs() < 1e-9);
    }

    #[test]
    fn win_rate_is_a_percentage(wins in 0u64..50, extra in 0u64..50) {
        let stats = PortfolioStats {
            total_trades: wins + extra,
            wins,
            ..PortfolioStats::default()
        };
        let sheet = Tearsheet::compute(&[100.0, 101.0], &stats, 0.0);
        prop_assert!((0.0..=100.0).contains(&sheet.win_rate_pct));
    }
}

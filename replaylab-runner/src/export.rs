//! Run artifacts: `result.json`, `equity.csv`, `trades.csv`.
//!
//! The JSON artifact carries `schema_version`; unknown future versions are
//! rejected on load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use replaylab_core::domain::{OrderSide, TradeRecord};
use replaylab_core::engine::EquityPoint;

use crate::runner::{BacktestResult, SCHEMA_VERSION};

pub const RESULT_FILE: &str = "result.json";
pub const EQUITY_FILE: &str = "equity.csv";
pub const TRADES_FILE: &str = "trades.csv";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize backtest result to JSON")
}

pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize backtest result from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct EquityRow {
    datetime: String,
    equity: f64,
}

#[derive(Serialize)]
struct TradeRow<'a> {
    datetime: String,
    symbol: &'a str,
    side: OrderSide,
    quantity: u64,
    fill_price: f64,
    commission: f64,
    realized_pnl: f64,
}

pub fn export_equity_csv(equity: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for point in equity {
        wtr.serialize(EquityRow {
            datetime: point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            equity: point.equity,
        })?;
    }
    into_string(wtr)
}

pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if trades.is_empty() {
        // serialize() writes the header with the first row only
        wtr.write_record([
            "datetime",
            "symbol",
            "side",
            "quantity",
            "fill_price",
            "commission",
            "realized_pnl",
        ])?;
    }
    for trade in trades {
        wtr.serialize(TradeRow {
            datetime: trade.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            symbol: &trade.symbol,
            side: trade.direction,
            quantity: trade.quantity,
            fill_price: trade.fill_price,
            commission: trade.commission,
            realized_pnl: trade.realized_pnl,
        })?;
    }
    into_string(wtr)
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

// ─── Files ──────────────────────────────────────────────────────────

/// Write all three artifacts into `dir` (created if missing).
pub fn write_artifacts(dir: &Path, result: &BacktestResult) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let artifacts = [
        (RESULT_FILE, export_json(result)?),
        (EQUITY_FILE, export_equity_csv(&result.equity_curve)?),
        (TRADES_FILE, export_trades_csv(&result.trades)?),
    ];
    let mut written = Vec::with_capacity(artifacts.len());
    for (name, contents) in artifacts {
        let path = dir.join(name);
        fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn trade() -> TradeRecord {
        TradeRecord {
            symbol: "SPY".into(),
            timestamp: ts(2),
            quantity: 100,
            direction: OrderSide::Buy,
            fill_price: 100.15,
            commission: 1.0,
            realized_pnl: 0.0,
        }
    }

    #[test]
    fn equity_csv_has_header_and_rows() {
        let csv = export_equity_csv(&[
            EquityPoint {
                timestamp: ts(2),
                equity: 100_000.0,
            },
            EquityPoint {
                timestamp: ts(3),
                equity: 100_500.5,
            },
        ])
        .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "datetime,equity");
        assert_eq!(lines[1], "2024-01-02 00:00:00,100000.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn trades_csv_rows() {
        let csv = export_trades_csv(&[trade()]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "datetime,symbol,side,quantity,fill_price,commission,realized_pnl"
        );
        assert!(lines[1].starts_with("2024-01-02 00:00:00,SPY,BUY,100,100.15"));
    }

    #[test]
    fn empty_trades_csv_keeps_header() {
        let csv = export_trades_csv(&[]).unwrap();
        assert_eq!(
            csv.trim_end(),
            "datetime,symbol,side,quantity,fill_price,commission,realized_pnl"
        );
    }

    #[test]
    fn import_rejects_future_schema() {
        let json = r#"{"schema_version": 999}"#;
        assert!(import_json(json).is_err());
    }
}

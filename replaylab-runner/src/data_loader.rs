//! CSV price loading for the runner.
//!
//! Expected header: `datetime,open,high,low,close,volume` (one instrument,
//! strictly ascending). `date` and `timestamp` are accepted for the first
//! column. The loaded series is validated here so the engine only ever sees
//! a clean, ordered feed.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use replaylab_core::domain::Bar;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open price CSV {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse row {row} of {path}: {source}")]
    Csv {
        path: PathBuf,
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("unsupported timestamp '{value}' at row {row}")]
    Timestamp { row: usize, value: String },

    #[error("price CSV {0} contains no rows")]
    Empty(PathBuf),

    #[error("row {row} ({timestamp}) is not after the previous row")]
    OutOfOrder { row: usize, timestamp: NaiveDateTime },

    #[error("row {row} ({timestamp}) has inconsistent OHLCV values")]
    InsaneBar { row: usize, timestamp: NaiveDateTime },
}

#[derive(Debug, Deserialize)]
struct PriceRecord {
    #[serde(alias = "date", alias = "timestamp")]
    datetime: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load and validate a single-instrument price file.
pub fn load_csv(path: &Path, symbol: &str) -> Result<Vec<Bar>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut bars: Vec<Bar> = Vec::new();
    for (index, result) in reader.deserialize::<PriceRecord>().enumerate() {
        // 1-based data rows, header excluded
        let row = index + 1;
        let record = result.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            row,
            source,
        })?;
        let timestamp = parse_timestamp(&record.datetime).ok_or_else(|| LoadError::Timestamp {
            row,
            value: record.datetime.clone(),
        })?;

        if let Some(prev) = bars.last() {
            if timestamp <= prev.timestamp {
                return Err(LoadError::OutOfOrder { row, timestamp });
            }
        }

        let bar = Bar::new(
            symbol,
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        );
        if !bar.is_sane() {
            return Err(LoadError::InsaneBar { row, timestamp });
        }
        bars.push(bar);
    }

    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return Err(LoadError::Empty(path.to_path_buf()));
    };
    info!(
        path = %path.display(),
        symbol,
        bars = bars.len(),
        first = %first.timestamp,
        last = %last.timestamp,
        "price data loaded"
    );
    Ok(bars)
}

/// RFC 3339 (converted to UTC), `%Y-%m-%d %H:%M:%S`, `%Y-%m-%dT%H:%M:%S`,
/// or a bare `%Y-%m-%d` (midnight).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive);
        }
    }
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0));
    if parsed.is_none() {
        debug!(value, "timestamp did not match any accepted format");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_ascending_series() {
        let file = write_csv(
            "datetime,open,high,low,close,volume\n\
             2024-01-02,100,101,99,100.5,1000\n\
             2024-01-03,100.5,102,100,101.5,1200\n",
        );
        let bars = load_csv(file.path(), "SPY").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].symbol, "SPY");
        assert_eq!(bars[1].close, 101.5);
    }

    #[test]
    fn accepts_date_alias_and_times() {
        let file = write_csv(
            "date,open,high,low,close,volume\n\
             2024-01-02 09:30:00,1,2,0.5,1.5,10\n\
             2024-01-02T09:31:00,1.5,2,1,1.8,10\n\
             2024-01-02T09:32:00Z,1.8,2,1,1.9,10\n",
        );
        let bars = load_csv(file.path(), "X").unwrap();
        assert_eq!(bars.len(), 3);
    }

    #[test]
    fn rejects_unsorted_rows() {
        let file = write_csv(
            "datetime,open,high,low,close,volume\n\
             2024-01-03,1,2,0.5,1.5,10\n\
             2024-01-02,1,2,0.5,1.5,10\n",
        );
        assert!(matches!(
            load_csv(file.path(), "X"),
            Err(LoadError::OutOfOrder { row: 2, .. })
        ));
    }

    #[test]
    fn rejects_empty_file() {
        let file = write_csv("datetime,open,high,low,close,volume\n");
        assert!(matches!(load_csv(file.path(), "X"), Err(LoadError::Empty(_))));
    }

    #[test]
    fn rejects_bad_timestamp() {
        let file = write_csv("datetime,open,high,low,close,volume\n01/02/2024,1,2,0.5,1.5,10\n");
        assert!(matches!(
            load_csv(file.path(), "X"),
            Err(LoadError::Timestamp { row: 1, .. })
        ));
    }

    #[test]
    fn rejects_insane_bar() {
        let file = write_csv("datetime,open,high,low,close,volume\n2024-01-02,1,0.5,2,1.5,10\n");
        assert!(matches!(
            load_csv(file.path(), "X"),
            Err(LoadError::InsaneBar { row: 1, .. })
        ));
    }

    #[test]
    fn missing_file_is_open_error() {
        assert!(matches!(
            load_csv(Path::new("/nonexistent/prices.csv"), "X"),
            Err(LoadError::Open { .. })
        ));
    }
}

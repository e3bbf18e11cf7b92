//! Market data feed: replays a resident bar series one bar at a time.
//!
//! The feed is the look-ahead boundary: [`MarketDataFeed::window`] only ever
//! returns bars up to and including the current one, so a strategy handed that
//! slice cannot observe the future.

use thiserror::Error;

use crate::domain::Bar;

#[derive(Debug, Error, PartialEq)]
pub enum FeedError {
    #[error("bar series for '{symbol}' is empty")]
    Empty { symbol: String },

    #[error("bar {index} for '{symbol}' is not strictly after the previous bar")]
    OutOfOrder { symbol: String, index: usize },

    #[error("bar {index} carries symbol '{found}', expected '{symbol}'")]
    SymbolMismatch {
        symbol: String,
        index: usize,
        found: String,
    },
}

/// Ordered, time-indexed bar source for a single instrument.
pub trait MarketDataFeed: Send {
    fn symbol(&self) -> &str;

    /// Move to the next bar and return it, or `None` once exhausted.
    fn advance(&mut self) -> Option<&Bar>;

    /// Bar most recently returned by `advance`.
    fn current(&self) -> Option<&Bar>;

    /// Last `n` bars up to and including the current bar (fewer at the start).
    fn window(&self, n: usize) -> &[Bar];

    /// Total number of bars in the series.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Feed over a fully resident, validated bar series.
#[derive(Debug, Clone)]
pub struct HistoricalFeed {
    symbol: String,
    bars: Vec<Bar>,
    /// Number of bars released so far; the current bar is `bars[released - 1]`.
    released: usize,
}

impl HistoricalFeed {
    /// Validates the series: non-empty, one symbol, strictly ascending timestamps.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, FeedError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(FeedError::Empty { symbol });
        }
        for (index, bar) in bars.iter().enumerate() {
            if bar.symbol != symbol {
                return Err(FeedError::SymbolMismatch {
                    symbol,
                    index,
                    found: bar.symbol.clone(),
                });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(FeedError::OutOfOrder { symbol, index });
            }
        }
        Ok(Self {
            symbol,
            bars,
            released: 0,
        })
    }

    /// Index of the current bar, if any has been released.
    pub fn position(&self) -> Option<usize> {
        self.released.checked_sub(1)
    }
}

impl MarketDataFeed for HistoricalFeed {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn advance(&mut self) -> Option<&Bar> {
        if self.released >= self.bars.len() {
            return None;
        }
        self.released += 1;
        self.bars.get(self.released - 1)
    }

    fn current(&self) -> Option<&Bar> {
        self.position().and_then(|i| self.bars.get(i))
    }

    fn window(&self, n: usize) -> &[Bar] {
        let end = self.released;
        let start = end.saturating_sub(n);
        &self.bars[start..end]
    }

    fn len(&self) -> usize {
        self.bars.len()
    }
}

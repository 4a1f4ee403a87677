pub mod file;
pub mod simulator;

use std::collections::HashMap;

use error_stack::Report;

use crate::error::FeedError;
use crate::model::{Candle, TimeFrame};

/// Abstraction over a real market-data source.
///
/// Implementations may return an empty or short history; the facade then
/// falls back to the simulator. Timeouts are the implementation's concern,
/// `fetch` must not block indefinitely.
pub trait CandleFeed: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch candles for `pair` in ascending chronological order.
    fn fetch(&self, pair: &str, timeframe: TimeFrame) -> Result<Vec<Candle>, Report<FeedError>>;
}

/// Feed with no data at all, so every request is simulated.
#[derive(Debug, Default)]
pub struct EmptyFeed;

impl CandleFeed for EmptyFeed {
    fn name(&self) -> &str {
        "empty"
    }

    fn fetch(&self, _pair: &str, _timeframe: TimeFrame) -> Result<Vec<Candle>, Report<FeedError>> {
        Ok(Vec::new())
    }
}

/// In-memory candle histories keyed by pair and timeframe.
#[derive(Debug, Default)]
pub struct MemoryFeed {
    series: HashMap<(String, TimeFrame), Vec<Candle>>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, pair: &str, timeframe: TimeFrame, candles: Vec<Candle>) -> Self {
        self.series.insert((pair.to_uppercase(), timeframe), candles);
        self
    }
}

impl CandleFeed for MemoryFeed {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, pair: &str, timeframe: TimeFrame) -> Result<Vec<Candle>, Report<FeedError>> {
        Ok(self
            .series
            .get(&(pair.to_uppercase(), timeframe))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_feed_returns_nothing() {
        let candles = EmptyFeed.fetch("EUR/USD", TimeFrame::Min1).unwrap();
        assert!(candles.is_empty());
    }

    #[test]
    fn memory_feed_matches_pair_case_insensitively() {
        let candle = Candle::new(1.0, 1.1, 0.9, 1.05);
        let feed = MemoryFeed::new().with_series("eur/usd", TimeFrame::Min5, vec![candle; 3]);
        assert_eq!(feed.fetch("EUR/USD", TimeFrame::Min5).unwrap().len(), 3);
        assert!(feed.fetch("EUR/USD", TimeFrame::Min1).unwrap().is_empty());
    }
}

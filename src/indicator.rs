pub mod atr;
pub mod ma;
pub mod rsi;
pub mod snapshot;

pub use snapshot::{IndicatorSnapshot, Momentum, Trend, VolatilityLevel};

use crate::model::Candle;

/// A technical analysis indicator reduced to its latest value.
///
/// Candles must be in ascending chronological order (oldest first).
/// Degenerate input (empty or short history) yields a neutral default
/// instead of an error.
pub trait Indicator: Send + Sync {
    /// Unique name of this indicator (e.g., "rsi", "sma").
    fn name(&self) -> &str;

    /// Number of candles needed before the value stops using a fallback.
    fn required_candles(&self) -> usize;

    /// Calculate the latest indicator value from candles.
    fn calculate(&self, candles: &[Candle]) -> f64;
}

/// Extract close prices from a slice of candles.
pub fn close_prices(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

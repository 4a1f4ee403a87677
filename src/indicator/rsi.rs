use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices};
use crate::model::Candle;

pub const NEUTRAL_RSI: f64 = 50.0;

/// RSI (Relative Strength Index) from the average gain and average loss of
/// the last `period` price changes.
#[derive(Debug, Clone, Copy)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Returns [`NEUTRAL_RSI`] when fewer than `period + 1` prices exist.
    pub fn calculate_prices(&self, prices: &[f64]) -> f64 {
        if prices.len() < self.period + 1 {
            return NEUTRAL_RSI;
        }

        let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
        let recent = &deltas[deltas.len() - self.period..];

        let avg_gain = recent.iter().map(|&d| d.max(0.0)).sum::<f64>() / self.period as f64;
        let avg_loss = recent.iter().map(|&d| (-d).max(0.0)).sum::<f64>() / self.period as f64;

        rsi_value(avg_gain, avg_loss)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn required_candles(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, candles: &[Candle]) -> f64 {
        self.calculate_prices(&close_prices(candles))
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, mean};
use crate::model::Candle;

/// Average True Range: simple mean of the last `period` true ranges.
#[derive(Debug, Clone, Copy)]
pub struct Atr {
    period: usize,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        "atr"
    }

    fn required_candles(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, candles: &[Candle]) -> f64 {
        match candles {
            [] => 0.0,
            [only] => only.range(),
            _ => {
                let ranges = true_ranges(candles);
                let start = ranges.len().saturating_sub(self.period);
                mean(&ranges[start..])
            }
        }
    }
}

/// True range of every candle after the first, against the previous close.
pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| {
            let (prev_close, curr) = (w[0].close, &w[1]);
            curr.range()
                .max((curr.high - prev_close).abs())
                .max((curr.low - prev_close).abs())
        })
        .collect()
}

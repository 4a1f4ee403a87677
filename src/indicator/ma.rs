use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices, mean};
use crate::model::Candle;

/// Simple Moving Average of the most recent closes.
#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Mean of the last `period` prices, or of all prices when fewer exist.
    pub fn calculate_prices(&self, prices: &[f64]) -> f64 {
        let start = prices.len().saturating_sub(self.period);
        mean(&prices[start..])
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        "sma"
    }

    fn required_candles(&self) -> usize {
        self.period
    }

    fn calculate(&self, candles: &[Candle]) -> f64 {
        self.calculate_prices(&close_prices(candles))
    }
}

/// Exponential Moving Average over the whole history.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Seeded with the first price, then folded forward in chronological order.
    pub fn calculate_prices(&self, prices: &[f64]) -> f64 {
        let Some((&seed, rest)) = prices.split_first() else {
            return 0.0;
        };
        let k = 2.0 / (self.period as f64 + 1.0);
        rest.iter()
            .fold(seed, |ema, &price| k * price + (1.0 - k) * ema)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        "ema"
    }

    fn required_candles(&self) -> usize {
        self.period
    }

    fn calculate(&self, candles: &[Candle]) -> f64 {
        self.calculate_prices(&close_prices(candles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes.iter().map(|&c| Candle::new(c, c, c, c)).collect()
    }

    #[test]
    fn sma_period_zero_invalid() {
        assert!(Sma::new(0).is_err());
    }

    #[test]
    fn sma_uses_last_period_values() {
        let sma = Sma::new(3).unwrap();
        let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0]);
        // (2+3+4)/3
        assert!((sma.calculate(&candles) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn sma_short_history_averages_everything() {
        let sma = Sma::new(5).unwrap();
        assert!((sma.calculate_prices(&[2.0, 4.0]) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn sma_empty_is_zero() {
        let sma = Sma::new(5).unwrap();
        assert_eq!(sma.calculate(&[]), 0.0);
    }

    #[test]
    fn ema_period_zero_invalid() {
        assert!(Ema::new(0).is_err());
    }

    #[test]
    fn ema_flat_prices() {
        let ema = Ema::new(3).unwrap();
        let candles = candles_from_closes(&[10.0; 6]);
        assert!((ema.calculate(&candles) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn ema_seeds_with_first_price() {
        let ema = Ema::new(3).unwrap();
        // k = 0.5: 1 -> 1.5 -> 2.25
        let value = ema.calculate_prices(&[1.0, 2.0, 3.0]);
        assert!((value - 2.25).abs() < 1e-9);
    }

    #[test]
    fn ema_single_price_is_that_price() {
        let ema = Ema::new(20).unwrap();
        assert_eq!(ema.calculate_prices(&[42.0]), 42.0);
        assert_eq!(ema.calculate_prices(&[]), 0.0);
    }

    #[quickcheck]
    fn moving_averages_non_negative(prices: Vec<u32>, period: u8) -> bool {
        let period = period as usize % 30 + 1;
        let prices: Vec<f64> = prices.into_iter().map(f64::from).collect();
        let sma = Sma::new(period).unwrap().calculate_prices(&prices);
        let ema = Ema::new(period).unwrap().calculate_prices(&prices);
        sma >= 0.0 && ema >= 0.0
    }
}

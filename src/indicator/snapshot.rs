use error_stack::Report;
use serde::Serialize;
use tracing::debug;

use crate::config::IndicatorSettings;
use crate::error::IndicatorError;
use crate::indicator::atr::Atr;
use crate::indicator::ma::{Ema, Sma};
use crate::indicator::rsi::Rsi;
use crate::indicator::{Indicator, close_prices, mean};
use crate::model::Candle;

/// Relative gap between fast and slow EMA below which the market is flat.
const TREND_DEADBAND: f64 = 0.001;
const HIGH_VOLATILITY_ATR_PCT: f64 = 0.5;
const MEDIUM_VOLATILITY_ATR_PCT: f64 = 0.2;
const BULLISH_RSI: f64 = 60.0;
const BEARISH_RSI: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn classify(ema_fast: f64, ema_slow: f64) -> Self {
        if ema_fast > ema_slow * (1.0 + TREND_DEADBAND) {
            Self::Up
        } else if ema_fast < ema_slow * (1.0 - TREND_DEADBAND) {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

impl VolatilityLevel {
    /// Classify ATR as a percentage of the mean close.
    pub fn classify(atr: f64, mean_close: f64) -> Self {
        if mean_close <= 0.0 {
            return Self::Low;
        }
        let atr_pct = atr / mean_close * 100.0;
        if atr_pct > HIGH_VOLATILITY_ATR_PCT {
            Self::High
        } else if atr_pct > MEDIUM_VOLATILITY_ATR_PCT {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Momentum {
    Bullish,
    Bearish,
    Neutral,
}

impl Momentum {
    pub fn from_rsi(rsi: f64) -> Self {
        if rsi > BULLISH_RSI {
            Self::Bullish
        } else if rsi < BEARISH_RSI {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
            Self::Neutral => "NEUTRAL",
        }
    }
}

/// Indicator state computed once per request.
///
/// `resistance >= support` always holds since both come from the same
/// trailing window. The last close may sit exactly on either level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub trend: Trend,
    pub atr: f64,
    pub volatility_level: VolatilityLevel,
    pub rsi: f64,
    pub momentum: Momentum,
    pub pullback_detected: bool,
    pub support: f64,
    pub resistance: f64,
    pub last_close: f64,
}

impl IndicatorSnapshot {
    /// Reduce a chronological candle sequence to one snapshot.
    ///
    /// Only invalid settings fail; short or empty histories fall back to the
    /// neutral defaults of each indicator.
    pub fn from_candles(
        candles: &[Candle],
        settings: &IndicatorSettings,
    ) -> Result<Self, Report<IndicatorError>> {
        let sma_fast = Sma::new(settings.fast_period)?;
        let sma_slow = Sma::new(settings.slow_period)?;
        let ema_fast = Ema::new(settings.fast_period)?;
        let ema_slow = Ema::new(settings.slow_period)?;
        let rsi = Rsi::new(settings.rsi_period)?;
        let atr = Atr::new(settings.atr_period)?;

        let warm_up = [&sma_slow as &dyn Indicator, &ema_slow, &rsi, &atr]
            .iter()
            .map(|i| i.required_candles())
            .max()
            .unwrap_or(0);
        if candles.len() < warm_up {
            debug!(
                available = candles.len(),
                warm_up, "short candle history, indicators use fallbacks"
            );
        }

        let closes = close_prices(candles);
        let last_close = closes.last().copied().unwrap_or(0.0);

        let sma_fast = sma_fast.calculate_prices(&closes);
        let sma_slow = sma_slow.calculate_prices(&closes);
        let ema_fast = ema_fast.calculate_prices(&closes);
        let ema_slow = ema_slow.calculate_prices(&closes);
        let trend = Trend::classify(ema_fast, ema_slow);

        let atr = atr.calculate(candles);
        let volatility_level = VolatilityLevel::classify(atr, mean(&closes));

        let rsi = rsi.calculate_prices(&closes);
        let momentum = Momentum::from_rsi(rsi);

        let (support, resistance) = key_levels(candles, settings.level_window);
        let pullback_detected = match trend {
            Trend::Up => last_close < sma_fast,
            Trend::Down => last_close > sma_fast,
            Trend::Flat => false,
        };

        Ok(Self {
            sma_fast,
            sma_slow,
            ema_fast,
            ema_slow,
            trend,
            atr,
            volatility_level,
            rsi,
            momentum,
            pullback_detected,
            support,
            resistance,
            last_close,
        })
    }
}

/// Lowest low and highest high over the trailing `window` candles.
pub fn key_levels(candles: &[Candle], window: usize) -> (f64, f64) {
    let recent = &candles[candles.len().saturating_sub(window)..];
    let Some(first) = recent.first() else {
        return (0.0, 0.0);
    };
    recent.iter().fold((first.low, first.high), |(support, resistance), c| {
        (support.min(c.low), resistance.max(c.high))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .map(|&c| Candle::new(c, c * 1.0001, c * 0.9999, c))
            .collect()
    }

    fn rising(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64 * 0.2).collect()
    }

    #[test]
    fn trend_deadband() {
        assert_eq!(Trend::classify(100.2, 100.0), Trend::Up);
        assert_eq!(Trend::classify(99.8, 100.0), Trend::Down);
        assert_eq!(Trend::classify(100.05, 100.0), Trend::Flat);
        assert_eq!(Trend::classify(99.95, 100.0), Trend::Flat);
    }

    #[test]
    fn volatility_thresholds() {
        assert_eq!(VolatilityLevel::classify(0.6, 100.0), VolatilityLevel::High);
        assert_eq!(VolatilityLevel::classify(0.3, 100.0), VolatilityLevel::Medium);
        assert_eq!(VolatilityLevel::classify(0.15, 100.0), VolatilityLevel::Low);
        assert_eq!(VolatilityLevel::classify(5.0, 0.0), VolatilityLevel::Low);
    }

    #[test]
    fn momentum_thresholds() {
        assert_eq!(Momentum::from_rsi(61.0), Momentum::Bullish);
        assert_eq!(Momentum::from_rsi(60.0), Momentum::Neutral);
        assert_eq!(Momentum::from_rsi(40.0), Momentum::Neutral);
        assert_eq!(Momentum::from_rsi(39.9), Momentum::Bearish);
    }

    #[test]
    fn key_levels_use_trailing_window() {
        let mut candles = vec![Candle::new(50.0, 500.0, 1.0, 50.0)];
        candles.extend(candles_from_closes(&[100.0; 20]));
        let (support, resistance) = key_levels(&candles, 20);
        assert!(support > 99.0);
        assert!(resistance < 101.0);
        assert!(resistance >= support);
    }

    #[test]
    fn key_levels_empty_history() {
        assert_eq!(key_levels(&[], 20), (0.0, 0.0));
    }

    #[test]
    fn rising_market_snapshot() {
        let candles = candles_from_closes(&rising(40));
        let snapshot = IndicatorSnapshot::from_candles(&candles, &IndicatorSettings::default())
            .unwrap();
        assert_eq!(snapshot.trend, Trend::Up);
        assert_eq!(snapshot.rsi, 100.0);
        assert_eq!(snapshot.momentum, Momentum::Bullish);
        assert!(!snapshot.pullback_detected);
        assert!(snapshot.resistance >= snapshot.support);
        assert!((snapshot.last_close - 107.8).abs() < 1e-9);
    }

    #[test]
    fn pullback_in_uptrend_detected() {
        let mut closes = rising(40);
        // last close dips under the 5-period SMA while the EMAs stay apart
        closes.push(107.0);
        let candles = candles_from_closes(&closes);
        let snapshot = IndicatorSnapshot::from_candles(&candles, &IndicatorSettings::default())
            .unwrap();
        assert_eq!(snapshot.trend, Trend::Up);
        assert!(snapshot.pullback_detected);
    }

    #[test]
    fn flat_market_snapshot() {
        let candles = candles_from_closes(&[100.0; 30]);
        let snapshot = IndicatorSnapshot::from_candles(&candles, &IndicatorSettings::default())
            .unwrap();
        assert_eq!(snapshot.trend, Trend::Flat);
        assert_eq!(snapshot.volatility_level, VolatilityLevel::Low);
        assert!(!snapshot.pullback_detected);
    }

    #[test]
    fn single_candle_snapshot_uses_defaults() {
        let candles = [Candle::new(1.0, 1.01, 0.99, 1.0)];
        let snapshot = IndicatorSnapshot::from_candles(&candles, &IndicatorSettings::default())
            .unwrap();
        assert_eq!(snapshot.rsi, 50.0);
        assert_eq!(snapshot.momentum, Momentum::Neutral);
        assert_eq!(snapshot.trend, Trend::Flat);
        assert!((snapshot.atr - 0.02).abs() < 1e-9);
    }

    #[test]
    fn zero_period_settings_rejected() {
        let settings = IndicatorSettings {
            rsi_period: 0,
            ..IndicatorSettings::default()
        };
        assert!(IndicatorSnapshot::from_candles(&[], &settings).is_err());
    }

    #[quickcheck]
    fn levels_never_inverted(bars: Vec<(u16, u8, u8, u8)>, window: u8) -> bool {
        // each bar is (open, close offset, upper wick, lower wick)
        let candles: Vec<Candle> = bars
            .into_iter()
            .map(|(open, delta, upper, lower)| {
                let open = f64::from(open);
                let close = open + f64::from(delta) - 128.0;
                let high = open.max(close) + f64::from(upper);
                let low = open.min(close) - f64::from(lower);
                Candle::new(open, high, low, close)
            })
            .collect();
        let window = usize::from(window) % 40 + 1;
        let (support, resistance) = key_levels(&candles, window);
        let snapshot = IndicatorSnapshot::from_candles(&candles, &IndicatorSettings::default())
            .unwrap();
        resistance >= support && snapshot.resistance >= snapshot.support
    }
}

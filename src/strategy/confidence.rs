use crate::indicator::{IndicatorSnapshot, Momentum, Trend, VolatilityLevel};
use crate::model::SignalAction;

const BASE: u8 = 50;
const RSI_EXTREME_BONUS: u8 = 15;
const VOLATILITY_BONUS: u8 = 15;
const TREND_BONUS: u8 = 15;
const MOMENTUM_BONUS: u8 = 15;
const LEVEL_BONUS: u8 = 10;
const MAX_CONFIDENCE: u8 = 90;

const OVERSOLD_RSI: f64 = 30.0;
const OVERBOUGHT_RSI: f64 = 70.0;
/// Price within this fraction of a key level counts as a bounce.
const LEVEL_PROXIMITY: f64 = 0.001;

/// Weighted confidence for a signal, capped at 90. WAIT always scores 0.
///
/// Starting from 50:
/// * +15 RSI extreme in the signal's favour (< 30 for BUY, > 70 for SELL)
/// * +15 volatility above LOW
/// * +15 trend matches the action
/// * +15 momentum matches the action
/// * +10 price within 0.1% of support (BUY) or resistance (SELL)
pub fn score(snapshot: &IndicatorSnapshot, action: SignalAction, current_price: f64) -> u8 {
    let (rsi_extreme, trend, momentum, level) = match action {
        SignalAction::Wait => return 0,
        SignalAction::Buy => (
            snapshot.rsi < OVERSOLD_RSI,
            Trend::Up,
            Momentum::Bullish,
            snapshot.support,
        ),
        SignalAction::Sell => (
            snapshot.rsi > OVERBOUGHT_RSI,
            Trend::Down,
            Momentum::Bearish,
            snapshot.resistance,
        ),
    };

    let bonuses = [
        (rsi_extreme, RSI_EXTREME_BONUS),
        (
            snapshot.volatility_level != VolatilityLevel::Low,
            VOLATILITY_BONUS,
        ),
        (snapshot.trend == trend, TREND_BONUS),
        (snapshot.momentum == momentum, MOMENTUM_BONUS),
        (
            (current_price - level).abs() < LEVEL_PROXIMITY * current_price,
            LEVEL_BONUS,
        ),
    ];

    let total = bonuses
        .iter()
        .filter(|(applies, _)| *applies)
        .fold(BASE, |acc, (_, bonus)| acc.saturating_add(*bonus));
    total.min(MAX_CONFIDENCE)
}

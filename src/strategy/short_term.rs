use crate::indicator::{IndicatorSnapshot, Momentum, Trend, VolatilityLevel};
use crate::model::SignalAction;
use crate::strategy::{Decision, RuleSet};

/// Trend + pullback rules for 1m..1h timeframes.
///
/// Trades only with a clear EMA trend and non-extreme volatility. A
/// pullback toward the fast SMA is the preferred entry; momentum alone
/// gives a weaker continuation signal.
pub struct ShortTermRules;

impl RuleSet for ShortTermRules {
    fn name(&self) -> &str {
        "short_term"
    }

    fn evaluate(&self, s: &IndicatorSnapshot, current_price: f64) -> Decision {
        if s.trend == Trend::Flat {
            return Decision::wait(
                "No clear trend. Market is trading sideways.",
                "Wait for breakout",
            );
        }

        if s.volatility_level == VolatilityLevel::High {
            return Decision::wait(
                "Volatility too high. Market is risky and unstable.",
                "Wait for stabilization",
            );
        }

        match s.trend {
            Trend::Up => uptrend(s, current_price),
            Trend::Down => downtrend(s, current_price),
            Trend::Flat => None,
        }
        .unwrap_or_else(|| {
            Decision::wait(
                "Unable to determine reliable signal from current market conditions.",
                "Wait for setup",
            )
        })
    }
}

fn uptrend(s: &IndicatorSnapshot, price: f64) -> Option<Decision> {
    let buy = |reasoning: String, entry_time| {
        Decision::trade(SignalAction::Buy, s, price, reasoning, entry_time)
    };

    if s.pullback_detected && s.momentum == Momentum::Bullish {
        return Some(buy(
            format!(
                "TREND BUY\nUptrend with pullback to MA. RSI: {:.1} (bullish).\n\
                 ATR: {:.6} ({}).\nStrong continuation setup.",
                s.rsi,
                s.atr,
                s.volatility_level.as_str()
            ),
            "Now",
        ));
    }
    if s.pullback_detected {
        return Some(buy(
            format!(
                "TREND BUY\nUptrend with pullback to MA. RSI: {:.1} (neutral).\n\
                 Good risk/reward at support level {:.6}.",
                s.rsi, s.support
            ),
            "Now",
        ));
    }
    if s.momentum == Momentum::Bullish {
        return Some(buy(
            format!(
                "Uptrend continues. RSI: {:.1} (bullish). Wait for pullback for better entry.",
                s.rsi
            ),
            "Next 5 candles",
        ));
    }
    None
}

fn downtrend(s: &IndicatorSnapshot, price: f64) -> Option<Decision> {
    let sell = |reasoning: String, entry_time| {
        Decision::trade(SignalAction::Sell, s, price, reasoning, entry_time)
    };

    if s.pullback_detected && s.momentum == Momentum::Bearish {
        return Some(sell(
            format!(
                "TREND SELL\nDowntrend with pullback to MA. RSI: {:.1} (bearish).\n\
                 ATR: {:.6} ({}).\nStrong continuation setup.",
                s.rsi,
                s.atr,
                s.volatility_level.as_str()
            ),
            "Now",
        ));
    }
    if s.pullback_detected {
        return Some(sell(
            format!(
                "TREND SELL\nDowntrend with pullback to MA. RSI: {:.1} (neutral).\n\
                 Good risk/reward at resistance level {:.6}.",
                s.rsi, s.resistance
            ),
            "Now",
        ));
    }
    if s.momentum == Momentum::Bearish {
        return Some(sell(
            format!(
                "Downtrend continues. RSI: {:.1} (bearish). Wait for pullback for better entry.",
                s.rsi
            ),
            "Next 5 candles",
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::snapshot;

    fn evaluate(s: &IndicatorSnapshot) -> Decision {
        ShortTermRules.evaluate(s, 100.0)
    }

    #[test]
    fn flat_trend_waits() {
        let decision = evaluate(&snapshot());
        assert_eq!(decision.action, SignalAction::Wait);
        assert_eq!(decision.confidence, 0);
        assert!(decision.reasoning.contains("sideways"));
        assert_eq!(decision.entry_time, "Wait for breakout");
    }

    #[test]
    fn flat_trend_checked_before_volatility() {
        let mut s = snapshot();
        s.volatility_level = VolatilityLevel::High;
        assert!(evaluate(&s).reasoning.contains("sideways"));
    }

    #[test]
    fn high_volatility_waits() {
        let mut s = snapshot();
        s.trend = Trend::Up;
        s.volatility_level = VolatilityLevel::High;
        s.pullback_detected = true;
        s.momentum = Momentum::Bullish;
        let decision = evaluate(&s);
        assert_eq!(decision.action, SignalAction::Wait);
        assert_eq!(decision.entry_time, "Wait for stabilization");
    }

    #[test]
    fn uptrend_pullback_with_momentum_is_strong_buy() {
        let mut s = snapshot();
        s.trend = Trend::Up;
        s.pullback_detected = true;
        s.momentum = Momentum::Bullish;
        s.rsi = 62.0;
        let decision = evaluate(&s);
        assert_eq!(decision.action, SignalAction::Buy);
        assert_eq!(decision.entry_time, "Now");
        assert_eq!(decision.confidence, 90);
        assert!(decision.reasoning.contains("RSI: 62.0 (bullish)"));
    }

    #[test]
    fn uptrend_pullback_without_momentum_is_moderate_buy() {
        let mut s = snapshot();
        s.trend = Trend::Up;
        s.pullback_detected = true;
        let decision = evaluate(&s);
        assert_eq!(decision.action, SignalAction::Buy);
        assert_eq!(decision.entry_time, "Now");
        assert_eq!(decision.confidence, 80);
        assert!(decision.reasoning.contains("support level 98.000000"));
    }

    #[test]
    fn uptrend_momentum_without_pullback_is_weak_buy() {
        let mut s = snapshot();
        s.trend = Trend::Up;
        s.momentum = Momentum::Bullish;
        let decision = evaluate(&s);
        assert_eq!(decision.action, SignalAction::Buy);
        assert_eq!(decision.entry_time, "Next 5 candles");
        assert!(decision.reasoning.contains("Wait for pullback"));
    }

    #[test]
    fn uptrend_without_setup_waits() {
        let mut s = snapshot();
        s.trend = Trend::Up;
        s.momentum = Momentum::Bearish;
        let decision = evaluate(&s);
        assert_eq!(decision.action, SignalAction::Wait);
        assert_eq!(decision.entry_time, "Wait for setup");
    }

    #[test]
    fn downtrend_mirrors_uptrend() {
        let mut s = snapshot();
        s.trend = Trend::Down;
        s.pullback_detected = true;
        s.momentum = Momentum::Bearish;
        assert_eq!(evaluate(&s).action, SignalAction::Sell);

        s.momentum = Momentum::Neutral;
        let decision = evaluate(&s);
        assert_eq!(decision.action, SignalAction::Sell);
        assert!(decision.reasoning.contains("resistance level 102.000000"));

        s.pullback_detected = false;
        s.momentum = Momentum::Bearish;
        assert_eq!(evaluate(&s).entry_time, "Next 5 candles");
    }

    #[test]
    fn uptrend_never_sells() {
        let mut s = snapshot();
        s.trend = Trend::Up;
        for momentum in [Momentum::Bullish, Momentum::Bearish, Momentum::Neutral] {
            for pullback in [true, false] {
                s.momentum = momentum;
                s.pullback_detected = pullback;
                assert_ne!(evaluate(&s).action, SignalAction::Sell);
            }
        }
    }
}

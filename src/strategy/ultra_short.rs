use crate::indicator::{IndicatorSnapshot, Momentum, VolatilityLevel};
use crate::model::SignalAction;
use crate::strategy::{Decision, RuleSet};

const OVERSOLD_RSI: f64 = 35.0;
const OVERBOUGHT_RSI: f64 = 65.0;
const MID_RSI: f64 = 50.0;

/// RSI reversal + momentum rules for 5s..30s timeframes.
pub struct UltraShortRules;

impl RuleSet for UltraShortRules {
    fn name(&self) -> &str {
        "ultra_short"
    }

    fn evaluate(&self, s: &IndicatorSnapshot, current_price: f64) -> Decision {
        if s.volatility_level == VolatilityLevel::Low {
            return Decision::wait(
                format!(
                    "WAIT - NO SIGNAL\nMarket is too flat. ATR: {:.6} (LOW).\n\
                     RSI: {:.1} | Momentum: {}\n\
                     Waiting for volatility expansion and clear direction.",
                    s.atr,
                    s.rsi,
                    s.momentum.as_str()
                ),
                "Wait for volatility",
            );
        }

        if s.momentum == Momentum::Neutral {
            return Decision::wait(
                format!(
                    "WAIT - NO SIGNAL\nNo clear momentum direction.\n\
                     RSI at {:.1} (neutral 40-60 zone).\n\
                     Volatility: {} | Waiting for momentum alignment.",
                    s.rsi,
                    s.volatility_level.as_str()
                ),
                "Wait for setup",
            );
        }

        let trade = |action, reasoning: String, entry_time| {
            Decision::trade(action, s, current_price, reasoning, entry_time)
        };

        if s.rsi < OVERSOLD_RSI && s.momentum == Momentum::Bullish {
            return trade(
                SignalAction::Buy,
                format!(
                    "STRONG BUY\nRSI oversold at {:.1}, bullish momentum confirmed.\n\
                     Volatility: {} (ATR: {})\nQuick reversal expected.",
                    s.rsi,
                    s.volatility_level.as_str(),
                    atr_text(s.atr)
                ),
                "Immediate",
            );
        }

        if s.rsi > OVERBOUGHT_RSI && s.momentum == Momentum::Bearish {
            return trade(
                SignalAction::Sell,
                format!(
                    "STRONG SELL\nRSI overbought at {:.1}, bearish momentum confirmed.\n\
                     Volatility: {} (ATR: {})\nQuick reversal expected.",
                    s.rsi,
                    s.volatility_level.as_str(),
                    atr_text(s.atr)
                ),
                "Immediate",
            );
        }

        if s.momentum == Momentum::Bullish && s.rsi >= MID_RSI {
            return trade(
                SignalAction::Buy,
                format!(
                    "MILD BUY\nBullish bias (RSI: {:.1}).\nVolatility: {}. Moderate risk.\n\
                     Consider waiting for stronger signal or lower entry.",
                    s.rsi,
                    s.volatility_level.as_str()
                ),
                "Next candle",
            );
        }

        if s.momentum == Momentum::Bearish && s.rsi <= MID_RSI {
            return trade(
                SignalAction::Sell,
                format!(
                    "MILD SELL\nBearish bias (RSI: {:.1}).\nVolatility: {}. Moderate risk.\n\
                     Consider waiting for stronger signal or higher entry.",
                    s.rsi,
                    s.volatility_level.as_str()
                ),
                "Next candle",
            );
        }

        Decision::wait(
            "Mixed signals. Waiting for alignment between trend, momentum, and volatility.",
            "Wait for setup",
        )
    }
}

fn atr_text(atr: f64) -> String {
    if atr > 0.0 {
        format!("{atr:.6}")
    } else {
        "N/A".to_string()
    }
}

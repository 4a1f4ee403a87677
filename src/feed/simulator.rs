use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::model::Candle;

const TREND_STEP: f64 = 1.5;
const FLAT_OSCILLATION: f64 = 0.01;
const HIGH_VOLATILITY_FACTOR: f64 = 3.0;
const HIGH_VOLATILITY_STEP_STD: f64 = 1.5;
const NEUTRAL_STEP_STD: f64 = 0.8;
const NOISE_STD: f64 = 0.5;
const WICK_STD: f64 = 0.4;
const HIGH_VOLATILITY_WICK_STD: f64 = 1.2;

/// Market shape the simulator reproduces when no real history is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketScenario {
    Uptrend,
    Downtrend,
    Flat,
    HighVolatility,
    Oversold,
    Overbought,
    Neutral,
}

impl MarketScenario {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "uptrend" => Some(Self::Uptrend),
            "downtrend" => Some(Self::Downtrend),
            "flat" => Some(Self::Flat),
            "high_volatility" => Some(Self::HighVolatility),
            "oversold" => Some(Self::Oversold),
            "overbought" => Some(Self::Overbought),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            Self::Uptrend => "uptrend",
            Self::Downtrend => "downtrend",
            Self::Flat => "flat",
            Self::HighVolatility => "high_volatility",
            Self::Oversold => "oversold",
            Self::Overbought => "overbought",
            Self::Neutral => "neutral",
        }
    }

    /// RNG seed derived from the label only (FNV-1a), so one scenario always
    /// replays the same sequence.
    fn seed(self) -> u64 {
        self.as_label()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
            })
    }
}

/// Generate `count` deterministic candles starting at `current_price`.
///
/// `volatility` is a fraction of price (0.001 = 0.1%). Every candle opens
/// at the previous close. Never fails: degenerate inputs just produce flat
/// or empty output.
pub fn simulate(
    current_price: f64,
    count: usize,
    volatility: f64,
    scenario: MarketScenario,
) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(scenario.seed());
    let volatility = match scenario {
        MarketScenario::HighVolatility => volatility * HIGH_VOLATILITY_FACTOR,
        _ => volatility,
    };
    let wick_std = match scenario {
        MarketScenario::HighVolatility => HIGH_VOLATILITY_WICK_STD,
        _ => WICK_STD,
    };
    let half = count / 2;

    let mut candles = Vec::with_capacity(count);
    let mut open = current_price;
    for i in 0..count {
        let unit = volatility * open;
        let movement = match scenario {
            MarketScenario::Uptrend => TREND_STEP * unit,
            MarketScenario::Downtrend => -TREND_STEP * unit,
            MarketScenario::Flat => ((i % 3) as f64 - 1.0) * FLAT_OSCILLATION * unit,
            MarketScenario::HighVolatility => gaussian(&mut rng, HIGH_VOLATILITY_STEP_STD * unit),
            MarketScenario::Oversold if i < half => -TREND_STEP * unit,
            MarketScenario::Oversold => TREND_STEP * unit,
            MarketScenario::Overbought if i < half => TREND_STEP * unit,
            MarketScenario::Overbought => -TREND_STEP * unit,
            MarketScenario::Neutral => gaussian(&mut rng, NEUTRAL_STEP_STD * unit),
        };
        let noise = match scenario {
            MarketScenario::Flat => 0.0,
            _ => gaussian(&mut rng, NOISE_STD * unit),
        };

        let close = open + movement + noise;
        let wick = gaussian(&mut rng, wick_std * unit).abs();
        candles.push(Candle {
            open,
            high: open.max(close) + wick,
            low: open.min(close) - wick,
            close,
        });
        open = close;
    }
    candles
}

/// One draw from N(0, std). A zero, negative or non-finite deviation
/// draws 0.
fn gaussian(rng: &mut StdRng, std: f64) -> f64 {
    if !std.is_finite() || std <= 0.0 {
        return 0.0;
    }
    Normal::new(0.0, std).map_or(0.0, |normal| normal.sample(rng))
}

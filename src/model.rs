use std::fmt;

use serde::{Deserialize, Serialize};

/// Signal timeframe accepted by the facade.
///
/// String representations match the bot menu format (e.g. `"15s"`, `"1h"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrame {
    #[serde(rename = "5s")]
    Sec5,
    #[serde(rename = "10s")]
    Sec10,
    #[serde(rename = "15s")]
    Sec15,
    #[serde(rename = "30s")]
    Sec30,
    #[serde(rename = "1m")]
    Min1,
    #[serde(rename = "3m")]
    Min3,
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "10m")]
    Min10,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "30m")]
    Min30,
    #[serde(rename = "1h")]
    Hour1,
}

/// Which rule set a timeframe is evaluated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrameClass {
    UltraShort,
    Short,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 11] = [
        Self::Sec5,
        Self::Sec10,
        Self::Sec15,
        Self::Sec30,
        Self::Min1,
        Self::Min3,
        Self::Min5,
        Self::Min10,
        Self::Min15,
        Self::Min30,
        Self::Hour1,
    ];

    /// Parse a menu-format string into a `TimeFrame`.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tf| tf.as_str() == s)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sec5 => "5s",
            Self::Sec10 => "10s",
            Self::Sec15 => "15s",
            Self::Sec30 => "30s",
            Self::Min1 => "1m",
            Self::Min3 => "3m",
            Self::Min5 => "5m",
            Self::Min10 => "10m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Hour1 => "1h",
        }
    }

    /// Candle length in seconds.
    pub fn seconds(self) -> u32 {
        match self {
            Self::Sec5 => 5,
            Self::Sec10 => 10,
            Self::Sec15 => 15,
            Self::Sec30 => 30,
            Self::Min1 => 60,
            Self::Min3 => 180,
            Self::Min5 => 300,
            Self::Min10 => 600,
            Self::Min15 => 900,
            Self::Min30 => 1800,
            Self::Hour1 => 3600,
        }
    }

    pub fn class(self) -> TimeFrameClass {
        match self {
            Self::Sec5 | Self::Sec10 | Self::Sec15 | Self::Sec30 => TimeFrameClass::UltraShort,
            _ => TimeFrameClass::Short,
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One OHLC price bar. Candles are never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Finite prices with the high and low bracketing the open and close.
    pub fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Wait,
}

impl SignalAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Wait => "WAIT",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

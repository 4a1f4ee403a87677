use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

/// Failures of a real candle source. The facade treats these as a trigger
/// for simulator fallback, never as a failed signal.
#[derive(Debug, Display, Error)]
pub enum FeedError {
    #[display("failed to read candles from {source_name}")]
    Read { source_name: String },
    #[display("failed to parse candles from {source_name}")]
    Parse { source_name: String },
}

#[derive(Debug, Display, Error)]
pub enum SignalError {
    #[display("invalid pair")]
    InvalidPair,
    #[display("invalid timeframe: {value}")]
    InvalidTimeframe { value: String },
    #[display("invalid price: {value}")]
    InvalidPrice { value: f64 },
    #[display("signal computation failed")]
    Computation,
}

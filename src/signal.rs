use std::panic::{AssertUnwindSafe, catch_unwind};

use error_stack::{Report, ResultExt};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::SignalError;
use crate::feed::file::FileFeed;
use crate::feed::simulator;
use crate::feed::{CandleFeed, EmptyFeed};
use crate::indicator::IndicatorSnapshot;
use crate::model::{Candle, SignalAction, TimeFrame, TimeFrameClass};
use crate::strategy::entry::{Clock, SystemClock, entry_instruction};
use crate::strategy::rule_set_for;

/// Recommendation for one pair and timeframe.
#[derive(Debug, Clone, Serialize)]
pub struct SignalResult {
    pub action: SignalAction,
    /// 0 for WAIT, otherwise in 50..=90.
    pub confidence: u8,
    pub timeframe: String,
    pub pair: String,
    pub current_price: f64,
    pub support: f64,
    pub resistance: f64,
    pub reasoning: String,
    pub entry_time: String,
    /// Wall-clock dependent advice. Absent on rejected input and on errors.
    pub entry_instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<IndicatorSnapshot>,
}

impl SignalResult {
    /// WAIT result with placeholder levels at ±1% of the price.
    fn rejected(pair: &str, timeframe: &str, current_price: f64, reasoning: &str) -> Self {
        let (support, resistance) = if current_price.is_finite() && current_price > 0.0 {
            (current_price * 0.99, current_price * 1.01)
        } else {
            (0.0, 0.0)
        };
        Self {
            action: SignalAction::Wait,
            confidence: 0,
            timeframe: timeframe.to_string(),
            pair: pair.to_string(),
            current_price,
            support,
            resistance,
            reasoning: reasoning.to_string(),
            entry_time: "N/A".to_string(),
            entry_instruction: None,
            indicators: None,
        }
    }

    /// Plain-text summary for chat or terminal output.
    pub fn to_message(&self) -> String {
        let mut message = format!(
            "Pair: {} | Timeframe: {}\nAction: {}\nConfidence: {}%\nEntry: {}",
            self.pair, self.timeframe, self.action, self.confidence, self.entry_time
        );
        if let Some(instruction) = &self.entry_instruction {
            message.push_str(&format!(" ({instruction})"));
        }
        message.push_str(&format!("\n\nAnalysis:\n{}", self.reasoning));
        message.push_str(&format!(
            "\n\nKey Levels:\nS: {:.6} | R: {:.6}",
            self.support, self.resistance
        ));
        message
    }
}

fn rejection_reason(error: &SignalError) -> &'static str {
    match error {
        SignalError::InvalidPair => "Invalid pair specified.",
        SignalError::InvalidTimeframe { .. } => "Invalid timeframe specified.",
        SignalError::InvalidPrice { .. } => "Invalid price data.",
        SignalError::Computation => "Error calculating signal. Please try again.",
    }
}

/// Turns (pair, timeframe, price) requests into signals.
///
/// Stateless between calls; one service can be shared across threads.
pub struct SignalService {
    feed: Box<dyn CandleFeed>,
    clock: Box<dyn Clock>,
    config: AppConfig,
}

impl SignalService {
    /// Reads candle files from `feed.data_dir` when set, otherwise every
    /// request is simulated.
    pub fn new(config: &AppConfig) -> Self {
        let feed: Box<dyn CandleFeed> = match &config.feed.data_dir {
            Some(dir) => Box::new(FileFeed::new(dir)),
            None => Box::new(EmptyFeed),
        };
        Self {
            feed,
            clock: Box::new(SystemClock),
            config: config.clone(),
        }
    }

    pub fn with_feed(mut self, feed: impl CandleFeed + 'static) -> Self {
        self.feed = Box::new(feed);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Never fails: rejected input and internal failures both come back as
    /// WAIT with confidence 0.
    pub fn generate(&self, pair: &str, timeframe: &str, current_price: f64) -> SignalResult {
        let timeframe_parsed = match validate(pair, timeframe, current_price) {
            Ok(tf) => tf,
            Err(report) => {
                warn!(pair, timeframe, current_price, error = ?report, "signal request rejected");
                return SignalResult::rejected(
                    pair,
                    timeframe,
                    current_price,
                    rejection_reason(report.current_context()),
                );
            }
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.compute(pair, timeframe_parsed, current_price)
        }));

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(report)) => {
                error!(pair, timeframe, error = ?report, "signal computation failed");
                SignalResult::rejected(
                    pair,
                    timeframe,
                    current_price,
                    rejection_reason(report.current_context()),
                )
            }
            Err(_) => {
                error!(pair, timeframe, "signal computation panicked");
                SignalResult::rejected(
                    pair,
                    timeframe,
                    current_price,
                    rejection_reason(&SignalError::Computation),
                )
            }
        }
    }

    fn compute(
        &self,
        pair: &str,
        timeframe: TimeFrame,
        current_price: f64,
    ) -> Result<SignalResult, Report<SignalError>> {
        let candles = self.candles(pair, timeframe, current_price);

        let snapshot = IndicatorSnapshot::from_candles(&candles, &self.config.indicators)
            .change_context(SignalError::Computation)
            .attach_with(|| format!("pair: {pair}, timeframe: {timeframe}"))?;

        debug!(
            pair,
            timeframe = %timeframe,
            trend = ?snapshot.trend,
            volatility = snapshot.volatility_level.as_str(),
            rsi = snapshot.rsi,
            momentum = snapshot.momentum.as_str(),
            "indicators computed"
        );

        let rules = rule_set_for(timeframe.class());
        let decision = rules.evaluate(&snapshot, current_price);

        info!(
            pair,
            timeframe = %timeframe,
            rules = rules.name(),
            action = %decision.action,
            confidence = decision.confidence,
            "signal generated"
        );

        Ok(SignalResult {
            action: decision.action,
            confidence: decision.confidence,
            timeframe: timeframe.as_str().to_string(),
            pair: pair.to_string(),
            current_price,
            support: snapshot.support,
            resistance: snapshot.resistance,
            reasoning: decision.reasoning,
            entry_time: decision.entry_time.to_string(),
            entry_instruction: Some(entry_instruction(timeframe, self.clock.as_ref())),
            indicators: Some(snapshot),
        })
    }

    /// Real candles when the feed has enough of them, simulated otherwise.
    fn candles(&self, pair: &str, timeframe: TimeFrame, current_price: f64) -> Vec<Candle> {
        let mut real = match self.feed.fetch(pair, timeframe) {
            Ok(candles) => candles,
            Err(report) => {
                warn!(
                    feed = self.feed.name(),
                    pair,
                    timeframe = %timeframe,
                    error = ?report,
                    "candle feed failed, falling back to simulation"
                );
                Vec::new()
            }
        };
        let fetched = real.len();
        real.retain(Candle::is_well_formed);
        if real.len() < fetched {
            debug!(
                pair,
                dropped = fetched - real.len(),
                "malformed candles dropped from feed"
            );
        }

        let sim = &self.config.simulation;
        if real.len() >= sim.min_real_candles {
            debug!(feed = self.feed.name(), pair, candles = real.len(), "using real candles");
            return real;
        }

        let (volatility, count) = match timeframe.class() {
            TimeFrameClass::UltraShort => (sim.ultra_short_volatility, sim.ultra_short_candles),
            TimeFrameClass::Short => (sim.short_volatility, sim.short_candles),
        };
        let scenario = self.config.scenario_for(pair);
        debug!(
            pair,
            real = real.len(),
            scenario = scenario.as_label(),
            count,
            "simulating candle history"
        );
        simulator::simulate(current_price, count, volatility, scenario)
    }
}

fn validate(
    pair: &str,
    timeframe: &str,
    current_price: f64,
) -> Result<TimeFrame, Report<SignalError>> {
    if pair.is_empty() {
        return Err(Report::new(SignalError::InvalidPair));
    }
    let Some(tf) = TimeFrame::from_str(timeframe) else {
        return Err(Report::new(SignalError::InvalidTimeframe {
            value: timeframe.to_string(),
        }));
    };
    if !current_price.is_finite() || current_price <= 0.0 {
        return Err(Report::new(SignalError::InvalidPrice {
            value: current_price,
        }));
    }
    Ok(tf)
}

/// One-shot signal with the default configuration and no real data source.
pub fn generate_trading_signal(pair: &str, timeframe: &str, current_price: f64) -> SignalResult {
    SignalService::new(&AppConfig::default()).generate(pair, timeframe, current_price)
}

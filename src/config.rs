use std::collections::{HashMap, HashSet};
use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::feed::simulator::MarketScenario;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_min_real_candles() -> usize {
    5
}

fn default_ultra_short_volatility() -> f64 {
    0.0005
}

fn default_ultra_short_candles() -> usize {
    30
}

fn default_short_volatility() -> f64 {
    0.001
}

fn default_short_candles() -> usize {
    50
}

fn default_fast_period() -> usize {
    5
}

fn default_slow_period() -> usize {
    20
}

fn default_rsi_period() -> usize {
    14
}

fn default_atr_period() -> usize {
    14
}

fn default_level_window() -> usize {
    20
}

const DEFAULT_SCENARIOS: &[(&str, &str)] = &[
    ("CAD/JPY", "neutral"),
    ("GBP/JPY", "uptrend"),
    ("EUR/GBP", "flat"),
    ("USD/CNH", "high_volatility"),
    ("AUD/CAD", "downtrend"),
    ("AUD/JPY", "neutral"),
    ("EURUSD", "neutral"),
    ("GBPUSD", "uptrend"),
    ("USDJPY", "flat"),
    ("XAUUSD", "high_volatility"),
    ("AUDUSD", "downtrend"),
    ("XAGUSD", "neutral"),
];

fn default_scenarios() -> HashMap<String, String> {
    DEFAULT_SCENARIOS
        .iter()
        .map(|(pair, label)| (pair.to_string(), label.to_string()))
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub indicators: IndicatorSettings,
    #[serde(default)]
    pub feed: FeedConfig,
    /// Pair -> market scenario label used when the simulator stands in for
    /// real data.
    #[serde(default = "default_scenarios")]
    pub scenarios: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            simulation: SimulationConfig::default(),
            indicators: IndicatorSettings::default(),
            feed: FeedConfig::default(),
            scenarios: default_scenarios(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Fewer real candles than this triggers the simulator.
    #[serde(default = "default_min_real_candles")]
    pub min_real_candles: usize,
    #[serde(default = "default_ultra_short_volatility")]
    pub ultra_short_volatility: f64,
    #[serde(default = "default_ultra_short_candles")]
    pub ultra_short_candles: usize,
    #[serde(default = "default_short_volatility")]
    pub short_volatility: f64,
    #[serde(default = "default_short_candles")]
    pub short_candles: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_real_candles: default_min_real_candles(),
            ultra_short_volatility: default_ultra_short_volatility(),
            ultra_short_candles: default_ultra_short_candles(),
            short_volatility: default_short_volatility(),
            short_candles: default_short_candles(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorSettings {
    #[serde(default = "default_fast_period")]
    pub fast_period: usize,
    #[serde(default = "default_slow_period")]
    pub slow_period: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    /// Trailing candles scanned for support and resistance.
    #[serde(default = "default_level_window")]
    pub level_window: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            fast_period: default_fast_period(),
            slow_period: default_slow_period(),
            rsi_period: default_rsi_period(),
            atr_period: default_atr_period(),
            level_window: default_level_window(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedConfig {
    /// Directory of `<PAIR>_<timeframe>.json` candle files.
    pub data_dir: Option<String>,
}

impl AppConfig {
    /// Scenario for `pair`, matched case-insensitively. Unknown pairs are
    /// simulated as a neutral market.
    pub fn scenario_for(&self, pair: &str) -> MarketScenario {
        self.scenarios
            .iter()
            .find(|(configured, _)| configured.eq_ignore_ascii_case(pair))
            .and_then(|(_, label)| MarketScenario::from_label(label))
            .unwrap_or(MarketScenario::Neutral)
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

pub fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_log_format(config)?;
    validate_simulation(config)?;
    validate_indicator_periods(config)?;
    validate_scenarios(config)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_log_format(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let format = config.general.log_format.as_str();
    if !VALID_LOG_FORMATS.contains(&format) {
        return Err(invalid(format!(
            "general.log_format \"{format}\" is not one of {VALID_LOG_FORMATS:?}"
        )));
    }
    Ok(())
}

fn validate_simulation(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let sim = &config.simulation;
    if sim.min_real_candles == 0 {
        return Err(invalid("simulation.min_real_candles must be > 0".into()));
    }

    let volatilities = [
        ("ultra_short_volatility", sim.ultra_short_volatility),
        ("short_volatility", sim.short_volatility),
    ];
    for (name, value) in volatilities {
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(format!(
                "simulation.{name} must be a positive number, got {value}"
            )));
        }
    }

    let counts = [
        ("ultra_short_candles", sim.ultra_short_candles),
        ("short_candles", sim.short_candles),
    ];
    for (name, value) in counts {
        if value == 0 {
            return Err(invalid(format!("simulation.{name} must be > 0")));
        }
    }
    Ok(())
}

fn validate_indicator_periods(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let ind = &config.indicators;
    let periods = [
        ("fast_period", ind.fast_period),
        ("slow_period", ind.slow_period),
        ("rsi_period", ind.rsi_period),
        ("atr_period", ind.atr_period),
        ("level_window", ind.level_window),
    ];
    for (name, value) in periods {
        if value == 0 {
            return Err(invalid(format!("indicators.{name} must be > 0")));
        }
    }
    Ok(())
}

fn validate_scenarios(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let mut seen = HashSet::new();
    for (pair, label) in &config.scenarios {
        if MarketScenario::from_label(label).is_none() {
            return Err(invalid(format!(
                "scenarios[\"{pair}\"] \"{label}\" is not a known market scenario"
            )));
        }
        // lookup ignores case, so keys differing only by case are ambiguous
        if !seen.insert(pair.to_uppercase()) {
            return Err(invalid(format!(
                "scenarios[\"{pair}\"] duplicates another pair up to letter case"
            )));
        }
    }
    Ok(())
}

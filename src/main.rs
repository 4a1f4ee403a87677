use std::path::Path;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pair_signal::config::{self, AppConfig};
use pair_signal::{SignalResult, SignalService};

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("output error")]
    Output,
    #[display("runtime error")]
    Runtime,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "pair-signal", about = "BUY/SELL/WAIT signals for currency pairs")]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Pairs to evaluate, e.g. "EUR/USD"
    #[arg(required = true)]
    pairs: Vec<String>,

    /// Timeframes to evaluate: 5s 10s 15s 30s 1m 3m 5m 10m 15m 30m 1h
    #[arg(short, long, num_args = 1.., default_value = "1m")]
    timeframe: Vec<String>,

    /// Current market price of the pair
    #[arg(short, long, allow_negative_numbers = true)]
    price: f64,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load(Path::new(path)).change_context(AppError::Config)?,
        None => AppConfig::default(),
    };

    init_tracing(&config);

    let service = Arc::new(SignalService::new(&config));

    let jobs: Vec<(String, String)> = cli
        .pairs
        .iter()
        .flat_map(|pair| cli.timeframe.iter().map(move |tf| (pair.clone(), tf.clone())))
        .collect();
    info!(jobs = jobs.len(), price = cli.price, "evaluating signals");

    // Evaluation is CPU-bound; keep it off the async workers.
    let mut handles = Vec::with_capacity(jobs.len());
    for (pair, timeframe) in jobs {
        let service = Arc::clone(&service);
        let price = cli.price;
        handles.push(tokio::task::spawn_blocking(move || {
            service.generate(&pair, &timeframe, price)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.change_context(AppError::Runtime)?);
    }

    print_results(&results, cli.format)
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn print_results(results: &[SignalResult], format: OutputFormat) -> Result<(), Report<AppError>> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(results).change_context(AppError::Output)?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let messages: Vec<String> = results.iter().map(SignalResult::to_message).collect();
            println!("{}", messages.join("\n\n----------------------------------------\n\n"));
        }
    }
    Ok(())
}

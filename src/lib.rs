pub mod config;
pub mod error;
pub mod feed;
pub mod indicator;
pub mod model;
pub mod signal;
pub mod strategy;

pub use model::{SignalAction, TimeFrame};
pub use signal::{SignalResult, SignalService, generate_trading_signal};

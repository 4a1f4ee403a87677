use chrono::{DateTime, Timelike, Utc};

use crate::model::TimeFrame;

/// Seconds at the end of a candle in which a new entry is discouraged.
const CLOSE_GUARD_SECS: i64 = 3;
/// For 1m candles, entries are still fine this many seconds after the open.
const ONE_MINUTE_GRACE_SECS: u32 = 5;

/// Source of wall-clock time for the entry instruction.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant. Used to pin the entry instruction in tests.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Advisory entry timing text for a timeframe at the clock's current time.
///
/// Depends only on the clock, never on the indicator state, so two calls with
/// identical market data can still disagree here.
pub fn entry_instruction(timeframe: TimeFrame, clock: &dyn Clock) -> String {
    let secs = timeframe.seconds();
    let now = clock.now();

    if secs <= 15 {
        return "Enter immediately.".to_string();
    }

    if secs == 60 {
        return if now.second() <= ONE_MINUTE_GRACE_SECS {
            "Enter immediately."
        } else {
            "Wait for next candle open."
        }
        .to_string();
    }

    let secs = i64::from(secs);
    let position = now.timestamp().rem_euclid(secs);
    if position >= secs - CLOSE_GUARD_SECS {
        "Near candle close, skip trade.".to_string()
    } else {
        "Enter within first 3 seconds after candle open.".to_string()
    }
}

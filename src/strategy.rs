pub mod confidence;
pub mod entry;
pub mod short_term;
pub mod ultra_short;

use crate::indicator::IndicatorSnapshot;
use crate::model::{SignalAction, TimeFrameClass};

use short_term::ShortTermRules;
use ultra_short::UltraShortRules;

/// Outcome of one rule set evaluation, before the facade attaches the
/// request context.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: SignalAction,
    /// 0 for WAIT, otherwise in 50..=90.
    pub confidence: u8,
    pub reasoning: String,
    pub entry_time: &'static str,
}

impl Decision {
    pub fn wait(reasoning: impl Into<String>, entry_time: &'static str) -> Self {
        Self {
            action: SignalAction::Wait,
            confidence: 0,
            reasoning: reasoning.into(),
            entry_time,
        }
    }

    /// A BUY or SELL scored with the weighted confidence formula.
    pub fn trade(
        action: SignalAction,
        snapshot: &IndicatorSnapshot,
        current_price: f64,
        reasoning: impl Into<String>,
        entry_time: &'static str,
    ) -> Self {
        Self {
            action,
            confidence: confidence::score(snapshot, action, current_price),
            reasoning: reasoning.into(),
            entry_time,
        }
    }
}

/// A first-match-wins policy mapping indicator state to an action.
pub trait RuleSet: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, snapshot: &IndicatorSnapshot, current_price: f64) -> Decision;
}

/// Rule set used for a timeframe class.
pub fn rule_set_for(class: TimeFrameClass) -> &'static dyn RuleSet {
    match class {
        TimeFrameClass::UltraShort => &UltraShortRules,
        TimeFrameClass::Short => &ShortTermRules,
    }
}

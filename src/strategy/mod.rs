pub mod confirmation;
pub mod smart_range_scout;
pub mod trend_tracker;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, MarketCondition};
use crate::model::candle::Candle;
use crate::model::position::Position;

pub use confirmation::{Confirmation, ExitSlot};
pub use smart_range_scout::SmartRangeScout;
pub use trend_tracker::TrendTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    #[default]
    TrendTracker,
    #[serde(alias = "SmartRange Scout")]
    SmartRangeScout,
}

impl StrategyKind {
    /// Name recorded on trades opened by this strategy.
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::TrendTracker => "TrendTracker",
            StrategyKind::SmartRangeScout => "SmartRange Scout",
        }
    }

    /// Regime this strategy trades in.
    pub fn target_condition(&self) -> MarketCondition {
        match self {
            StrategyKind::TrendTracker => MarketCondition::Uptrend,
            StrategyKind::SmartRangeScout => MarketCondition::Ranging,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryDecision {
    Enter,
    Reject(RejectReason),
}

impl EntryDecision {
    pub fn is_enter(&self) -> bool {
        matches!(self, EntryDecision::Enter)
    }
}

/// Why an entry was refused. Each variant maps to a stable reason code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    ConditionMismatch {
        expected: MarketCondition,
        actual: MarketCondition,
    },
    MissingIndicators,
    DailyEmaNotBullish,
    HourlyRsiTooLow(f64),
    ShortTermRsiTooLow(f64),
    MacdNotBullish,
    ConfirmationFailed(Confirmation),
    AboveLowerBand {
        close: f64,
        lower: f64,
    },
    NotOversold(f64),
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConditionMismatch { .. } => "entry.condition_mismatch",
            Self::MissingIndicators => "entry.missing_indicators",
            Self::DailyEmaNotBullish => "entry.daily_ema_not_bullish",
            Self::HourlyRsiTooLow(_) => "entry.hourly_rsi_too_low",
            Self::ShortTermRsiTooLow(_) => "entry.short_term_rsi_too_low",
            Self::MacdNotBullish => "entry.macd_not_bullish",
            Self::ConfirmationFailed(_) => "entry.confirmation_failed",
            Self::AboveLowerBand { .. } => "entry.above_lower_band",
            Self::NotOversold(_) => "entry.not_oversold",
        }
    }
}

/// Rule set of the configured strategy, dispatched by kind.
#[derive(Debug, Clone)]
pub enum StrategyRules {
    TrendTracker(TrendTracker),
    SmartRangeScout(SmartRangeScout),
}

impl StrategyRules {
    pub fn from_kind(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::TrendTracker => Self::TrendTracker(TrendTracker::default()),
            StrategyKind::SmartRangeScout => Self::SmartRangeScout(SmartRangeScout::default()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::TrendTracker(_) => StrategyKind::TrendTracker,
            Self::SmartRangeScout(_) => StrategyKind::SmartRangeScout,
        }
    }

    pub fn evaluate_entry(&self, analysis: &AnalysisResult, recent: &[Candle]) -> EntryDecision {
        match self {
            Self::TrendTracker(s) => s.evaluate_entry(analysis, recent),
            Self::SmartRangeScout(s) => s.evaluate_entry(analysis, recent),
        }
    }

    pub fn should_exit(
        &self,
        position: &Position,
        analysis: &AnalysisResult,
        recent: &[Candle],
    ) -> bool {
        match self {
            Self::TrendTracker(s) => s.should_exit(position, analysis, recent),
            Self::SmartRangeScout(s) => s.should_exit(position, analysis, recent),
        }
    }
}

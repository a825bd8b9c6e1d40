use crate::analysis::{AnalysisResult, MarketCondition};
use crate::indicator::compute_indicators;
use crate::model::candle::Candle;
use crate::model::position::Position;

use super::confirmation::ExitSlot;
use super::{EntryDecision, RejectReason};

const OVERSOLD_RSI: f64 = 35.0;

/// Buys oversold touches of the lower band while the market ranges.
#[derive(Debug, Clone)]
pub struct SmartRangeScout {
    exit_slots: Vec<ExitSlot>,
}

impl Default for SmartRangeScout {
    fn default() -> Self {
        Self {
            exit_slots: vec![ExitSlot::TrailingStop],
        }
    }
}

impl SmartRangeScout {
    pub fn evaluate_entry(&self, analysis: &AnalysisResult, recent: &[Candle]) -> EntryDecision {
        if analysis.condition != MarketCondition::Ranging {
            return EntryDecision::Reject(RejectReason::ConditionMismatch {
                expected: MarketCondition::Ranging,
                actual: analysis.condition,
            });
        }

        let short_term = compute_indicators(recent);
        let (Some(last), Some(bands), Some(rsi)) =
            (recent.last(), short_term.bollinger, short_term.rsi)
        else {
            return EntryDecision::Reject(RejectReason::MissingIndicators);
        };

        if last.close > bands.lower {
            return EntryDecision::Reject(RejectReason::AboveLowerBand {
                close: last.close,
                lower: bands.lower,
            });
        }
        if rsi >= OVERSOLD_RSI {
            return EntryDecision::Reject(RejectReason::NotOversold(rsi));
        }
        EntryDecision::Enter
    }

    /// Exits once the regime is no longer ranging.
    pub fn should_exit(
        &self,
        _position: &Position,
        analysis: &AnalysisResult,
        recent: &[Candle],
    ) -> bool {
        match analysis.condition {
            MarketCondition::Uptrend | MarketCondition::Unclear => true,
            MarketCondition::Ranging => self.exit_slots.iter().any(|slot| slot.fires(recent)),
        }
    }
}

use crate::analysis::{AnalysisResult, MarketCondition};
use crate::indicator::compute_indicators;
use crate::model::candle::Candle;
use crate::model::position::Position;

use super::confirmation::{Confirmation, ExitSlot};
use super::{EntryDecision, RejectReason};

const MOMENTUM_RSI: f64 = 50.0;

/// Rides confirmed uptrends. Entry re-verifies every indicator rather than
/// trusting the cached regime alone.
#[derive(Debug, Clone)]
pub struct TrendTracker {
    confirmations: Vec<Confirmation>,
    exit_slots: Vec<ExitSlot>,
}

impl Default for TrendTracker {
    fn default() -> Self {
        Self {
            confirmations: vec![
                Confirmation::SupportResistanceBreak,
                Confirmation::VolumeConfirmation,
            ],
            exit_slots: vec![ExitSlot::TrailingStop, ExitSlot::EmaCrossDown],
        }
    }
}

impl TrendTracker {
    pub fn evaluate_entry(&self, analysis: &AnalysisResult, recent: &[Candle]) -> EntryDecision {
        if analysis.condition != MarketCondition::Uptrend {
            return EntryDecision::Reject(RejectReason::ConditionMismatch {
                expected: MarketCondition::Uptrend,
                actual: analysis.condition,
            });
        }

        let short_term = compute_indicators(recent);
        let Some(indicators) = analysis.indicators else {
            return EntryDecision::Reject(RejectReason::MissingIndicators);
        };
        let (Some(hourly_rsi), Some(rsi_15m), Some(macd_15m)) =
            (indicators.hourly_rsi, short_term.rsi, short_term.macd)
        else {
            return EntryDecision::Reject(RejectReason::MissingIndicators);
        };
        if indicators.daily_ema.short.is_none() || indicators.daily_ema.long.is_none() {
            return EntryDecision::Reject(RejectReason::MissingIndicators);
        }

        if !indicators.daily_ema.is_uptrend() {
            return EntryDecision::Reject(RejectReason::DailyEmaNotBullish);
        }
        if hourly_rsi <= MOMENTUM_RSI {
            return EntryDecision::Reject(RejectReason::HourlyRsiTooLow(hourly_rsi));
        }
        if rsi_15m <= MOMENTUM_RSI {
            return EntryDecision::Reject(RejectReason::ShortTermRsiTooLow(rsi_15m));
        }
        if !macd_15m.is_bullish() {
            return EntryDecision::Reject(RejectReason::MacdNotBullish);
        }

        if let Some(failed) = self.confirmations.iter().find(|c| !c.confirms(recent)) {
            return EntryDecision::Reject(RejectReason::ConfirmationFailed(*failed));
        }
        EntryDecision::Enter
    }

    /// Exits once the regime is no longer an uptrend.
    pub fn should_exit(
        &self,
        _position: &Position,
        analysis: &AnalysisResult,
        recent: &[Candle],
    ) -> bool {
        match analysis.condition {
            MarketCondition::Ranging | MarketCondition::Unclear => true,
            MarketCondition::Uptrend => self.exit_slots.iter().any(|slot| slot.fires(recent)),
        }
    }
}

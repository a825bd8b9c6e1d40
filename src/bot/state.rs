use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, MarketCondition};
use crate::lifecycle::PositionBook;
use crate::model::trade::TradeHistory;
use crate::performance::PerformanceSummary;

use super::settings::BotSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    #[default]
    Stopped,
    Analyzing,
    Running,
    Error,
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BotStatus::Stopped => "stopped",
            BotStatus::Analyzing => "analyzing",
            BotStatus::Running => "running",
            BotStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Everything the controller tracks for one bot. Read it through
/// [`BotController::snapshot`](super::BotController::snapshot).
#[derive(Debug, Clone)]
pub struct BotState {
    pub status: BotStatus,
    pub settings: BotSettings,
    pub market_condition: MarketCondition,
    pub last_analysis_at: Option<DateTime<Utc>>,
    pub positions: PositionBook,
    pub trade_history: TradeHistory,
    /// Round trips completed since the last start.
    pub current_run: u32,
    pub error_message: Option<String>,
    /// Written once per analysis phase, read-only while running.
    pub analysis: Option<AnalysisResult>,
    pub pool: Option<String>,
    /// Base amount of the next entry. Differs from `settings.amount` only
    /// when capital compounding is on.
    pub working_amount: f64,
    pub(crate) epoch: u64,
}

impl BotState {
    pub fn new(settings: BotSettings, trade_history_limit: usize) -> Self {
        Self {
            status: BotStatus::Stopped,
            working_amount: settings.amount,
            settings,
            market_condition: MarketCondition::Unclear,
            last_analysis_at: None,
            positions: PositionBook::default(),
            trade_history: TradeHistory::with_limit(trade_history_limit),
            current_run: 0,
            error_message: None,
            analysis: None,
            pool: None,
            epoch: 0,
        }
    }

    pub fn performance(&self) -> PerformanceSummary {
        PerformanceSummary::from_state(&self.trade_history, &self.positions)
    }
}

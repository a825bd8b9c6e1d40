pub mod classifier;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::indicator::MacdValue;

pub use classifier::{classify_series, ClassifierConfig, MarketClassifier};

/// Regime of the market. `Unclear` is never actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarketCondition {
    Uptrend,
    Ranging,
    #[default]
    Unclear,
}

impl MarketCondition {
    pub fn is_actionable(&self) -> bool {
        !matches!(self, MarketCondition::Unclear)
    }
}

impl fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketCondition::Uptrend => write!(f, "Uptrend"),
            MarketCondition::Ranging => write!(f, "Ranging"),
            MarketCondition::Unclear => write!(f, "Unclear"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyEma {
    pub short: Option<f64>,
    pub long: Option<f64>,
}

impl DailyEma {
    pub fn is_uptrend(&self) -> bool {
        matches!((self.short, self.long), (Some(s), Some(l)) if s > l)
    }
}

/// Indicator values the classifier decided on, kept for the strategy rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisIndicators {
    #[serde(rename = "dailyEMA")]
    pub daily_ema: DailyEma,
    #[serde(rename = "hourlyRSI")]
    pub hourly_rsi: Option<f64>,
    #[serde(rename = "fifteenMinuteMACD")]
    pub fifteen_minute_macd: Option<MacdValue>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub condition: MarketCondition,
    pub indicators: Option<AnalysisIndicators>,
}

impl AnalysisResult {
    pub fn unclear() -> Self {
        Self {
            condition: MarketCondition::Unclear,
            indicators: None,
        }
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::ClassifierConfig;
use crate::config::AssetsConfig;
use crate::error::BotError;
use crate::lifecycle::{ProtectionConfig, DEFAULT_STOP_LOSS, DEFAULT_TAKE_PROFIT};
use crate::model::action::TradeAction;
use crate::model::trade::DEFAULT_TRADE_HISTORY_LIMIT;
use crate::strategy::StrategyKind;

pub const DEFAULT_SLIPPAGE_PCT: f64 = 0.5;
pub const DEFAULT_ENTRY_CANDLE_COUNT: u32 = 96;
/// One day between ticks at most.
pub const MAX_RUN_INTERVAL_MINUTES: u64 = 24 * 60;

/// Operator settings. The controller accepts changes only while stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub strategy_type: StrategyKind,
    /// Base-asset amount per entry.
    pub amount: f64,
    pub pair: String,
    pub stop_loss: ProtectionConfig,
    pub take_profit: ProtectionConfig,
    pub max_runs: u32,
    pub run_interval_minutes: u64,
    pub compound_capital: bool,
    pub is_test_mode: bool,
    pub action: TradeAction,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            strategy_type: StrategyKind::TrendTracker,
            amount: 0.1,
            pair: "SOL/USDC".to_string(),
            stop_loss: DEFAULT_STOP_LOSS,
            take_profit: DEFAULT_TAKE_PROFIT,
            max_runs: 1,
            run_interval_minutes: 5,
            compound_capital: false,
            is_test_mode: true,
            action: TradeAction::Buy,
        }
    }
}

impl BotSettings {
    /// `(base, quote)` symbols of the pair.
    pub fn base_quote(&self) -> Option<(&str, &str)> {
        let (base, quote) = self.pair.split_once('/')?;
        let (base, quote) = (base.trim(), quote.trim());
        if base.is_empty() || quote.is_empty() || quote.contains('/') {
            return None;
        }
        Some((base, quote))
    }

    pub fn validate(&self) -> Result<(), BotError> {
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(BotError::Config(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.base_quote().is_none() {
            return Err(BotError::Config(format!(
                "pair '{}' must look like BASE/QUOTE",
                self.pair
            )));
        }
        for (name, cfg) in [("stop_loss", &self.stop_loss), ("take_profit", &self.take_profit)] {
            if !(cfg.percentage.is_finite() && cfg.percentage >= 0.0) {
                return Err(BotError::Config(format!(
                    "{}.percentage must be >= 0, got {}",
                    name, cfg.percentage
                )));
            }
        }
        if self.max_runs < 1 {
            return Err(BotError::Config("max_runs must be >= 1".to_string()));
        }
        if !(1..=MAX_RUN_INTERVAL_MINUTES).contains(&self.run_interval_minutes) {
            return Err(BotError::Config(format!(
                "run_interval_minutes must be between 1 and {}, got {}",
                MAX_RUN_INTERVAL_MINUTES, self.run_interval_minutes
            )));
        }
        Ok(())
    }

    /// Time between poll ticks.
    pub fn run_interval(&self) -> Duration {
        let minutes = self
            .run_interval_minutes
            .clamp(1, MAX_RUN_INTERVAL_MINUTES);
        Duration::from_secs(minutes.saturating_mul(60))
    }
}

/// Engine knobs fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub slippage_pct: f64,
    /// Recent 15-minute candles fetched for entry and strategy-exit checks.
    pub entry_candle_count: u32,
    pub trade_history_limit: usize,
    pub classifier: ClassifierConfig,
    pub assets: AssetsConfig,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            slippage_pct: DEFAULT_SLIPPAGE_PCT,
            entry_candle_count: DEFAULT_ENTRY_CANDLE_COUNT,
            trade_history_limit: DEFAULT_TRADE_HISTORY_LIMIT,
            classifier: ClassifierConfig::default(),
            assets: AssetsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let s = BotSettings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.base_quote(), Some(("SOL", "USDC")));
        assert!(s.is_test_mode);
    }

    #[test]
    fn rejects_bad_pair_and_ranges() {
        let mut s = BotSettings::default();
        s.pair = "SOLUSDC".to_string();
        assert!(s.validate().is_err());

        let mut s = BotSettings::default();
        s.stop_loss.percentage = -1.0;
        assert!(s.validate().is_err());

        let mut s = BotSettings::default();
        s.max_runs = 0;
        assert!(s.validate().is_err());

        let mut s = BotSettings::default();
        s.run_interval_minutes = 0;
        assert!(s.validate().is_err());

        s.run_interval_minutes = u64::MAX;
        assert!(s.validate().is_err());
    }

    #[test]
    fn run_interval_is_bounded() {
        let mut s = BotSettings::default();
        assert_eq!(s.run_interval(), Duration::from_secs(5 * 60));

        s.run_interval_minutes = u64::MAX;
        assert_eq!(s.run_interval(), Duration::from_secs(24 * 60 * 60));
    }
}

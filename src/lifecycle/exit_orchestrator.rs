use crate::analysis::AnalysisResult;
use crate::model::candle::Candle;
use crate::model::position::Position;
use crate::strategy::StrategyRules;

use super::protection::{
    check_stop_loss, check_take_profit, format_stop_loss_message, format_take_profit_message,
    ProtectionConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    TakeProfit,
    StopLoss,
    StrategyExit,
}

impl ExitTrigger {
    pub fn reason_code(&self) -> &'static str {
        match self {
            ExitTrigger::TakeProfit => "exit.take_profit",
            ExitTrigger::StopLoss => "exit.stop_loss",
            ExitTrigger::StrategyExit => "exit.strategy",
        }
    }

    /// Prefix of trade ids produced by this exit.
    pub fn trade_id_prefix(&self) -> &'static str {
        match self {
            ExitTrigger::TakeProfit => "tp",
            ExitTrigger::StopLoss => "sl",
            ExitTrigger::StrategyExit => "exit",
        }
    }
}

/// One exit decision for one position at one observed price.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitDecision {
    pub trigger: ExitTrigger,
    /// Strategy name recorded on the closing trade.
    pub label: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ExitOrchestrator {
    pub stop_loss: ProtectionConfig,
    pub take_profit: ProtectionConfig,
}

impl ExitOrchestrator {
    pub fn new(stop_loss: ProtectionConfig, take_profit: ProtectionConfig) -> Self {
        Self {
            stop_loss,
            take_profit,
        }
    }

    /// Protective checks only: take-profit first, then stop-loss.
    pub fn protective_exit(&self, position: &Position, price: f64) -> Option<ExitDecision> {
        if check_take_profit(position, price, &self.take_profit) {
            return Some(ExitDecision {
                trigger: ExitTrigger::TakeProfit,
                label: "Take Profit".to_string(),
                message: format_take_profit_message(position, price, &self.take_profit),
            });
        }
        if check_stop_loss(position, price, &self.stop_loss) {
            return Some(ExitDecision {
                trigger: ExitTrigger::StopLoss,
                label: "Stop Loss".to_string(),
                message: format_stop_loss_message(position, price, &self.stop_loss),
            });
        }
        None
    }

    /// Regime-change exit of the configured strategy.
    pub fn strategy_exit(
        &self,
        rules: &StrategyRules,
        position: &Position,
        analysis: &AnalysisResult,
        recent: &[Candle],
    ) -> Option<ExitDecision> {
        if !rules.should_exit(position, analysis, recent) {
            return None;
        }
        let kind = rules.kind();
        Some(ExitDecision {
            trigger: ExitTrigger::StrategyExit,
            label: format!("{} Exit", kind.label()),
            message: format!(
                "{} exit for {}: market condition is {}",
                kind.label(),
                position.pair,
                analysis.condition
            ),
        })
    }
}

//! Stop-loss and take-profit checks against a live price.

use serde::{Deserialize, Serialize};

use crate::model::action::TradeAction;
use crate::model::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProtectionConfig {
    pub enabled: bool,
    /// Move away from entry, in percent, that triggers the exit.
    pub percentage: f64,
}

impl ProtectionConfig {
    pub fn enabled(percentage: f64) -> Self {
        Self {
            enabled: true,
            percentage,
        }
    }
}

pub const DEFAULT_STOP_LOSS: ProtectionConfig = ProtectionConfig {
    enabled: true,
    percentage: 2.5,
};

pub const DEFAULT_TAKE_PROFIT: ProtectionConfig = ProtectionConfig {
    enabled: true,
    percentage: 5.0,
};

fn usable_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn below_entry(position: &Position, pct: f64) -> f64 {
    position.entry_price * (1.0 - pct / 100.0)
}

fn above_entry(position: &Position, pct: f64) -> f64 {
    position.entry_price * (1.0 + pct / 100.0)
}

pub fn stop_loss_price(position: &Position, cfg: &ProtectionConfig) -> f64 {
    match position.action {
        TradeAction::Buy => below_entry(position, cfg.percentage),
        TradeAction::Sell => above_entry(position, cfg.percentage),
    }
}

pub fn take_profit_price(position: &Position, cfg: &ProtectionConfig) -> f64 {
    match position.action {
        TradeAction::Buy => above_entry(position, cfg.percentage),
        TradeAction::Sell => below_entry(position, cfg.percentage),
    }
}

pub fn check_stop_loss(position: &Position, current_price: f64, cfg: &ProtectionConfig) -> bool {
    if !cfg.enabled || !usable_price(current_price) {
        return false;
    }
    let threshold = stop_loss_price(position, cfg);
    match position.action {
        TradeAction::Buy => current_price <= threshold,
        TradeAction::Sell => current_price >= threshold,
    }
}

pub fn check_take_profit(position: &Position, current_price: f64, cfg: &ProtectionConfig) -> bool {
    if !cfg.enabled || !usable_price(current_price) {
        return false;
    }
    let threshold = take_profit_price(position, cfg);
    match position.action {
        TradeAction::Buy => current_price >= threshold,
        TradeAction::Sell => current_price <= threshold,
    }
}

pub fn format_stop_loss_message(
    position: &Position,
    current_price: f64,
    cfg: &ProtectionConfig,
) -> String {
    let direction = match position.action {
        TradeAction::Buy => "dropped",
        TradeAction::Sell => "increased",
    };
    format!(
        "Stop loss triggered for {}: Price {} to {:.4} ({}% from entry {:.4})",
        position.pair, direction, current_price, cfg.percentage, position.entry_price
    )
}

pub fn format_take_profit_message(
    position: &Position,
    current_price: f64,
    cfg: &ProtectionConfig,
) -> String {
    let direction = match position.action {
        TradeAction::Buy => "increased",
        TradeAction::Sell => "dropped",
    };
    format!(
        "Take profit triggered for {}: Price {} to {:.4} ({}% from entry {:.4})",
        position.pair, direction, current_price, cfg.percentage, position.entry_price
    )
}

/// Loss in quote units if the position is closed exactly at its stop.
pub fn potential_loss(position: &Position, cfg: &ProtectionConfig) -> f64 {
    position.pnl_at(stop_loss_price(position, cfg)).abs()
}

/// Profit in quote units if the position is closed exactly at its target.
pub fn potential_profit(position: &Position, cfg: &ProtectionConfig) -> f64 {
    position.pnl_at(take_profit_price(position, cfg))
}

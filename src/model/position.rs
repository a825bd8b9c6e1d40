use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::TradeAction;

/// One open exposure created by a successful entry trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub pair: String,
    pub entry_price: f64,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub action: TradeAction,
}

impl Position {
    pub fn new(pair: &str, entry_price: f64, amount: f64, action: TradeAction) -> Self {
        Self {
            id: format!("pos-{}", &uuid::Uuid::new_v4().to_string()[..8]),
            pair: pair.to_string(),
            entry_price,
            amount,
            timestamp: Utc::now(),
            action,
        }
    }

    /// Direction of the trade that closes this position.
    pub fn closing_action(&self) -> TradeAction {
        self.action.opposite()
    }

    /// PnL in quote units if the whole position were closed at `price`.
    pub fn pnl_at(&self, price: f64) -> f64 {
        match self.action {
            TradeAction::Buy => (price - self.entry_price) * self.amount,
            TradeAction::Sell => (self.entry_price - price) * self.amount,
        }
    }

    /// Gross return multiple of closing at `price` (1.0 = flat).
    pub fn return_multiple(&self, price: f64) -> f64 {
        if self.entry_price <= f64::EPSILON || price <= f64::EPSILON {
            return 1.0;
        }
        match self.action {
            TradeAction::Buy => price / self.entry_price,
            TradeAction::Sell => self.entry_price / price,
        }
    }

    pub fn notional(&self) -> f64 {
        self.entry_price * self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_prefixed() {
        let a = Position::new("SOL/USDC", 100.0, 1.0, TradeAction::Buy);
        let b = Position::new("SOL/USDC", 100.0, 1.0, TradeAction::Buy);
        assert!(a.id.starts_with("pos-"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn pnl_follows_direction() {
        let long = Position::new("SOL/USDC", 100.0, 2.0, TradeAction::Buy);
        assert!((long.pnl_at(110.0) - 20.0).abs() < 1e-9);
        assert!((long.pnl_at(95.0) - (-10.0)).abs() < 1e-9);

        let short = Position::new("SOL/USDC", 100.0, 2.0, TradeAction::Sell);
        assert!((short.pnl_at(90.0) - 20.0).abs() < 1e-9);
        assert_eq!(short.closing_action(), TradeAction::Buy);
    }

    #[test]
    fn return_multiple_for_short_is_inverted() {
        let short = Position::new("SOL/USDC", 100.0, 1.0, TradeAction::Sell);
        assert!((short.return_multiple(80.0) - 1.25).abs() < 1e-9);
        assert!((short.return_multiple(0.0) - 1.0).abs() < f64::EPSILON);
    }
}

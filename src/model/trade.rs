use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::TradeAction;

pub const DEFAULT_TRADE_HISTORY_LIMIT: usize = 50;

/// Append-only record of one dispatched trade, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub pair: String,
    pub action: TradeAction,
    pub amount: f64,
    pub price: f64,
    pub strategy: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Realised PnL in quote units, set on closing trades only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<f64>,
}

impl Trade {
    fn new_id(prefix: &str) -> String {
        format!("{}-{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
    }

    pub fn filled(
        prefix: &str,
        pair: &str,
        action: TradeAction,
        amount: f64,
        price: f64,
        strategy: &str,
        signature: String,
    ) -> Self {
        Self {
            id: Self::new_id(prefix),
            timestamp: Utc::now(),
            pair: pair.to_string(),
            action,
            amount,
            price,
            strategy: strategy.to_string(),
            success: true,
            signature: Some(signature),
            error: None,
            pnl: None,
        }
    }

    pub fn failed(
        prefix: &str,
        pair: &str,
        action: TradeAction,
        amount: f64,
        strategy: &str,
        error: String,
    ) -> Self {
        Self {
            id: Self::new_id(prefix),
            timestamp: Utc::now(),
            pair: pair.to_string(),
            action,
            amount,
            price: 0.0,
            strategy: strategy.to_string(),
            success: false,
            signature: None,
            error: Some(error),
            pnl: None,
        }
    }

    pub fn with_pnl(mut self, pnl: f64) -> Self {
        self.pnl = Some(pnl);
        self
    }
}

/// Bounded history, newest first. The oldest record is dropped on overflow.
#[derive(Debug, Clone)]
pub struct TradeHistory {
    rows: VecDeque<Trade>,
    limit: usize,
}

impl Default for TradeHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_TRADE_HISTORY_LIMIT)
    }
}

impl TradeHistory {
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            rows: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, trade: Trade) {
        self.rows.push_front(trade);
        while self.rows.len() > self.limit {
            let _ = self.rows.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&Trade> {
        self.rows.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trade> {
        self.rows.iter()
    }

    pub fn to_vec(&self) -> Vec<Trade> {
        self.rows.iter().cloned().collect()
    }
}

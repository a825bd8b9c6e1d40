use std::collections::HashMap;

use crate::lifecycle::PositionBook;
use crate::model::trade::TradeHistory;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExitStats {
    pub wins: u32,
    pub losses: u32,
    pub realized_pnl: f64,
}

impl ExitStats {
    pub fn total(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.wins as f64 / total as f64) * 100.0
        }
    }

    fn record(&mut self, pnl: f64) {
        if pnl > 0.0 {
            self.wins = self.wins.saturating_add(1);
        } else {
            self.losses = self.losses.saturating_add(1);
        }
        self.realized_pnl += pnl;
    }
}

/// Operator view over the retained history and the open positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceSummary {
    pub overall: ExitStats,
    /// Closing trades grouped by the label they were recorded with.
    pub by_label: HashMap<String, ExitStats>,
    pub successful_trades: u32,
    pub failed_trades: u32,
    pub open_positions: usize,
    /// Entry notional of open positions, in quote units.
    pub open_exposure: f64,
}

impl PerformanceSummary {
    pub fn from_state(history: &TradeHistory, positions: &PositionBook) -> Self {
        let mut summary = Self {
            open_positions: positions.len(),
            open_exposure: positions.open_exposure(),
            ..Self::default()
        };
        for trade in history.iter() {
            if !trade.success {
                summary.failed_trades += 1;
                continue;
            }
            summary.successful_trades += 1;
            // Only closing trades carry realised PnL.
            if let Some(pnl) = trade.pnl {
                summary.overall.record(pnl);
                summary
                    .by_label
                    .entry(trade.strategy.clone())
                    .or_default()
                    .record(pnl);
            }
        }
        summary
    }
}

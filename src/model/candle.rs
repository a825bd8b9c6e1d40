use std::fmt;

use serde::{Deserialize, Serialize};

/// One OHLCV bucket. `timestamp` is the bucket open in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Closing prices of an ascending candle series.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Candle resolution as understood by the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Hour,
    Minute,
}

impl Timeframe {
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            Timeframe::Day => "day",
            Timeframe::Hour => "hour",
            Timeframe::Minute => "minute",
        }
    }

    /// Aggregates the provider accepts for this timeframe.
    pub fn supported_aggregates(&self) -> &'static [u32] {
        match self {
            Timeframe::Day => &[1],
            Timeframe::Hour => &[1, 4, 12],
            Timeframe::Minute => &[1, 5, 15],
        }
    }

    pub fn supports_aggregate(&self, aggregate: u32) -> bool {
        self.supported_aggregates().contains(&aggregate)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

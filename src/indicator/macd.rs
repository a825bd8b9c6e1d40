use serde::{Deserialize, Serialize};

use super::ema::Ema;

/// Latest MACD point. The signal line (and so the histogram) needs
/// `signal_period` MACD values before it exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd_line: f64,
    pub signal_line: Option<f64>,
    pub histogram: Option<f64>,
}

impl MacdValue {
    /// `true` only when the signal exists and the MACD line is strictly above it.
    pub fn is_bullish(&self) -> bool {
        self.signal_line
            .map(|signal| self.macd_line > signal)
            .unwrap_or(false)
    }
}

/// MACD with EMA oscillator and EMA signal line.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    latest: Option<MacdValue>,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        assert!(
            fast_period < slow_period,
            "MACD fast period must be shorter than slow period"
        );
        Self {
            fast: Ema::new(fast_period),
            slow: Ema::new(slow_period),
            signal: Ema::new(signal_period),
            latest: None,
        }
    }

    pub fn push(&mut self, close: f64) -> Option<MacdValue> {
        let fast = self.fast.push(close);
        let slow = self.slow.push(close);
        let (Some(fast), Some(slow)) = (fast, slow) else {
            return None;
        };

        let macd_line = fast - slow;
        let signal_line = self.signal.push(macd_line);
        self.latest = Some(MacdValue {
            macd_line,
            signal_line,
            histogram: signal_line.map(|s| macd_line - s),
        });
        self.latest
    }

    pub fn value(&self) -> Option<MacdValue> {
        self.latest
    }
}

use serde::{Deserialize, Serialize};

use super::sma::Sma;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerValue {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

impl BollingerValue {
    /// `(upper - lower) / middle`, or `None` for a zero middle band.
    pub fn width_ratio(&self) -> Option<f64> {
        if self.middle.abs() <= f64::EPSILON {
            return None;
        }
        Some((self.upper - self.lower) / self.middle)
    }
}

/// SMA middle band with `std_mult` population standard deviations either side.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    window: Sma,
    std_mult: f64,
}

impl BollingerBands {
    pub fn new(period: usize, std_mult: f64) -> Self {
        Self {
            window: Sma::new(period),
            std_mult,
        }
    }

    pub fn push(&mut self, close: f64) -> Option<BollingerValue> {
        self.window.push(close);
        self.value()
    }

    pub fn value(&self) -> Option<BollingerValue> {
        let middle = self.window.value()?;
        let spread = self.window.std_dev()? * self.std_mult;
        Some(BollingerValue {
            middle,
            upper: middle + spread,
            lower: middle - spread,
        })
    }
}

use super::sma::Sma;

/// Exponential Moving Average. The first value is the SMA of the first
/// `period` inputs; later values use the `2 / (period + 1)` multiplier.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    multiplier: f64,
    ema: Option<f64>,
    seed: Sma,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "EMA period must be > 0");
        Self {
            period,
            multiplier: 2.0 / (period as f64 + 1.0),
            ema: None,
            seed: Sma::new(period),
        }
    }

    /// Push a new value, return the current EMA if enough data.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.ema = match self.ema {
            Some(prev) => Some((value - prev) * self.multiplier + prev),
            None => self.seed.push(value),
        };
        self.ema
    }

    pub fn value(&self) -> Option<f64> {
        self.ema
    }

    pub fn is_ready(&self) -> bool {
        self.ema.is_some()
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Latest EMA over `values`, or `None` when the series is shorter than `period`.
pub fn latest_ema(values: &[f64], period: usize) -> Option<f64> {
    let mut ema = Ema::new(period);
    values.iter().fold(None, |_, v| ema.push(*v))
}

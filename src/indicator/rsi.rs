/// Relative Strength Index with Wilder smoothing.
///
/// The average gain/loss is seeded from the price changes inside the first
/// `period` closes, so a value exists as soon as `period` closes were pushed.
/// Every later change is folded in with weight `1 / period`.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev_close: Option<f64>,
    pushed: usize,
    gain_sum: f64,
    loss_sum: f64,
    avg_gain: Option<f64>,
    avg_loss: Option<f64>,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self {
            period,
            prev_close: None,
            pushed: 0,
            gain_sum: 0.0,
            loss_sum: 0.0,
            avg_gain: None,
            avg_loss: None,
        }
    }

    pub fn push(&mut self, close: f64) -> Option<f64> {
        self.pushed += 1;
        let Some(prev) = self.prev_close.replace(close) else {
            return None;
        };

        let delta = close - prev;
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        match (self.avg_gain, self.avg_loss) {
            (Some(avg_gain), Some(avg_loss)) => {
                let period = self.period as f64;
                self.avg_gain = Some((avg_gain * (period - 1.0) + gain) / period);
                self.avg_loss = Some((avg_loss * (period - 1.0) + loss) / period);
            }
            _ => {
                self.gain_sum += gain;
                self.loss_sum += loss;
                if self.pushed >= self.period {
                    let changes = (self.period - 1) as f64;
                    self.avg_gain = Some(self.gain_sum / changes);
                    self.avg_loss = Some(self.loss_sum / changes);
                }
            }
        }
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        let avg_gain = self.avg_gain?;
        let avg_loss = self.avg_loss?;
        if avg_gain + avg_loss <= f64::EPSILON {
            return Some(50.0);
        }
        if avg_loss <= f64::EPSILON {
            return Some(100.0);
        }
        let rs = avg_gain / avg_loss;
        Some(100.0 - (100.0 / (1.0 + rs)))
    }
}

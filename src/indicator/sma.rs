/// Simple Moving Average over a ring buffer. Also exposes the window's
/// population standard deviation, which Bollinger Bands build on.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: Vec<f64>,
    head: usize,
    filled: usize,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be > 0");
        Self {
            period,
            window: vec![0.0; period],
            head: 0,
            filled: 0,
            sum: 0.0,
        }
    }

    /// Push a new value, return the current SMA once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.filled == self.period {
            self.sum -= self.window[self.head];
        } else {
            self.filled += 1;
        }
        self.window[self.head] = value;
        self.sum += value;
        self.head = (self.head + 1) % self.period;
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        self.is_ready().then(|| self.sum / self.period as f64)
    }

    /// Population standard deviation of the current window.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.value()?;
        let variance = self
            .window
            .iter()
            .map(|v| {
                let d = *v - mean;
                d * d
            })
            .sum::<f64>()
            / self.period as f64;
        Some(variance.sqrt())
    }

    pub fn is_ready(&self) -> bool {
        self.filled == self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

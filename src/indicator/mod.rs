//! Indicator engine. Every indicator consumes closing prices in ascending
//! time order and only the latest value is kept.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

use serde::{Deserialize, Serialize};

use crate::model::candle::Candle;

pub use bollinger::{BollingerBands, BollingerValue};
pub use macd::{Macd, MacdValue};

pub const EMA_SHORT_PERIOD: usize = 12;
pub const EMA_LONG_PERIOD: usize = 26;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST_PERIOD: usize = 12;
pub const MACD_SLOW_PERIOD: usize = 26;
pub const MACD_SIGNAL_PERIOD: usize = 9;
pub const BBANDS_PERIOD: usize = 20;
pub const BBANDS_STD_MULT: f64 = 2.0;

/// Latest indicator values of one candle series. A field is `None` when the
/// series is shorter than that indicator's minimum period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema_short: Option<f64>,
    pub ema_long: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
    pub bollinger: Option<BollingerValue>,
}

/// Run every indicator over the closes of `candles` in one pass.
pub fn compute_indicators(candles: &[Candle]) -> IndicatorSnapshot {
    let mut ema_short = ema::Ema::new(EMA_SHORT_PERIOD);
    let mut ema_long = ema::Ema::new(EMA_LONG_PERIOD);
    let mut rsi = rsi::Rsi::new(RSI_PERIOD);
    let mut macd = Macd::new(MACD_FAST_PERIOD, MACD_SLOW_PERIOD, MACD_SIGNAL_PERIOD);
    let mut bollinger = BollingerBands::new(BBANDS_PERIOD, BBANDS_STD_MULT);

    for candle in candles {
        let close = candle.close;
        ema_short.push(close);
        ema_long.push(close);
        rsi.push(close);
        macd.push(close);
        bollinger.push(close);
    }

    IndicatorSnapshot {
        ema_short: ema_short.value(),
        ema_long: ema_long.value(),
        rsi: rsi.value(),
        macd: macd.value(),
        bollinger: bollinger.value(),
    }
}

use std::sync::Arc;

use serde::Deserialize;

use crate::indicator::{compute_indicators, IndicatorSnapshot};
use crate::market_data::CandleSource;
use crate::model::candle::{Candle, Timeframe};

use super::{AnalysisIndicators, AnalysisResult, DailyEma, MarketCondition};

/// Hourly Bollinger width below which the market may be ranging.
pub const RANGE_MAX_BAND_WIDTH: f64 = 0.10;
/// Hourly RSI must sit strictly inside this band to count as ranging.
pub const RANGE_RSI_BAND: (f64, f64) = (40.0, 60.0);
/// Hourly RSI must be strictly above this to confirm a daily uptrend.
pub const TREND_CONFIRM_RSI: f64 = 50.0;

/// Fewest daily candles accepted, whatever the configured fetch count.
pub const MIN_DAILY_CANDLES: usize = 14;
pub const MIN_INTRADAY_CANDLES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_daily")]
    pub daily_candle_count: u32,
    #[serde(default = "default_hourly")]
    pub hourly_candle_count: u32,
    #[serde(default = "default_fifteen_minute")]
    pub fifteen_minute_candle_count: u32,
}

fn default_daily() -> u32 {
    14
}

fn default_hourly() -> u32 {
    7 * 24
}

fn default_fifteen_minute() -> u32 {
    24 * 4
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            daily_candle_count: default_daily(),
            hourly_candle_count: default_hourly(),
            fifteen_minute_candle_count: default_fifteen_minute(),
        }
    }
}

/// Fetches the three timeframes of one pool and reduces them to a regime.
pub struct MarketClassifier {
    source: Arc<dyn CandleSource>,
    cfg: ClassifierConfig,
}

impl MarketClassifier {
    pub fn new(source: Arc<dyn CandleSource>, cfg: ClassifierConfig) -> Self {
        Self { source, cfg }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.cfg
    }

    pub async fn classify(&self, pool: &str) -> AnalysisResult {
        let (daily, hourly, fifteen_minute) = tokio::join!(
            self.source
                .fetch_candles(pool, Timeframe::Day, 1, self.cfg.daily_candle_count, None),
            self.source
                .fetch_candles(pool, Timeframe::Hour, 1, self.cfg.hourly_candle_count, None),
            self.source.fetch_candles(
                pool,
                Timeframe::Minute,
                15,
                self.cfg.fifteen_minute_candle_count,
                None
            ),
        );

        tracing::debug!(
            pool,
            daily = daily.as_ref().map(Vec::len),
            hourly = hourly.as_ref().map(Vec::len),
            fifteen_minute = fifteen_minute.as_ref().map(Vec::len),
            "Fetched analysis timeframes"
        );

        let result = classify_series(
            daily.as_deref(),
            hourly.as_deref(),
            fifteen_minute.as_deref(),
        );
        tracing::info!(pool, condition = %result.condition, "Market condition determined");
        result
    }
}

/// Pure reduction of the three series. Missing or short series yield `Unclear`.
pub fn classify_series(
    daily: Option<&[Candle]>,
    hourly: Option<&[Candle]>,
    fifteen_minute: Option<&[Candle]>,
) -> AnalysisResult {
    let (Some(daily), Some(hourly), Some(fifteen_minute)) = (daily, hourly, fifteen_minute) else {
        tracing::warn!("Insufficient data for market analysis: a timeframe fetch failed");
        return AnalysisResult::unclear();
    };
    if daily.len() < MIN_DAILY_CANDLES
        || hourly.len() < MIN_INTRADAY_CANDLES
        || fifteen_minute.len() < MIN_INTRADAY_CANDLES
    {
        tracing::warn!(
            daily = daily.len(),
            hourly = hourly.len(),
            fifteen_minute = fifteen_minute.len(),
            "Insufficient data for market analysis"
        );
        return AnalysisResult::unclear();
    }

    let daily_snapshot = compute_indicators(daily);
    let hourly_snapshot = compute_indicators(hourly);
    let fifteen_minute_snapshot = compute_indicators(fifteen_minute);

    tracing::debug!(?daily_snapshot, ?hourly_snapshot, ?fifteen_minute_snapshot, "Indicators");

    reduce(&daily_snapshot, &hourly_snapshot, &fifteen_minute_snapshot)
}

fn is_hourly_ranging(hourly: &IndicatorSnapshot) -> bool {
    let (Some(bands), Some(rsi)) = (hourly.bollinger, hourly.rsi) else {
        return false;
    };
    let Some(width) = bands.width_ratio() else {
        return false;
    };
    width < RANGE_MAX_BAND_WIDTH && rsi > RANGE_RSI_BAND.0 && rsi < RANGE_RSI_BAND.1
}

/// Daily EMAs set the hypothesis; hourly RSI confirms it, otherwise the
/// hourly bands test for a range. A daily uptrend without hourly
/// confirmation is `Unclear`, never `Ranging`.
pub fn reduce(
    daily: &IndicatorSnapshot,
    hourly: &IndicatorSnapshot,
    fifteen_minute: &IndicatorSnapshot,
) -> AnalysisResult {
    let daily_ema = DailyEma {
        short: daily.ema_short,
        long: daily.ema_long,
    };

    let condition = if daily_ema.is_uptrend() {
        match hourly.rsi {
            Some(rsi) if rsi > TREND_CONFIRM_RSI => MarketCondition::Uptrend,
            _ => MarketCondition::Unclear,
        }
    } else if is_hourly_ranging(hourly) {
        MarketCondition::Ranging
    } else {
        MarketCondition::Unclear
    };

    AnalysisResult {
        condition,
        indicators: Some(AnalysisIndicators {
            daily_ema,
            hourly_rsi: hourly.rsi,
            fifteen_minute_macd: fifteen_minute.macd,
        }),
    }
}

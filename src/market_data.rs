use async_trait::async_trait;

use crate::model::candle::{Candle, Timeframe};

/// Source of OHLCV series. `None` means the fetch or its parsing failed;
/// callers treat it as missing data and never retry inside the same call.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn fetch_candles(
        &self,
        pool: &str,
        timeframe: Timeframe,
        aggregate: u32,
        limit: u32,
        before_timestamp: Option<i64>,
    ) -> Option<Vec<Candle>>;
}

/// Maps a pair symbol such as `SOL/USDC` to the pool address the candle
/// source understands. `None` means "not found", not "error".
#[async_trait]
pub trait PoolResolver: Send + Sync {
    async fn resolve_pool(&self, pair: &str) -> Option<String>;
}

/// Close of the single latest 1-minute candle.
pub async fn fetch_live_price(source: &dyn CandleSource, pool: &str) -> Option<f64> {
    let candles = source
        .fetch_candles(pool, Timeframe::Minute, 1, 1, None)
        .await?;
    let price = candles.last()?.close;
    (price.is_finite() && price > 0.0).then_some(price)
}

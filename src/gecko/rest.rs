use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::time::Instant;

use crate::config::MarketDataConfig;
use crate::error::BotError;
use crate::market_data::{CandleSource, PoolResolver};
use crate::model::candle::{Candle, Timeframe};

use super::rate_budget::RateBudget;
use super::types::{OhlcvResponse, PoolSearchResponse};

const ACCEPT_HEADER: &str = "application/json;version=20230302";

/// GeckoTerminal public API client: OHLCV candles and pool search.
pub struct GeckoTerminalClient {
    http: reqwest::Client,
    base_url: String,
    network: String,
    budget: RateBudget,
    pool_cache_ttl: Duration,
    pool_cache: Mutex<HashMap<String, (String, Instant)>>,
}

impl GeckoTerminalClient {
    pub fn new(cfg: &MarketDataConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            network: cfg.network.clone(),
            budget: RateBudget::new(cfg.requests_per_minute),
            pool_cache_ttl: Duration::from_secs(cfg.pool_cache_ttl_secs),
            pool_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn ohlcv_url(&self, pool: &str, timeframe: Timeframe) -> String {
        format!(
            "{}/networks/{}/pools/{}/ohlcv/{}",
            self.base_url,
            self.network,
            pool,
            timeframe.as_path_segment()
        )
    }

    pub fn search_url(&self) -> String {
        format!("{}/search/pools", self.base_url)
    }

    fn cache_key(&self, pair: &str) -> String {
        format!("{}:{}", self.network, pair)
    }

    fn cached_pool(&self, pair: &str) -> Option<String> {
        let key = self.cache_key(pair);
        let mut cache = self.pool_cache.lock().unwrap_or_else(PoisonError::into_inner);
        match cache.get(&key) {
            Some((addr, at)) if at.elapsed() < self.pool_cache_ttl => Some(addr.clone()),
            Some(_) => {
                cache.remove(&key);
                None
            }
            None => None,
        }
    }

    fn remember_pool(&self, pair: &str, address: &str) {
        let mut cache = self.pool_cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.insert(self.cache_key(pair), (address.to_string(), Instant::now()));
    }

    pub async fn get_ohlcv(
        &self,
        pool: &str,
        timeframe: Timeframe,
        aggregate: u32,
        limit: u32,
        before_timestamp: Option<i64>,
    ) -> Result<Vec<Candle>> {
        let mut query = vec![
            ("aggregate", aggregate.to_string()),
            ("limit", limit.to_string()),
            ("currency", "usd".to_string()),
        ];
        if let Some(ts) = before_timestamp {
            query.push(("before_timestamp", ts.to_string()));
        }

        self.budget.acquire().await;
        let resp = self
            .http
            .get(self.ohlcv_url(pool, timeframe))
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .query(&query)
            .send()
            .await
            .map_err(BotError::from)
            .context("ohlcv request failed")?
            .error_for_status()
            .map_err(BotError::from)
            .context("ohlcv returned error status")?;
        let body: OhlcvResponse = read_json(resp)
            .await
            .context("failed to parse ohlcv response")?;
        Ok(body.into_candles())
    }

    pub async fn search_pool(&self, pair: &str) -> Result<Option<String>> {
        self.budget.acquire().await;
        let resp = self
            .http
            .get(self.search_url())
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .query(&[
                ("query", pair),
                ("network", self.network.as_str()),
                ("page", "1"),
            ])
            .send()
            .await
            .map_err(BotError::from)
            .context("pool search failed")?
            .error_for_status()
            .map_err(BotError::from)
            .context("pool search returned error status")?;
        let body: PoolSearchResponse = read_json(resp)
            .await
            .context("failed to parse pool search response")?;
        Ok(body.first_pool_address().map(str::to_string))
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, BotError> {
    let body = resp.text().await?;
    parse_body(&body)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, BotError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl CandleSource for GeckoTerminalClient {
    async fn fetch_candles(
        &self,
        pool: &str,
        timeframe: Timeframe,
        aggregate: u32,
        limit: u32,
        before_timestamp: Option<i64>,
    ) -> Option<Vec<Candle>> {
        if !timeframe.supports_aggregate(aggregate) {
            tracing::error!(%timeframe, aggregate, "Invalid aggregate for timeframe");
            return None;
        }
        match self
            .get_ohlcv(pool, timeframe, aggregate, limit, before_timestamp)
            .await
        {
            Ok(candles) => Some(candles),
            Err(e) => {
                tracing::warn!(pool, %timeframe, error = %format!("{:#}", e), "Failed to fetch candles");
                None
            }
        }
    }
}

#[async_trait]
impl PoolResolver for GeckoTerminalClient {
    async fn resolve_pool(&self, pair: &str) -> Option<String> {
        if let Some(addr) = self.cached_pool(pair) {
            tracing::debug!(pair, pool = %addr, "Pool address cache hit");
            return Some(addr);
        }
        match self.search_pool(pair).await {
            Ok(Some(addr)) => {
                tracing::info!(pair, pool = %addr, "Found pool address");
                self.remember_pool(pair, &addr);
                Some(addr)
            }
            Ok(None) => {
                tracing::warn!(pair, "Pool address not found");
                None
            }
            Err(e) => {
                tracing::warn!(pair, error = %format!("{:#}", e), "Pool search failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(ttl_secs: u64) -> GeckoTerminalClient {
        GeckoTerminalClient::new(&MarketDataConfig {
            base_url: "https://api.geckoterminal.com/api/v2/".to_string(),
            network: "solana".to_string(),
            requests_per_minute: 30,
            pool_cache_ttl_secs: ttl_secs,
        })
    }

    #[test]
    fn builds_endpoint_urls() {
        let c = client(3600);
        assert_eq!(
            c.ohlcv_url("abc", Timeframe::Hour),
            "https://api.geckoterminal.com/api/v2/networks/solana/pools/abc/ohlcv/hour"
        );
        assert_eq!(c.search_url(), "https://api.geckoterminal.com/api/v2/search/pools");
    }

    #[tokio::test]
    async fn invalid_aggregate_returns_none_without_request() {
        let c = client(3600);
        assert!(c
            .fetch_candles("abc", Timeframe::Day, 4, 10, None)
            .await
            .is_none());
        assert_eq!(c.budget.snapshot().await.used, 0);
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let err = parse_body::<OhlcvResponse>("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, BotError::Json(_)));

        let ok: PoolSearchResponse = parse_body(r#"{"data":[]}"#).unwrap();
        assert_eq!(ok.first_pool_address(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn pool_cache_expires_after_ttl() {
        let c = client(3600);
        c.remember_pool("SOL/USDC", "pool-1");
        assert_eq!(c.cached_pool("SOL/USDC").as_deref(), Some("pool-1"));
        tokio::time::advance(Duration::from_secs(3601)).await;
        assert_eq!(c.cached_pool("SOL/USDC"), None);
    }
}

use serde::Deserialize;

use crate::model::candle::Candle;

#[derive(Debug, Deserialize)]
pub struct OhlcvResponse {
    pub data: OhlcvData,
}

#[derive(Debug, Deserialize)]
pub struct OhlcvData {
    pub attributes: OhlcvAttributes,
}

#[derive(Debug, Deserialize)]
pub struct OhlcvAttributes {
    /// `[timestamp, open, high, low, close, volume]`, newest first.
    pub ohlcv_list: Vec<Vec<f64>>,
}

impl OhlcvResponse {
    /// Candles in ascending time order. Short rows are skipped.
    pub fn into_candles(self) -> Vec<Candle> {
        let mut candles: Vec<Candle> = self
            .data
            .attributes
            .ohlcv_list
            .into_iter()
            .filter(|row| row.len() >= 6)
            .map(|row| Candle {
                timestamp: row[0] as i64,
                open: row[1],
                high: row[2],
                low: row[3],
                close: row[4],
                volume: row[5],
            })
            .collect();
        candles.sort_by_key(|c| c.timestamp);
        candles
    }
}

#[derive(Debug, Deserialize)]
pub struct PoolSearchResponse {
    #[serde(default)]
    pub data: Vec<PoolSearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct PoolSearchItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<PoolAttributes>,
}

#[derive(Debug, Deserialize)]
pub struct PoolAttributes {
    #[serde(default)]
    pub name: Option<String>,
    pub address: Option<String>,
}

impl PoolSearchResponse {
    /// Address of the first result that is a pool.
    pub fn first_pool_address(&self) -> Option<&str> {
        self.data
            .iter()
            .find(|item| item.kind == "pool")
            .and_then(|item| item.attributes.as_ref())
            .and_then(|attrs| attrs.address.as_deref())
            .filter(|addr| !addr.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ohlcv_is_reversed_to_ascending() {
        let body = r#"{"data":{"id":"x","type":"ohlcv_request_response","attributes":{"ohlcv_list":[
            [1700000900, 10.0, 11.0, 9.5, 10.5, 1000.0],
            [1700000000, 9.0, 10.2, 8.8, 10.0, 800.0],
            [1700000450, 1.0]
        ]}}}"#;
        let resp: OhlcvResponse = serde_json::from_str(body).unwrap();
        let candles = resp.into_candles();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 1_700_000_000);
        assert!((candles[1].close - 10.5).abs() < f64::EPSILON);
    }

    #[test]
    fn search_skips_non_pool_items() {
        let body = r#"{"data":[
            {"id":"t","type":"token","attributes":{"address":"tok"}},
            {"id":"p","type":"pool","attributes":{"name":"SOL / USDC","address":"pool-addr"}}
        ]}"#;
        let resp: PoolSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.first_pool_address(), Some("pool-addr"));

        let empty: PoolSearchResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert_eq!(empty.first_pool_address(), None);
    }
}

//! Binance REST klines client.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::models::indicators::Candle;
use crate::models::Timeframe;
use crate::services::market_data::PriceHistoryProvider;

/// Binance caps one klines page at 1000 rows.
const MAX_LIMIT: usize = 1000;

pub struct BinanceKlinesClient {
    base_url: String,
    client: reqwest::Client,
}

impl BinanceKlinesClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Decodes one kline row: `[openTime, open, high, low, close, volume, ...]`.
pub fn parse_kline(row: &Value) -> Option<Candle> {
    let fields = row.as_array()?;
    if fields.len() < 6 {
        return None;
    }
    let open_time_ms = fields[0].as_i64()?;
    let open_time: DateTime<Utc> = Utc.timestamp_millis_opt(open_time_ms).single()?;
    Some(Candle::new(
        parse_number(&fields[1])?,
        parse_number(&fields[2])?,
        parse_number(&fields[3])?,
        parse_number(&fields[4])?,
        parse_number(&fields[5])?,
        open_time,
    ))
}

#[async_trait]
impl PriceHistoryProvider for BinanceKlinesClient {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.clamp(1, MAX_LIMIT).to_string();
        let symbol = symbol.to_uppercase();

        debug!(symbol = %symbol, timeframe = %timeframe, limit = %limit, "Binance: requesting klines");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", timeframe.binance_interval()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        let Some(rows) = payload.as_array() else {
            warn!(symbol = %symbol, timeframe = %timeframe, "Binance: klines payload is not an array");
            return Ok(Vec::new());
        };

        let mut candles: Vec<Candle> = rows.iter().filter_map(parse_kline).collect();
        if candles.len() != rows.len() {
            warn!(
                symbol = %symbol,
                skipped = rows.len() - candles.len(),
                "Binance: skipped malformed kline rows"
            );
        }
        candles.sort_by_key(|c| c.open_time);

        debug!(symbol = %symbol, timeframe = %timeframe, count = candles.len(), "Binance: received klines");
        Ok(candles)
    }
}

//! TradingView scanner client for pre-aggregated technical ratings.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ProviderError;
use crate::models::indicators::{
    MovingAverageSummary, Recommendation, SummaryIndicatorValues, TechnicalSummary,
};
use crate::models::Timeframe;
use crate::services::market_data::TechnicalSummaryProvider;

const RECOMMEND_ALL: usize = 0;
const RECOMMEND_MA: usize = 1;
const RSI: usize = 2;
const MACD: usize = 3;
const STOCH_RSI_K: usize = 4;
const CLOSE: usize = 5;
const FIRST_MOVING_AVERAGE: usize = 6;

const COLUMNS: [&str; 20] = [
    "Recommend.All",
    "Recommend.MA",
    "RSI",
    "MACD.macd",
    "Stoch.RSI.K",
    "close",
    "EMA10",
    "SMA10",
    "EMA20",
    "SMA20",
    "EMA30",
    "SMA30",
    "EMA50",
    "SMA50",
    "EMA100",
    "SMA100",
    "EMA200",
    "SMA200",
    "VWMA",
    "HullMA9",
];

#[derive(Debug, Deserialize)]
struct ScanResponse {
    #[serde(default)]
    data: Vec<ScanRow>,
}

#[derive(Debug, Deserialize)]
struct ScanRow {
    #[serde(default)]
    d: Vec<Value>,
}

pub struct TradingViewScanner {
    scan_url: String,
    exchange: String,
    client: reqwest::Client,
}

impl TradingViewScanner {
    pub fn new(scan_url: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self::with_client(scan_url, exchange, reqwest::Client::new())
    }

    pub fn with_client(
        scan_url: impl Into<String>,
        exchange: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            scan_url: scan_url.into(),
            exchange: exchange.into().to_uppercase(),
            client,
        }
    }

    fn ticker(&self, symbol: &str) -> String {
        format!("{}:{}", self.exchange, symbol.to_uppercase())
    }
}

/// Column names with the timeframe suffix applied.
pub fn scan_columns(timeframe: Timeframe) -> Vec<String> {
    COLUMNS
        .iter()
        .map(|c| format!("{}{}", c, timeframe.tradingview_suffix()))
        .collect()
}

/// Builds a summary from one scanner row laid out as [`scan_columns`].
pub fn summary_from_row(values: &[Value]) -> Result<TechnicalSummary, ProviderError> {
    let number = |idx: usize| values.get(idx).and_then(Value::as_f64).filter(|v| v.is_finite());

    let overall = number(RECOMMEND_ALL)
        .ok_or_else(|| ProviderError::Decode("missing Recommend.All".to_string()))?;

    let (mut buy, mut sell, mut neutral) = (0u32, 0u32, 0u32);
    if let Some(close) = number(CLOSE) {
        for idx in FIRST_MOVING_AVERAGE..COLUMNS.len() {
            match number(idx) {
                Some(ma) if ma < close => buy += 1,
                Some(ma) if ma > close => sell += 1,
                Some(_) => neutral += 1,
                None => {}
            }
        }
    }

    let ma_recommendation = match number(RECOMMEND_MA) {
        Some(score) => Recommendation::from_score(score),
        None => {
            let total = buy + sell + neutral;
            if total == 0 {
                Recommendation::Neutral
            } else {
                Recommendation::from_score((buy as f64 - sell as f64) / total as f64)
            }
        }
    };

    Ok(TechnicalSummary {
        recommendation: Recommendation::from_score(overall),
        indicator_values: SummaryIndicatorValues {
            rsi: number(RSI),
            macd: number(MACD),
            stoch_rsi_k: number(STOCH_RSI_K),
        },
        moving_averages: MovingAverageSummary {
            recommendation: ma_recommendation,
            buy_count: buy,
            sell_count: sell,
            neutral_count: neutral,
        },
    })
}

#[async_trait]
impl TechnicalSummaryProvider for TradingViewScanner {
    async fn get_summary(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<TechnicalSummary, ProviderError> {
        let ticker = self.ticker(symbol);
        let body = json!({
            "symbols": { "tickers": [ticker], "query": { "types": [] } },
            "columns": scan_columns(timeframe),
        });

        debug!(ticker = %ticker, timeframe = %timeframe, "TradingView: requesting technical summary");

        let response = self.client.post(&self.scan_url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let scan: ScanResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        let row = scan
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound(ticker.clone()))?;

        summary_from_row(&row.d)
    }
}

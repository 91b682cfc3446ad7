//! Upstream data provider interfaces.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::indicators::{Candle, TechnicalSummary};
use crate::models::Timeframe;

/// Source of historical candles.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Candles ascending by open time; empty when the source has nothing.
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ProviderError>;
}

/// Source of pre-aggregated technical ratings and oscillator values.
#[async_trait]
pub trait TechnicalSummaryProvider: Send + Sync {
    async fn get_summary(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<TechnicalSummary, ProviderError>;
}

/// Price history source that never has data.
pub struct EmptyPriceHistory;

#[async_trait]
impl PriceHistoryProvider for EmptyPriceHistory {
    async fn get_candles(
        &self,
        _symbol: &str,
        _timeframe: Timeframe,
        _limit: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        Ok(Vec::new())
    }
}

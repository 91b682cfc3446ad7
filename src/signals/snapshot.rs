//! Builds one [`IndicatorSnapshot`] from the two upstream data sources.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ForecastError;
use crate::indicators::structure::{calculate_support_resistance, calculate_support_resistance_default};
use crate::indicators::trend::ema_stack;
use crate::indicators::volume::{volume_readings, AVERAGE_VOLUME_PERIOD};
use crate::indicators::{IndicatorCapabilities, Overlays};
use crate::models::indicators::{Candle, IndicatorSnapshot, TechnicalSummary};
use crate::models::Timeframe;
use crate::services::market_data::{PriceHistoryProvider, TechnicalSummaryProvider};

pub const DEFAULT_CANDLE_LIMIT: usize = 300;

#[derive(Clone)]
pub struct SnapshotBuilder {
    prices: Arc<dyn PriceHistoryProvider>,
    summaries: Arc<dyn TechnicalSummaryProvider>,
    capabilities: IndicatorCapabilities,
    candle_limit: usize,
}

impl SnapshotBuilder {
    pub fn new(
        prices: Arc<dyn PriceHistoryProvider>,
        summaries: Arc<dyn TechnicalSummaryProvider>,
        capabilities: IndicatorCapabilities,
        candle_limit: usize,
    ) -> Self {
        Self {
            prices,
            summaries,
            capabilities,
            candle_limit,
        }
    }

    pub fn capabilities(&self) -> IndicatorCapabilities {
        self.capabilities
    }

    /// Fetches both sources concurrently and assembles the snapshot.
    ///
    /// Only a technical-summary failure is fatal. Missing price history leaves
    /// the candle-derived fields as markers.
    pub async fn build(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<IndicatorSnapshot, ForecastError> {
        let (summary, candles) = tokio::join!(
            self.summaries.get_summary(symbol, timeframe),
            self.prices.get_candles(symbol, timeframe, self.candle_limit),
        );

        let summary = summary.map_err(|e| {
            warn!(symbol, timeframe = %timeframe, error = %e, "SnapshotBuilder: technical summary unavailable");
            ForecastError::data_unavailable(symbol, timeframe, e)
        })?;

        let candles = candles.unwrap_or_else(|e| {
            warn!(
                symbol,
                timeframe = %timeframe,
                error = %e,
                "SnapshotBuilder: price history unavailable, continuing without candles"
            );
            Vec::new()
        });

        let snapshot = assemble(symbol, timeframe, &summary, &candles, self.capabilities);
        debug!(
            symbol,
            timeframe = %timeframe,
            candles = candles.len(),
            trend = ?snapshot.trend,
            "SnapshotBuilder: snapshot ready"
        );
        Ok(snapshot)
    }
}

/// Pure assembly step shared by [`SnapshotBuilder::build`] and tests.
pub fn assemble(
    symbol: &str,
    timeframe: Timeframe,
    summary: &TechnicalSummary,
    candles: &[Candle],
    capabilities: IndicatorCapabilities,
) -> IndicatorSnapshot {
    let mut snapshot = IndicatorSnapshot::from_summary(symbol, timeframe, summary);

    let [ema50, ema100, ema200] = ema_stack(candles);
    snapshot.ema50 = ema50;
    snapshot.ema100 = ema100;
    snapshot.ema200 = ema200;

    let (volume, avg_volume20) = volume_readings(candles, AVERAGE_VOLUME_PERIOD);
    snapshot.volume = volume;
    snapshot.avg_volume20 = avg_volume20;

    if capabilities.overlays {
        let overlays = Overlays::compute(candles);
        snapshot.atr = overlays.atr;
        snapshot.supertrend_vote = overlays.supertrend_vote;
        snapshot.parabolic_sar_vote = overlays.parabolic_sar_vote;
    }

    snapshot.last_price = candles.last().map(|c| c.close).filter(|p| p.is_finite());
    // The decision anchors on the whole fetched window.
    if let Some(levels) = calculate_support_resistance(candles, candles.len()) {
        snapshot.support = Some(levels.support);
        snapshot.resistance = Some(levels.resistance);
    }
    if let Some(levels) = calculate_support_resistance_default(candles) {
        snapshot.recent_support = Some(levels.support);
        snapshot.recent_resistance = Some(levels.resistance);
    }

    snapshot
}

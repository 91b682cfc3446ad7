//! Wires the upstream clients, the broker and the orchestrator together

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::broker::NarrationBroker;
use crate::core::orchestrator::ForecastOrchestrator;
use crate::metrics::Metrics;
use crate::services::binance::BinanceKlinesClient;
use crate::services::market_data::{PriceHistoryProvider, TechnicalSummaryProvider};
use crate::services::narration::{ChatCompletionClient, NarrationService};
use crate::services::tradingview::TradingViewScanner;
use crate::signals::snapshot::SnapshotBuilder;

/// Collaborators the runtime is built from; tests swap in fakes.
#[derive(Clone)]
pub struct RuntimeServices {
    pub prices: Arc<dyn PriceHistoryProvider>,
    pub summaries: Arc<dyn TechnicalSummaryProvider>,
    pub narration: Arc<dyn NarrationService>,
}

impl RuntimeServices {
    /// Real HTTP clients configured from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            prices: Arc::new(BinanceKlinesClient::new(
                config.upstream.binance_base_url.clone(),
            )),
            summaries: Arc::new(TradingViewScanner::new(
                config.upstream.tradingview_scanner_url.clone(),
                config.upstream.tradingview_exchange.clone(),
            )),
            narration: Arc::new(ChatCompletionClient::new(
                config.narration.base_url.clone(),
                config.narration.api_key.clone(),
                config.narration.model.clone(),
            )),
        }
    }
}

/// Everything a binary needs to serve forecasts.
pub struct ForecastRuntime {
    pub config: AppConfig,
    pub metrics: Arc<Metrics>,
    pub broker: Arc<NarrationBroker>,
    pub orchestrator: Arc<ForecastOrchestrator>,
}

impl ForecastRuntime {
    pub fn new(
        config: AppConfig,
        services: RuntimeServices,
        metrics: Arc<Metrics>,
    ) -> Self {
        let broker = Arc::new(NarrationBroker::new(
            services.narration,
            config.broker,
            Some(metrics.clone()),
        ));
        let snapshots = SnapshotBuilder::new(
            services.prices,
            services.summaries,
            config.capabilities,
            config.upstream.candle_limit,
        );
        let orchestrator = ForecastOrchestrator::new(
            snapshots,
            broker.clone(),
            config.horizons,
            config.retry,
        )
        .with_narration_timeout(config.narration.timeout)
        .with_metrics(metrics.clone());

        Self {
            config,
            metrics,
            broker,
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn from_config(config: AppConfig) -> Result<Self, prometheus::Error> {
        let services = RuntimeServices::from_config(&config);
        let metrics = Arc::new(Metrics::new()?);
        Ok(Self::new(config, services, metrics))
    }

    pub async fn start(&self) {
        if self.config.narration.api_key.is_none() {
            warn!("ForecastRuntime: no narration API key configured, narration calls will be rejected");
        }
        self.broker.start().await;
        info!(
            overlays = self.config.capabilities.overlays,
            candle_limit = self.config.upstream.candle_limit,
            max_attempts = self.config.retry.max_attempts,
            "ForecastRuntime: started"
        );
    }

    /// Lets queued narrations finish, then stops the broker worker.
    pub async fn shutdown(&self) {
        self.broker.stop().await;
        info!("ForecastRuntime: stopped");
    }
}

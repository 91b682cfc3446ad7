//! Multi-timeframe forecast orchestration.
//!
//! Runs the snapshot/decision pipeline per timeframe, routes every narration
//! through the shared [`NarrationBroker`] and merges the per-timeframe
//! directions into one overall call.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::core::broker::{BrokerHandle, NarrationBroker, RetryPolicy};
use crate::error::ForecastError;
use crate::metrics::Metrics;
use crate::models::{
    CombinedRecommendation, DecisionResult, Horizons, MergeRule, Narration, OverallDirection,
    SignalDirection, Timeframe, TimeframeAnalysis, TimeframeForecast, TimeframeReport,
    RISK_DISCLAIMER,
};
use crate::services::narration::NarrationRequest;
use crate::signals::decision::decide_snapshot;
use crate::signals::snapshot::SnapshotBuilder;

pub struct ForecastOrchestrator {
    snapshots: SnapshotBuilder,
    broker: Arc<NarrationBroker>,
    horizons: Horizons,
    retry: RetryPolicy,
    narration_timeout: Option<Duration>,
    metrics: Option<Arc<Metrics>>,
}

impl ForecastOrchestrator {
    pub fn new(
        snapshots: SnapshotBuilder,
        broker: Arc<NarrationBroker>,
        horizons: Horizons,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            snapshots,
            broker,
            horizons,
            retry,
            narration_timeout: None,
            metrics: None,
        }
    }

    /// Deadline applied to every narration handle; the queued request is
    /// not retracted when it expires.
    pub fn with_narration_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.narration_timeout = timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn horizons(&self) -> Horizons {
        self.horizons
    }

    pub fn broker(&self) -> &Arc<NarrationBroker> {
        &self.broker
    }

    /// Snapshot plus decision for one timeframe, no narration.
    pub async fn analyze_timeframe(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<TimeframeAnalysis, ForecastError> {
        let snapshot = self.snapshots.build(symbol, timeframe).await?;
        let decision = decide_snapshot(&snapshot);
        debug!(
            symbol,
            timeframe = %timeframe,
            signal = ?decision.signal,
            direction = %decision.direction,
            confidence = decision.confidence,
            "Orchestrator: timeframe analysed"
        );
        Ok(TimeframeAnalysis { snapshot, decision })
    }

    /// Analysis plus a detailed explanation. Narration failures propagate.
    pub async fn forecast_timeframe(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<TimeframeForecast, ForecastError> {
        let analysis = self.analyze_timeframe(symbol, timeframe).await?;
        let handle = self
            .broker
            .narrate(NarrationRequest::explanation(analysis.clone()), self.retry)
            .await?;
        let text = self
            .await_narration(handle, self.narration_deadline())
            .await?;

        Ok(TimeframeForecast {
            analysis,
            narration: Narration::Generated { text },
            disclaimer: RISK_DISCLAIMER.to_string(),
        })
    }

    /// Short, medium and long horizon analyses merged into one recommendation.
    ///
    /// A timeframe whose data is unavailable is reported as such without
    /// failing the request. An unavailable broker is fatal.
    pub async fn combined_recommendation(
        &self,
        symbol: &str,
    ) -> Result<CombinedRecommendation, ForecastError> {
        if let Some(m) = &self.metrics {
            m.forecast_requests_total.inc();
        }

        let timeframes = self.horizons.as_array();
        let results = join_all(
            timeframes
                .iter()
                .map(|tf| self.analyze_timeframe(symbol, *tf)),
        )
        .await;

        let mut available: Vec<TimeframeAnalysis> = Vec::new();
        let mut slots: Vec<Result<(), (Timeframe, String)>> = Vec::new();
        for (timeframe, result) in timeframes.iter().zip(results) {
            match result {
                Ok(analysis) => {
                    slots.push(Ok(()));
                    available.push(analysis);
                }
                Err(e) => {
                    warn!(symbol, timeframe = %timeframe, error = %e, "Orchestrator: timeframe unavailable");
                    if let Some(m) = &self.metrics {
                        m.timeframe_failures_total
                            .with_label_values(&[timeframe.as_str()])
                            .inc();
                    }
                    slots.push(Err((*timeframe, e.to_string())));
                }
            }
        }

        // Everything is queued before anything is awaited so the broker sees
        // the whole batch in order. One deadline covers the whole batch.
        let deadline = self.narration_deadline();
        let mut comment_handles = Vec::with_capacity(available.len());
        for analysis in &available {
            let handle = self
                .broker
                .narrate(NarrationRequest::short_comment(analysis.clone()), self.retry)
                .await?;
            comment_handles.push(handle);
        }
        let combined_handle = if available.is_empty() {
            None
        } else {
            Some(
                self.broker
                    .narrate(NarrationRequest::combined(symbol, available.clone()), self.retry)
                    .await?,
            )
        };

        let mut comments = Vec::with_capacity(comment_handles.len());
        for handle in comment_handles {
            comments.push(self.narration_outcome(handle, deadline).await?);
        }
        let combined_narration = match combined_handle {
            Some(handle) => Some(self.narration_outcome(handle, deadline).await?),
            None => None,
        };

        let decisions: Vec<DecisionResult> =
            available.iter().map(|a| a.decision.clone()).collect();
        let overall = merge_directions(&decisions);

        let mut analyses = available.into_iter();
        let mut comments = comments.into_iter();
        let reports = slots
            .into_iter()
            .filter_map(|slot| match slot {
                Ok(()) => {
                    let analysis = analyses.next()?;
                    let narration = comments.next()?;
                    Some(TimeframeReport::Available {
                        timeframe: analysis.timeframe(),
                        analysis,
                        narration,
                    })
                }
                Err((timeframe, reason)) => Some(TimeframeReport::Unavailable { timeframe, reason }),
            })
            .collect();

        if let Some(o) = &overall {
            info!(
                symbol,
                direction = %o.direction,
                confidence = o.confidence,
                rule = ?o.rule,
                "Orchestrator: combined recommendation ready"
            );
        }

        Ok(CombinedRecommendation {
            symbol: symbol.to_string(),
            generated_at: Utc::now(),
            timeframes: reports,
            overall,
            combined_narration,
            disclaimer: RISK_DISCLAIMER.to_string(),
        })
    }

    fn narration_deadline(&self) -> Option<(Instant, Duration)> {
        self.narration_timeout
            .map(|limit| (Instant::now() + limit, limit))
    }

    async fn await_narration(
        &self,
        handle: BrokerHandle<String>,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<String, ForecastError> {
        match deadline {
            Some((at, limit)) => tokio::time::timeout_at(at, handle)
                .await
                .map_err(|_| ForecastError::NarrationTimedOut(limit))?,
            None => handle.await,
        }
    }

    /// Folds a narration result into the report. Only an unavailable broker
    /// escapes as an error.
    async fn narration_outcome(
        &self,
        handle: BrokerHandle<String>,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<Narration, ForecastError> {
        match self.await_narration(handle, deadline).await {
            Ok(text) => Ok(Narration::Generated { text }),
            Err(ForecastError::BrokerUnavailable(reason)) => {
                Err(ForecastError::BrokerUnavailable(reason))
            }
            Err(e) => {
                warn!(error = %e, "Orchestrator: narration failed");
                Ok(Narration::Failed {
                    error: e.to_string(),
                })
            }
        }
    }
}

/// Merges per-timeframe decisions, ordered short to long horizon.
///
/// The majority direction wins; its confidence is the rounded mean of the
/// agreeing decisions. On a tie the single most confident decision wins and
/// the earliest horizon breaks equal confidence.
pub fn merge_directions(decisions: &[DecisionResult]) -> Option<OverallDirection> {
    if decisions.is_empty() {
        return None;
    }

    let longs = decisions
        .iter()
        .filter(|d| d.direction == SignalDirection::Long)
        .count();
    let shorts = decisions.len() - longs;

    if longs != shorts {
        let direction = if longs > shorts {
            SignalDirection::Long
        } else {
            SignalDirection::Short
        };
        let agreeing: Vec<u32> = decisions
            .iter()
            .filter(|d| d.direction == direction)
            .map(|d| d.confidence as u32)
            .collect();
        let mean = agreeing.iter().sum::<u32>() as f64 / agreeing.len() as f64;
        return Some(OverallDirection {
            direction,
            confidence: mean.round() as u8,
            agreeing: agreeing.len(),
            considered: decisions.len(),
            rule: MergeRule::Majority,
        });
    }

    // `max_by_key` keeps the last maximum, so scan in reverse.
    let best = decisions.iter().rev().max_by_key(|d| d.confidence)?;
    Some(OverallDirection {
        direction: best.direction,
        confidence: best.confidence,
        agreeing: decisions
            .iter()
            .filter(|d| d.direction == best.direction)
            .count(),
        considered: decisions.len(),
        rule: MergeRule::HighestConfidence,
    })
}

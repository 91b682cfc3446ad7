//! Prometheus metrics for the HTTP surface, the broker and the orchestrator.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: IntGauge,
    pub http_request_duration_seconds: Histogram,
    pub narration_requests_total: IntCounter,
    pub narration_failures_total: IntCounterVec,
    pub narration_queue_depth: IntGauge,
    pub narration_duration_seconds: Histogram,
    pub forecast_requests_total: IntCounter,
    pub timeframe_failures_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total HTTP requests served")?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently in flight")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let narration_requests_total = IntCounter::new(
            "narration_requests_total",
            "Narration requests accepted by the broker",
        )?;
        let narration_failures_total = IntCounterVec::new(
            Opts::new(
                "narration_failures_total",
                "Narration requests that resolved with an error",
            ),
            &["kind"],
        )?;
        let narration_queue_depth = IntGauge::new(
            "narration_queue_depth",
            "Narration requests waiting for the broker worker",
        )?;
        let narration_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "narration_duration_seconds",
                "Time spent executing one narration request, retries included",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        let forecast_requests_total = IntCounter::new(
            "forecast_requests_total",
            "Combined multi-timeframe recommendations requested",
        )?;
        let timeframe_failures_total = IntCounterVec::new(
            Opts::new(
                "timeframe_failures_total",
                "Timeframe analyses that failed for lack of data",
            ),
            &["timeframe"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(narration_requests_total.clone()))?;
        registry.register(Box::new(narration_failures_total.clone()))?;
        registry.register(Box::new(narration_queue_depth.clone()))?;
        registry.register(Box::new(narration_duration_seconds.clone()))?;
        registry.register(Box::new(forecast_requests_total.clone()))?;
        registry.register(Box::new(timeframe_failures_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
            narration_requests_total,
            narration_failures_total,
            narration_queue_depth,
            narration_duration_seconds,
            forecast_requests_total,
            timeframe_failures_total,
        })
    }

    /// Text exposition of every registered metric.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

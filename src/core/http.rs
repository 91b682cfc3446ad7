//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::AppConfig;
use crate::core::orchestrator::ForecastOrchestrator;
use crate::core::runtime::ForecastRuntime;
use crate::error::{ForecastError, NarrationError};
use crate::metrics::Metrics;
use crate::models::{Timeframe, RISK_DISCLAIMER};

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub orchestrator: Arc<ForecastOrchestrator>,
}

impl AppState {
    pub fn new(metrics: Arc<Metrics>, orchestrator: Arc<ForecastOrchestrator>) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            orchestrator,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// A [`ForecastError`] rendered as an HTTP response.
pub struct ApiError(pub ForecastError);

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(err: &ForecastError) -> StatusCode {
    match err {
        ForecastError::DataUnavailable { .. } | ForecastError::BrokerUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ForecastError::Narration(NarrationError::QuotaExceeded(_)) => StatusCode::TOO_MANY_REQUESTS,
        ForecastError::Narration(_) => StatusCode::BAD_GATEWAY,
        ForecastError::NarrationTimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!(error = %self.0, status = %status, "API: request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

fn parse_timeframe(raw: &str) -> Result<Timeframe, Response> {
    raw.parse::<Timeframe>().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response()
    })
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    let broker_running = state.orchestrator.broker().is_running().await;
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "broker_running": broker_running,
        "service": "signalcast"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Snapshot and decision for one timeframe, without narration.
async fn get_snapshot(
    State(state): State<AppState>,
    Path((symbol, timeframe)): Path<(String, String)>,
) -> Result<Json<Value>, Response> {
    let timeframe = parse_timeframe(&timeframe)?;
    let symbol = symbol.to_uppercase();
    let analysis = state
        .orchestrator
        .analyze_timeframe(&symbol, timeframe)
        .await
        .map_err(|e| ApiError(e).into_response())?;
    Ok(Json(json!(analysis)))
}

/// Single-timeframe forecast with a detailed explanation.
async fn get_timeframe_forecast(
    State(state): State<AppState>,
    Path((symbol, timeframe)): Path<(String, String)>,
) -> Result<Json<Value>, Response> {
    let timeframe = parse_timeframe(&timeframe)?;
    let symbol = symbol.to_uppercase();
    let forecast = state
        .orchestrator
        .forecast_timeframe(&symbol, timeframe)
        .await
        .map_err(|e| ApiError(e).into_response())?;
    Ok(Json(json!(forecast)))
}

/// Combined recommendation across the configured horizons.
async fn get_combined_forecast(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let symbol = symbol.to_uppercase();
    let combined = state.orchestrator.combined_recommendation(&symbol).await?;
    Ok(Json(json!(combined)))
}

async fn get_disclaimer() -> Json<Value> {
    Json(json!({ "disclaimer": RISK_DISCLAIMER }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/disclaimer", get(get_disclaimer))
        .route("/api/snapshot/{symbol}/{timeframe}", get(get_snapshot))
        .route("/api/forecast/{symbol}", get(get_combined_forecast))
        .route(
            "/api/forecast/{symbol}/{timeframe}",
            get(get_timeframe_forecast),
        )
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.port;
    let runtime = ForecastRuntime::from_config(config)?;
    runtime.start().await;

    let state = AppState::new(runtime.metrics.clone(), runtime.orchestrator.clone());
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    runtime.shutdown().await;
    Ok(())
}

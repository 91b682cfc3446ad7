//! Signalcast API Server
//!
//! HTTP API serving indicator snapshots, single-timeframe forecasts and
//! combined multi-timeframe recommendations.

use dotenvy::dotenv;
use signalcast::config::AppConfig;
use signalcast::core::http::start_server;
use signalcast::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = AppConfig::from_env();
    info!("Starting Signalcast API Server");
    info!(environment = %config.environment, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);

    if let Err(e) = start_server(config).await {
        error!(error = %e, "HTTP server error");
        return Err(e);
    }

    info!("API server stopped");
    Ok(())
}

//! Core application primitives (broker, orchestrator, runtime, HTTP)

pub mod broker;
pub mod http;
pub mod orchestrator;
pub mod runtime;

pub use broker::{BrokerConfig, BrokerHandle, NarrationBroker, RetryPolicy};
pub use http::{create_router, start_server, AppState};
pub use orchestrator::{merge_directions, ForecastOrchestrator};
pub use runtime::{ForecastRuntime, RuntimeServices};

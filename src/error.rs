//! Error taxonomy shared by the engine, the broker and the upstream clients.
//!
//! Optional indicators that cannot be computed are not errors: they surface as
//! [`Reading::InsufficientData`](crate::models::Reading) or `None` on the
//! snapshot. Only missing data that would make the remaining computation
//! misleading is propagated.

use crate::models::Timeframe;
use std::time::Duration;
use thiserror::Error;

/// Failures of an upstream data collaborator (price history, technical summary).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode upstream payload: {0}")]
    Decode(String),

    #[error("no data for {0}")]
    NotFound(String),
}

/// Failures raised by the narration service. Messages are kept verbatim so the
/// caller can show them to the end user unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NarrationError {
    #[error("narration quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("narration service rejected credentials: {0}")]
    Unauthorized(String),

    #[error("narration service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("narration transport error: {0}")]
    Transport(String),

    #[error("narration service returned an empty response")]
    EmptyResponse,

    #[error("could not decode narration response: {0}")]
    Decode(String),
}

impl NarrationError {
    /// Quota and credential failures will not heal by retrying.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            NarrationError::QuotaExceeded(_) | NarrationError::Unauthorized(_)
        )
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            NarrationError::QuotaExceeded(_) => "quota",
            NarrationError::Unauthorized(_) => "unauthorized",
            NarrationError::Api { .. } => "api",
            NarrationError::Transport(_) => "transport",
            NarrationError::EmptyResponse => "empty",
            NarrationError::Decode(_) => "decode",
        }
    }
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("data unavailable for {symbol} @ {timeframe}: {reason}")]
    DataUnavailable {
        symbol: String,
        timeframe: Timeframe,
        reason: String,
    },

    #[error("narration broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error(transparent)]
    Narration(#[from] NarrationError),

    #[error("narration did not complete within {0:?}")]
    NarrationTimedOut(Duration),
}

impl ForecastError {
    pub fn data_unavailable(
        symbol: &str,
        timeframe: Timeframe,
        reason: impl std::fmt::Display,
    ) -> Self {
        ForecastError::DataUnavailable {
            symbol: symbol.to_string(),
            timeframe,
            reason: reason.to_string(),
        }
    }
}

//! Voice Order Server
//!
//! HTTP surface of the ordering agent:
//! - Telephony webhooks answering with TwiML
//! - Order API backed by the JSON order store
//! - Call inspection and text-driven turns
//! - Health, readiness and Prometheus metrics

pub mod http;
pub mod metrics;
pub mod state;
pub mod telephony;
pub mod twiml;

pub use http::create_router;
pub use metrics::{init_metrics, metrics_handler};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use voice_order_persistence::PersistenceError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PersistenceError> for ServerError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::InvalidOrder(msg) => ServerError::InvalidRequest(msg),
            other => ServerError::Persistence(other.to_string()),
        }
    }
}

impl From<voice_order_config::ConfigError> for ServerError {
    fn from(err: voice_order_config::ConfigError) -> Self {
        ServerError::Configuration(err.to_string())
    }
}

impl From<voice_order_pipeline::PipelineError> for ServerError {
    fn from(err: voice_order_pipeline::PipelineError) -> Self {
        use voice_order_pipeline::PipelineError;
        match err {
            PipelineError::InvalidAudioName(name) => {
                ServerError::InvalidRequest(format!("invalid audio file name: {}", name))
            }
            PipelineError::AudioNotFound(name) => ServerError::NotFound(name),
            PipelineError::Configuration(msg) => ServerError::Configuration(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<voice_order_text_processing::TextProcessingError> for ServerError {
    fn from(err: voice_order_text_processing::TextProcessingError) -> Self {
        ServerError::Configuration(err.to_string())
    }
}

impl From<&ServerError> for StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

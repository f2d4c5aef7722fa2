use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type for rate limiter operations
pub type Result<T> = std::result::Result<T, LimiterError>;

/// Rate limiter error types
#[derive(Error, Debug)]
pub enum LimiterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Redis connection failed: {0}")]
    Connection(redis::RedisError),

    #[error("Redis {op} failed for key {key}: {source}")]
    Backend {
        op: &'static str,
        key: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("Failed to {op} window record for key {key}: {source}")]
    Serialization {
        op: &'static str,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl LimiterError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LimiterError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LimiterError::Validation(_) => StatusCode::BAD_REQUEST,
            LimiterError::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LimiterError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            LimiterError::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            LimiterError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LimiterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LimiterError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

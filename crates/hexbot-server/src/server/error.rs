//! Request-level errors.
//!
//! Generation itself never fails: timeouts and worker faults arrive as a
//! `warning` on an otherwise successful response. The only errors a client can
//! see are rejected inputs and requests arriving during shutdown.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// `count` was not a non-negative integer.
    #[error("Invalid count {value:?}: expected a non-negative integer")]
    InvalidCount { value: String },

    /// `count` exceeded the configured limit.
    #[error("Count {count} exceeds maximum allowed ({max})")]
    CountTooLarge { count: usize, max: usize },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCount { .. } | Self::CountTooLarge { .. } => StatusCode::BAD_REQUEST,
            Self::ServiceShutdown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

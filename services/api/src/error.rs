//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how it is
//! rendered as an HTTP response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use civic_connect_core::ports::PortError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the core store or one of its ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a malformed request that never reached the core.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Port(port) => match port {
                PortError::Unauthenticated | PortError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, port.to_string())
                }
                PortError::Forbidden => (StatusCode::FORBIDDEN, port.to_string()),
                PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                PortError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                PortError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
                PortError::NotReady => (StatusCode::SERVICE_UNAVAILABLE, port.to_string()),
                PortError::ExternalService(_) | PortError::InvalidAssessmentShape(_) => {
                    tracing::error!("Scoring failed: {}", port);
                    (
                        StatusCode::BAD_GATEWAY,
                        "Failed to get AI assessment.".to_string(),
                    )
                }
                PortError::Unexpected(msg) => {
                    tracing::error!("Unexpected port error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Config(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        (status, Json(ErrorBody { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: PortError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_port_errors_map_to_statuses() {
        assert_eq!(status_of(PortError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(PortError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(PortError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_of(PortError::NotFound("r".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(PortError::InvalidInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(PortError::Conflict("dup".into())), StatusCode::CONFLICT);
        assert_eq!(status_of(PortError::NotReady), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_of(PortError::Unexpected("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_both_scoring_failures_look_identical_to_callers() {
        let a = ApiError::from(PortError::ExternalService("timeout".into())).status_and_message();
        let b = ApiError::from(PortError::InvalidAssessmentShape("bad".into())).status_and_message();
        assert_eq!(a, b);
        assert_eq!(a.0, StatusCode::BAD_GATEWAY);
    }
}

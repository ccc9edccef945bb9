//! Error types for the runpad server and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use runpad_core::CoreError;
use serde::Serialize;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result type used across the runpad server.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configuration file could not be read or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request payload decoded but cannot be acted on.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The caller is not allowed to use this endpoint.
    #[error("forbidden")]
    Forbidden,

    /// A core operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O failure outside the core, e.g. startup directory creation.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON body attached to error responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable description of the failure.
    pub error: String,
}

//--------------------------------------------------------------------------------------------------
// Implementations
//--------------------------------------------------------------------------------------------------

impl ServerError {
    /// HTTP status the error maps to. Client mistakes are 4xx; everything
    /// the caller cannot fix is a 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Forbidden => StatusCode::FORBIDDEN,
            ServerError::Core(CoreError::InvalidNoteId(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            ServerError::Validation("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServerError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServerError::Core(CoreError::InvalidNoteId("../x".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::Core(CoreError::PoolClosed).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

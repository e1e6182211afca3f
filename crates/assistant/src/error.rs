//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; clients always receive a JSON `{"error": ...}`
//! body on failure.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::embedding::EmbeddingError;
use crate::llm::LlmError;
use crate::policy::PolicyError;
use crate::search::SearchError;

/// Application-level error type for the assistant.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Catalog search failed.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Embedding the input failed.
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Policy passage retrieval failed.
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// The upstream language model failed.
    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    /// Message `type` tag is neither "catalog" nor "policy".
    #[error("Invalid type '{0}'. Use 'catalog' or 'policy'.")]
    InvalidMessageType(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_)
                | Self::Search(_)
                | Self::Embedding(_)
                | Self::Policy(_)
                | Self::Llm(_)
                | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_)
            | Self::Search(_)
            | Self::Embedding(_)
            | Self::Policy(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Llm(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidMessageType(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
            Self::Search(_) | Self::Embedding(_) | Self::Policy(_) => {
                "Failed to process the message".to_owned()
            }
            Self::Llm(_) => "Upstream language model error".to_owned(),
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::InvalidMessageType("sac".to_owned());
        assert_eq!(err.to_string(), "Invalid type 'sac'. Use 'catalog' or 'policy'.");

        let err = AppError::BadRequest("text must not be empty".to_owned());
        assert_eq!(err.to_string(), "Bad request: text must not be empty");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::InvalidMessageType("x".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Llm(crate::llm::LlmError::EmptyResponse)),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_details_not_leaked() {
        let response = AppError::Internal("secret connection string".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The body is the generic message; the detail stays in the logs.
    }
}

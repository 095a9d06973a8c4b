//! Server error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use task_store::TaskStoreError;

/// Error codes returned in JSON error bodies.
pub mod error_codes {
    pub const NOT_FOUND: &str = "not_found";
    pub const STORE_UNAVAILABLE: &str = "store_unavailable";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Task store error.
    #[error("Store error: {0}")]
    Store(#[from] TaskStoreError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Returns the HTTP status and error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            ServerError::Store(TaskStoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, error_codes::NOT_FOUND)
            }
            ServerError::Store(TaskStoreError::Unavailable { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::STORE_UNAVAILABLE,
            ),
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = match &self {
            ServerError::NotFound(msg) | ServerError::Internal(msg) => msg.clone(),
            ServerError::Store(e) => e.to_string(),
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let (status, code) = ServerError::NotFound("Task not found".to_string()).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "not_found");
    }

    #[test]
    fn test_store_not_found_maps_to_404() {
        let err = ServerError::from(TaskStoreError::not_found("abc"));
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_unavailable_maps_to_500() {
        let err = ServerError::from(TaskStoreError::malformed("dynamodb", "bad item"));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable")
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = ServerError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

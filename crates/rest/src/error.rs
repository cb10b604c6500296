//! Error types for the HTTP layer.
//!
//! Storage errors are mapped to the API's three client-visible categories:
//!
//! | Store error | HTTP status | Message |
//! |-------------|-------------|---------|
//! | `ResourceError::NotFound` | 404 | "Task not found" / "User not found" |
//! | `ValidationError` | 400 | the validation message verbatim |
//! | `QueryError` | 400 | the parse message verbatim |
//! | `BackendError` | 500 | "Server error" (detail goes to the log) |
//!
//! Every error response carries the same `{message, data}` envelope as a
//! success response, with `data` set to an empty object.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use llamaio_store::error::{BackendError, QueryError, ResourceError, StoreError, ValidationError};
use llamaio_store::Collection;
use thiserror::Error;
use tracing::error;

/// The primary error type for API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request was malformed or failed validation (HTTP 400).
    #[error("{message}")]
    BadRequest {
        /// Client-facing message.
        message: String,
    },

    /// The addressed entity does not exist (HTTP 404).
    #[error("{message}")]
    NotFound {
        /// Client-facing message.
        message: String,
    },

    /// Something went wrong server-side (HTTP 500).
    ///
    /// The detail is logged; clients only ever see "Server error".
    #[error("server error: {detail}")]
    Internal {
        /// Internal detail, never sent to clients.
        detail: String,
    },
}

impl ApiError {
    /// The 404 for a missing document in `collection`.
    pub fn not_found(collection: Collection) -> Self {
        let message = match collection {
            Collection::Tasks => "Task not found",
            Collection::Users => "User not found",
        };
        ApiError::NotFound {
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            ApiError::Internal { detail } => {
                error!(detail = %detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        let body = serde_json::json!({
            "message": message,
            "data": {},
        });
        (status, Json(body)).into_response()
    }
}

// Conversions from storage errors

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Resource(e) => e.into(),
            StoreError::Validation(e) => e.into(),
            StoreError::Query(e) => e.into(),
            StoreError::Backend(e) => e.into(),
        }
    }
}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound { collection, .. } => ApiError::not_found(collection),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest {
            message: err.to_string(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::BadRequest {
            message: err.to_string(),
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        ApiError::Internal {
            detail: err.to_string(),
        }
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_per_collection() {
        assert_eq!(
            ApiError::not_found(Collection::Tasks).to_string(),
            "Task not found"
        );
        assert_eq!(
            ApiError::not_found(Collection::Users).to_string(),
            "User not found"
        );
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let err: ApiError = ValidationError::UniqueViolation { field: "email" }.into();
        assert_eq!(err.to_string(), "email must be unique");
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }

    #[test]
    fn store_not_found_becomes_404() {
        let store_err: StoreError = ResourceError::NotFound {
            collection: Collection::Users,
            id: "u-1".to_string(),
        }
        .into();
        let err: ApiError = store_err.into();
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(err.to_string(), "User not found");
    }

    #[test]
    fn backend_errors_hide_their_detail() {
        let err: ApiError = BackendError::Failure {
            message: "disk on fire".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::Internal { .. }));
    }
}

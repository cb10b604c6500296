//! Error types for the storage layer.
//!
//! Errors are organized into a small hierarchy so the HTTP layer can map
//! each category to a status code without inspecting message text:
//!
//! | Error | Meaning | HTTP status (see `llamaio-rest`) |
//! |-------|---------|----------------------------------|
//! | [`ResourceError::NotFound`] | entity id does not exist | 404 |
//! | [`ValidationError`] | bad input, uniqueness collision, dangling reference | 400 |
//! | [`QueryError::MalformedParameter`] | bad JSON in where/sort/select | 400 |
//! | [`BackendError`] | anything else from the store | 500 |

use thiserror::Error;

use crate::core::Collection;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Entity state errors (missing documents).
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Input validation errors.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query-string parsing errors.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Backend-specific failures.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to document existence.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The requested document was not found.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// The collection that was searched.
        collection: Collection,
        /// The document id.
        id: String,
    },
}

/// Errors raised when client-supplied data is rejected before any write.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// One or more required fields are absent or empty.
    ///
    /// `fields` is the human-readable list, e.g. `"name and deadline"`.
    #[error("{fields} are required")]
    MissingRequired {
        /// The missing field names, pre-joined for the client message.
        fields: &'static str,
    },

    /// A unique index rejected the write.
    #[error("{field} must be unique")]
    UniqueViolation {
        /// The indexed field.
        field: &'static str,
    },

    /// A reference field points at an entity that does not exist.
    #[error("{field} does not exist")]
    ReferenceNotFound {
        /// The referencing field (`assignedUser` or `pendingTasks`).
        field: &'static str,
        /// The dangling id.
        id: String,
    },
}

/// Errors raised while parsing query-string parameters.
#[derive(Error, Debug)]
pub enum QueryError {
    /// A JSON-encoded parameter (`where`, `sort`, `select`) failed to decode
    /// or decoded into an unusable shape.
    #[error("invalid JSON for \"{param}\": {detail}")]
    MalformedParameter {
        /// The offending query-string key.
        param: &'static str,
        /// Decode or structure error detail.
        detail: String,
    },
}

/// Backend failures that are not the client's fault.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend could not complete an operation.
    #[error("backend failure: {message}")]
    Failure {
        /// Internal detail; logged, never sent to clients.
        message: String,
    },

    /// A stored document no longer round-trips through the model types.
    #[error("corrupt document: {0}")]
    CorruptDocument(#[from] serde_json::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(BackendError::CorruptDocument(err))
    }
}

/// Result type alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

//! The `{message, data}` response envelope.
//!
//! Every response body, success or error, is an object with a
//! human-readable `message` and a `data` payload.

use serde::Serialize;

/// The uniform response body.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    /// Human-readable outcome, e.g. `"Task created"`.
    pub message: String,
    /// The payload: a document, a list, or a count.
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    /// Wraps a payload with its message.
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

//! The API root and the unmatched-route fallback.

use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

use crate::envelope::Envelope;
use crate::error::ApiError;

/// GET `/api` - liveness check.
pub async fn api_home() -> Json<Envelope<Value>> {
    Json(Envelope::new(
        "Llama.io API is alive",
        json!({ "time": Utc::now().to_rfc3339() }),
    ))
}

/// Fallback for any route outside the API surface.
pub async fn endpoint_not_found() -> ApiError {
    ApiError::NotFound {
        message: "Endpoint not found".to_string(),
    }
}

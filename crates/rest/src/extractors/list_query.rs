//! Raw query-string extraction for list endpoints.
//!
//! List endpoints accept `where`, `sort`, `select`, `skip`, `limit` and
//! `count`. The values of the JSON-encoded parameters are themselves JSON,
//! so the query string is captured as a plain string map here and handed
//! to the store's parser untouched.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

use crate::error::ApiError;

/// The raw key/value pairs of a request's query string.
#[derive(Debug, Default)]
pub struct ListQuery(pub HashMap<String, String>);

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|err| ApiError::BadRequest {
                message: format!("invalid query string: {}", err),
            })?;
        Ok(ListQuery(params))
    }
}

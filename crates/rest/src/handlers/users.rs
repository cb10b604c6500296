//! Handlers for the `/api/users` endpoints.
//!
//! Mirrors the tasks handlers, with one deliberate asymmetry: user
//! listings have no default `limit`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use llamaio_store::core::{Collection, DocumentStore};
use llamaio_store::model::{User, UserInput};
use llamaio_store::query::{ParsedQuery, QueryPlan, parse_select};
use serde_json::{Value, json};
use tracing::debug;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{JsonBody, ListQuery};
use crate::state::AppState;

/// GET `/api/users` - list or count users.
pub async fn list_users<S: DocumentStore>(
    State(state): State<AppState<S>>,
    ListQuery(params): ListQuery,
) -> ApiResult<Json<Envelope<Value>>> {
    let parsed = ParsedQuery::from_raw(&params)?;
    let plan = QueryPlan::build(Collection::Users, parsed);

    if plan.count_only {
        let count = state.store().count(&plan).await?;
        debug!(count, "user count");
        return Ok(Json(Envelope::new("OK", json!(count))));
    }

    let docs = state.store().find(&plan).await?;
    debug!(returned = docs.len(), "user listing");
    Ok(Json(Envelope::new("OK", Value::Array(docs))))
}

/// POST `/api/users` - create a user.
pub async fn create_user<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<UserInput>,
) -> ApiResult<(StatusCode, Json<Envelope<User>>)> {
    let draft = input.into_draft()?;
    let user = state.coordinator().create_user(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("User created", user)),
    ))
}

/// GET `/api/users/{id}` - fetch one user, optionally projected.
pub async fn read_user<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    ListQuery(params): ListQuery,
) -> ApiResult<Json<Envelope<Value>>> {
    let projection = parse_select(&params)?;
    let doc = state
        .store()
        .find_by_id(Collection::Users, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(Collection::Users))?;
    let doc = match &projection {
        Some(p) => p.apply(&doc),
        None => doc,
    };
    Ok(Json(Envelope::new("OK", doc)))
}

/// PUT `/api/users/{id}` - replace a user in full.
pub async fn update_user<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UserInput>,
) -> ApiResult<Json<Envelope<User>>> {
    let draft = input.into_draft()?;
    let user = state.coordinator().update_user(&id, draft).await?;
    Ok(Json(Envelope::new("User updated", user)))
}

/// DELETE `/api/users/{id}` - delete a user, unassigning its tasks.
pub async fn delete_user<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<Envelope<Value>>)> {
    state.coordinator().delete_user(&id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        Json(Envelope::new("User deleted", json!({}))),
    ))
}

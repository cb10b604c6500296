//! Handlers for the `/api/tasks` endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use llamaio_store::core::{Collection, DocumentStore};
use llamaio_store::model::{Task, TaskInput};
use llamaio_store::query::{ParsedQuery, QueryPlan, parse_select};
use serde_json::{Value, json};
use tracing::debug;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{JsonBody, ListQuery};
use crate::state::AppState;

/// GET `/api/tasks` - list or count tasks.
///
/// Without an explicit `limit` the listing is capped at 100 documents.
pub async fn list_tasks<S: DocumentStore>(
    State(state): State<AppState<S>>,
    ListQuery(params): ListQuery,
) -> ApiResult<Json<Envelope<Value>>> {
    let parsed = ParsedQuery::from_raw(&params)?;
    let plan = QueryPlan::build(Collection::Tasks, parsed);

    if plan.count_only {
        let count = state.store().count(&plan).await?;
        debug!(count, "task count");
        return Ok(Json(Envelope::new("OK", json!(count))));
    }

    let docs = state.store().find(&plan).await?;
    debug!(returned = docs.len(), "task listing");
    Ok(Json(Envelope::new("OK", Value::Array(docs))))
}

/// POST `/api/tasks` - create a task.
pub async fn create_task<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<TaskInput>,
) -> ApiResult<(StatusCode, Json<Envelope<Task>>)> {
    let draft = input.into_draft()?;
    let task = state.coordinator().create_task(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("Task created", task)),
    ))
}

/// GET `/api/tasks/{id}` - fetch one task, optionally projected.
pub async fn read_task<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    ListQuery(params): ListQuery,
) -> ApiResult<Json<Envelope<Value>>> {
    let projection = parse_select(&params)?;
    let doc = state
        .store()
        .find_by_id(Collection::Tasks, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(Collection::Tasks))?;
    let doc = match &projection {
        Some(p) => p.apply(&doc),
        None => doc,
    };
    Ok(Json(Envelope::new("OK", doc)))
}

/// PUT `/api/tasks/{id}` - replace a task in full.
pub async fn update_task<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<TaskInput>,
) -> ApiResult<Json<Envelope<Task>>> {
    let draft = input.into_draft()?;
    let task = state.coordinator().update_task(&id, draft).await?;
    Ok(Json(Envelope::new("Task updated", task)))
}

/// DELETE `/api/tasks/{id}` - delete a task.
pub async fn delete_task<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<Envelope<Value>>)> {
    state.coordinator().delete_task(&id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        Json(Envelope::new("Task deleted", json!({}))),
    ))
}

//! Route configuration.

use axum::Router;
use axum::routing::get;
use llamaio_store::core::DocumentStore;

use crate::handlers::{home, tasks, users};
use crate::state::AppState;

/// Builds the API router over the given application state.
///
/// | Method | Path | Handler |
/// |--------|------|---------|
/// | GET | `/api` | liveness |
/// | GET/POST | `/api/tasks` | list-or-count / create |
/// | GET/PUT/DELETE | `/api/tasks/{id}` | read / replace / delete |
/// | GET/POST | `/api/users` | list-or-count / create |
/// | GET/PUT/DELETE | `/api/users/{id}` | read / replace / delete |
///
/// Anything else falls through to a 404 envelope.
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/api", get(home::api_home))
        .route(
            "/api/tasks",
            get(tasks::list_tasks::<S>).post(tasks::create_task::<S>),
        )
        .route(
            "/api/tasks/{id}",
            get(tasks::read_task::<S>)
                .put(tasks::update_task::<S>)
                .delete(tasks::delete_task::<S>),
        )
        .route(
            "/api/users",
            get(users::list_users::<S>).post(users::create_user::<S>),
        )
        .route(
            "/api/users/{id}",
            get(users::read_user::<S>)
                .put(users::update_user::<S>)
                .delete(users::delete_user::<S>),
        )
        .fallback(home::endpoint_not_found)
        .with_state(state)
}

//! # llamaio-rest - Llama.io task tracker HTTP API
//!
//! This crate provides the HTTP surface of the Llama.io task tracker: two
//! document collections (`/api/tasks`, `/api/users`) with full CRUD, a
//! client-driven query interface on the list endpoints, and a uniform
//! `{message, data}` response envelope.
//!
//! ## Query interface
//!
//! List endpoints accept:
//!
//! | Parameter | Encoding | Meaning |
//! |-----------|----------|---------|
//! | `where` | JSON | filter, with `$gt`/`$gte`/`$lt`/`$lte`/`$ne`/`$in`/`$nin`/`$or`/`$and` |
//! | `sort` | JSON | field-to-direction map, `1` ascending, `-1` descending |
//! | `select` | JSON | field projection, `1` include, `0` exclude |
//! | `skip` | integer | documents to skip |
//! | `limit` | integer | maximum documents to return |
//! | `count` | `true` | return a count instead of documents |
//!
//! Task listings without a `limit` are capped at 100 documents; user
//! listings are not.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use llamaio_rest::{ServerConfig, create_app};
//! use llamaio_store::backends::MemoryBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = create_app(MemoryBackend::new());
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`error`] - error types and envelope generation
//! - [`envelope`] - the `{message, data}` response body
//! - [`config`] - server configuration
//! - [`state`] - application state (store, configuration)
//! - [`extractors`] - query-string and JSON-body extractors
//! - [`handlers`] - request handlers per endpoint
//! - [`routing`] - route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use envelope::Envelope;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use llamaio_store::core::DocumentStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(store: S) -> Router
where
    S: DocumentStore + 'static,
{
    create_app_with_config(store, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
pub fn create_app_with_config<S>(store: S, config: ServerConfig) -> Router
where
    S: DocumentStore + 'static,
{
    info!(
        "Creating API server with backend: {}",
        store.backend_name()
    );

    let state = AppState::new(Arc::new(store), config.clone());
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        let cors = build_cors_layer(&config);
        router.layer(cors)
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("llamaio_rest={},tower_http=debug", level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

//! Llama.io Task API storage layer.
//!
//! This crate provides everything below the HTTP surface of the task
//! tracker:
//!
//! - [`model`] - Task and User document types and validated input drafts
//! - [`query`] - the client-driven query layer: parameter parsing, the
//!   typed filter-expression tree, and deferred query plans
//! - [`core`] - the [`DocumentStore`] trait backends implement
//! - [`backends`] - the in-memory backend
//! - [`coordinator`] - the referential-integrity protocol that keeps
//!   `Task.assignedUser` and `User.pendingTasks` mutually consistent
//!   without multi-document transactions
//! - [`error`] - the [`StoreError`] hierarchy
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use llamaio_store::backends::MemoryBackend;
//! use llamaio_store::coordinator::ConsistencyCoordinator;
//! use llamaio_store::model::UserInput;
//!
//! # async fn example() -> llamaio_store::StoreResult<()> {
//! let store = Arc::new(MemoryBackend::new());
//! let coordinator = ConsistencyCoordinator::new(Arc::clone(&store));
//!
//! let draft = UserInput {
//!     name: Some("Ada".to_string()),
//!     email: Some("ada@example.com".to_string()),
//!     pending_tasks: None,
//! }
//! .into_draft()?;
//! let user = coordinator.create_user(draft).await?;
//! assert!(user.pending_tasks.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod backends;
pub mod coordinator;
pub mod core;
pub mod error;
pub mod model;
pub mod query;

pub use crate::core::{Collection, DocumentStore};
pub use crate::error::{StoreError, StoreResult};

//! Core document-store abstraction.
//!
//! This module defines the [`DocumentStore`] trait, the contract every
//! backend must satisfy. Documents are schemaless JSON values addressed by
//! a store-assigned `_id` string. Each individual document write is atomic;
//! sequences spanning multiple documents are not, and the
//! [`coordinator`](crate::coordinator) is written to tolerate that.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;
use crate::query::QueryPlan;

/// The document collections managed by this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Task documents.
    Tasks,
    /// User documents.
    Users,
}

impl Collection {
    /// Returns the collection's storage name.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns a document's `_id`, if present.
pub fn document_id(doc: &Value) -> Option<&str> {
    doc.get("_id").and_then(Value::as_str)
}

/// Storage trait for schemaless documents.
///
/// # Atomicity
///
/// Implementations must make each method call atomic with respect to other
/// calls, but callers get no cross-call transaction. Multi-document update
/// sequences rely on ordering and idempotence instead (see
/// [`ConsistencyCoordinator`](crate::coordinator::ConsistencyCoordinator)).
///
/// # Unique indexes
///
/// The `users` collection carries a unique, case-insensitive index on
/// `email`. A colliding `insert` or `replace` fails with
/// [`ValidationError::UniqueViolation`](crate::error::ValidationError),
/// never a panic.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Inserts a new document, assigning its `_id`.
    ///
    /// Returns the stored document including the assigned id.
    async fn insert(&self, collection: Collection, document: Value) -> StoreResult<Value>;

    /// Reads a document by id. Returns `None` when absent.
    async fn find_by_id(&self, collection: Collection, id: &str) -> StoreResult<Option<Value>>;

    /// Checks whether a document exists.
    ///
    /// More efficient backends may override this; the default goes through
    /// [`find_by_id`](DocumentStore::find_by_id).
    async fn exists(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        Ok(self.find_by_id(collection, id).await?.is_some())
    }

    /// Replaces a document in full, keeping its `_id`.
    ///
    /// Fails with `ResourceError::NotFound` when the document is absent.
    async fn replace(&self, collection: Collection, id: &str, document: Value)
        -> StoreResult<Value>;

    /// Removes a document.
    ///
    /// Fails with `ResourceError::NotFound` when the document is absent.
    async fn remove(&self, collection: Collection, id: &str) -> StoreResult<()>;

    /// Executes a deferred query plan, returning matching documents with
    /// sort, projection, skip and limit applied.
    async fn find(&self, plan: &QueryPlan) -> StoreResult<Vec<Value>>;

    /// Counts documents matching the plan's filter.
    ///
    /// Sort, projection, skip and limit on the plan are ignored.
    async fn count(&self, plan: &QueryPlan) -> StoreResult<u64>;

    /// Applies a shallow `$set`-style patch to every document whose id is in
    /// `ids`. Ids with no matching document are skipped silently.
    ///
    /// Returns the number of documents modified.
    async fn update_many(
        &self,
        collection: Collection,
        ids: &[String],
        patch: &Value,
    ) -> StoreResult<u64>;
}

//! In-memory document backend.
//!
//! The default backend: per-collection ordered maps behind a
//! `parking_lot::RwLock`, uuid-v4 id assignment, and a unique
//! case-insensitive index on `users.email`. Each trait method takes the
//! lock once, so individual document writes are atomic; sequences spanning
//! calls are not, exactly like the external stores this abstracts.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;
use uuid::Uuid;

use crate::core::{Collection, DocumentStore};
use crate::error::{ResourceError, StoreResult, ValidationError};
use crate::query::filter::{compare_values, lookup};
use crate::query::{QueryPlan, SortOrder};

/// The field carrying the unique index on the users collection.
const UNIQUE_USER_FIELD: &str = "email";

#[derive(Default)]
struct Collections {
    tasks: BTreeMap<String, Value>,
    users: BTreeMap<String, Value>,
}

impl Collections {
    fn get(&self, collection: Collection) -> &BTreeMap<String, Value> {
        match collection {
            Collection::Tasks => &self.tasks,
            Collection::Users => &self.users,
        }
    }

    fn get_mut(&mut self, collection: Collection) -> &mut BTreeMap<String, Value> {
        match collection {
            Collection::Tasks => &mut self.tasks,
            Collection::Users => &mut self.users,
        }
    }
}

/// In-memory [`DocumentStore`] implementation.
#[derive(Default)]
pub struct MemoryBackend {
    collections: RwLock<Collections>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforces the unique email index, skipping `exclude_id` so a document
    /// may be replaced with itself.
    fn check_unique(
        collection: Collection,
        docs: &BTreeMap<String, Value>,
        candidate: &Value,
        exclude_id: Option<&str>,
    ) -> Result<(), ValidationError> {
        if collection != Collection::Users {
            return Ok(());
        }
        let Some(email) = candidate.get(UNIQUE_USER_FIELD).and_then(Value::as_str) else {
            return Ok(());
        };
        let collision = docs.iter().any(|(id, doc)| {
            Some(id.as_str()) != exclude_id
                && doc
                    .get(UNIQUE_USER_FIELD)
                    .and_then(Value::as_str)
                    .is_some_and(|existing| existing.eq_ignore_ascii_case(email))
        });
        if collision {
            return Err(ValidationError::UniqueViolation { field: "email" });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: Collection, mut document: Value) -> StoreResult<Value> {
        let mut guard = self.collections.write();
        let docs = guard.get_mut(collection);
        Self::check_unique(collection, docs, &document, None)?;

        let id = Uuid::new_v4().to_string();
        document["_id"] = Value::String(id.clone());
        docs.insert(id.clone(), document.clone());
        trace!(collection = %collection, id = %id, "document inserted");
        Ok(document)
    }

    async fn find_by_id(&self, collection: Collection, id: &str) -> StoreResult<Option<Value>> {
        let guard = self.collections.read();
        Ok(guard.get(collection).get(id).cloned())
    }

    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        mut document: Value,
    ) -> StoreResult<Value> {
        let mut guard = self.collections.write();
        let docs = guard.get_mut(collection);
        if !docs.contains_key(id) {
            return Err(ResourceError::NotFound {
                collection,
                id: id.to_string(),
            }
            .into());
        }
        Self::check_unique(collection, docs, &document, Some(id))?;

        document["_id"] = Value::String(id.to_string());
        docs.insert(id.to_string(), document.clone());
        trace!(collection = %collection, id = %id, "document replaced");
        Ok(document)
    }

    async fn remove(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let mut guard = self.collections.write();
        if guard.get_mut(collection).remove(id).is_none() {
            return Err(ResourceError::NotFound {
                collection,
                id: id.to_string(),
            }
            .into());
        }
        trace!(collection = %collection, id = %id, "document removed");
        Ok(())
    }

    async fn find(&self, plan: &QueryPlan) -> StoreResult<Vec<Value>> {
        let guard = self.collections.read();
        let mut matched: Vec<Value> = guard
            .get(plan.collection)
            .values()
            .filter(|doc| plan.filter.matches(doc))
            .cloned()
            .collect();

        if let Some(sort) = &plan.sort {
            matched.sort_by(|a, b| {
                for (field, order) in &sort.fields {
                    let ordering = sort_cmp(lookup(a, field), lookup(b, field));
                    let ordering = match order {
                        SortOrder::Ascending => ordering,
                        SortOrder::Descending => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        let skip = plan.skip as usize;
        let mut page: Vec<Value> = if skip >= matched.len() {
            Vec::new()
        } else {
            matched.split_off(skip)
        };
        if let Some(limit) = plan.limit {
            page.truncate(limit as usize);
        }

        if let Some(projection) = &plan.projection {
            page = page.iter().map(|doc| projection.apply(doc)).collect();
        }
        Ok(page)
    }

    async fn count(&self, plan: &QueryPlan) -> StoreResult<u64> {
        let guard = self.collections.read();
        let count = guard
            .get(plan.collection)
            .values()
            .filter(|doc| plan.filter.matches(doc))
            .count();
        Ok(count as u64)
    }

    async fn update_many(
        &self,
        collection: Collection,
        ids: &[String],
        patch: &Value,
    ) -> StoreResult<u64> {
        let Some(patch) = patch.as_object() else {
            return Ok(0);
        };
        let mut guard = self.collections.write();
        let docs = guard.get_mut(collection);
        let mut modified = 0;
        for id in ids {
            if let Some(doc) = docs.get_mut(id) {
                if let Some(map) = doc.as_object_mut() {
                    for (key, value) in patch {
                        map.insert(key.clone(), value.clone());
                    }
                    modified += 1;
                }
            }
        }
        trace!(collection = %collection, modified, "bulk update applied");
        Ok(modified)
    }
}

/// Sort comparator: missing values order before present ones.
fn sort_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}

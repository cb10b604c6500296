//! Cross-reference consistency protocol.
//!
//! [`ConsistencyCoordinator`] owns every write sequence that touches the
//! bidirectional link between `Task.assignedUser` / `Task.assignedUserName`
//! and `User.pendingTasks`. The store offers no cross-document
//! transactions, so each sequence is built from idempotent steps with a
//! fixed order:
//!
//! - Referenced-entity checks run before the first write. A dangling
//!   `assignedUser` or `pendingTasks` entry fails the whole operation with
//!   `ReferenceNotFound` and nothing is written.
//! - On task update, the task document is persisted last, after all
//!   user-side writes, so a mid-sequence failure leaves the task in its
//!   prior consistent state.
//! - On a user's `pendingTasks` replacement, stale task references are
//!   bulk-cleared before new ones are bulk-set. The set step uses the
//!   user's new name even when the name changed in the same update.
//!
//! There is no rollback and no retry: a failure after the first write
//! surfaces as-is, and the invariants are restored by the next successful
//! operation touching the same entities. That trade-off is the price of
//! not requiring multi-document transactions; do not "fix" it here.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use crate::core::{Collection, DocumentStore};
use crate::error::{ResourceError, StoreResult, ValidationError};
use crate::model::{Task, TaskDraft, User, UserDraft, UNASSIGNED};
use crate::query::{FilterExpr, QueryPlan};

/// Executes the multi-document update sequences for Tasks and Users.
pub struct ConsistencyCoordinator<S> {
    store: Arc<S>,
}

impl<S> Clone for ConsistencyCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> ConsistencyCoordinator<S> {
    /// Creates a coordinator over the given store handle.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ---------------------------------------------------------------- tasks

    /// Creates a task, wiring up the assignee's `pendingTasks` when the
    /// task is assigned and not completed.
    pub async fn create_task(&self, draft: TaskDraft) -> StoreResult<Task> {
        // Resolve the assignee (and its name) before anything is written.
        let assignee = match draft.assigned_user.as_str() {
            "" => None,
            id => Some(self.require_assignee(id).await?),
        };
        let assigned_user_name = assignee
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| UNASSIGNED.to_string());

        let doc = json!({
            "name": draft.name,
            "description": draft.description,
            "deadline": draft.deadline,
            "completed": draft.completed,
            "assignedUser": draft.assigned_user,
            "assignedUserName": assigned_user_name,
        });
        let stored = self.store.insert(Collection::Tasks, doc).await?;
        let task: Task = serde_json::from_value(stored)?;

        if let Some(mut user) = assignee {
            if !task.completed && !user.pending_tasks.contains(&task.id) {
                user.pending_tasks.push(task.id.clone());
                self.save_user(&user).await?;
            }
        }

        debug!(task = %task.id, assignee = %task.assigned_user, "task created");
        Ok(task)
    }

    /// Replaces a task in full, moving it between users' `pendingTasks`
    /// as the assignment or completion state changes.
    pub async fn update_task(&self, id: &str, draft: TaskDraft) -> StoreResult<Task> {
        let existing = self.require_task(id).await?;

        // Missing-reference check precedes every write.
        if !draft.assigned_user.is_empty()
            && !self.store.exists(Collection::Users, &draft.assigned_user).await?
        {
            return Err(ValidationError::ReferenceNotFound {
                field: "assignedUser",
                id: draft.assigned_user,
            }
            .into());
        }

        // Detach from the previous assignee. Already-absent entries are a
        // no-op, which makes this step safe to replay.
        let previous = existing.assigned_user.clone();
        if !previous.is_empty() {
            self.remove_pending_task(&previous, id).await?;
        }

        // Attach to the new assignee, reloaded after the detach so a
        // same-user reassignment sees its own removal.
        let mut assigned_user_name = UNASSIGNED.to_string();
        if !draft.assigned_user.is_empty() {
            let mut user = self.require_assignee(&draft.assigned_user).await?;
            assigned_user_name = user.name.clone();
            if !draft.completed && !user.pending_tasks.contains(&existing.id) {
                user.pending_tasks.push(existing.id.clone());
                self.save_user(&user).await?;
            }
        }

        // The task itself is persisted last: if a user-side write failed
        // above, the task still points at its previous consistent state.
        let updated = Task {
            id: existing.id,
            name: draft.name,
            description: draft.description,
            deadline: draft.deadline,
            completed: draft.completed,
            assigned_user: draft.assigned_user,
            assigned_user_name,
        };
        self.store
            .replace(Collection::Tasks, id, serde_json::to_value(&updated)?)
            .await?;

        debug!(task = %id, assignee = %updated.assigned_user, "task updated");
        Ok(updated)
    }

    /// Deletes a task and removes it from its assignee's `pendingTasks`.
    pub async fn delete_task(&self, id: &str) -> StoreResult<()> {
        let task = self.require_task(id).await?;
        self.store.remove(Collection::Tasks, id).await?;

        if !task.assigned_user.is_empty() {
            self.remove_pending_task(&task.assigned_user, id).await?;
        }
        debug!(task = %id, "task deleted");
        Ok(())
    }

    // ---------------------------------------------------------------- users

    /// Creates a user; every task id in its `pendingTasks` is claimed via a
    /// bulk update after the user document exists.
    pub async fn create_user(&self, draft: UserDraft) -> StoreResult<User> {
        self.require_tasks_exist(&draft.pending_tasks).await?;

        let doc = json!({
            "name": draft.name,
            "email": draft.email,
            "pendingTasks": draft.pending_tasks,
            "dateCreated": Utc::now(),
        });
        let stored = self.store.insert(Collection::Users, doc).await?;
        let user: User = serde_json::from_value(stored)?;

        if !user.pending_tasks.is_empty() {
            self.claim_tasks(&user.pending_tasks, &user.id, &user.name)
                .await?;
        }
        debug!(user = %user.id, pending = user.pending_tasks.len(), "user created");
        Ok(user)
    }

    /// Replaces a user in full. The `pendingTasks` replacement clears
    /// stale task references before applying new ones, in that visible
    /// order, and stamps tasks with the user's new name.
    pub async fn update_user(&self, id: &str, draft: UserDraft) -> StoreResult<User> {
        let existing = self.require_user(id).await?;
        self.require_tasks_exist(&draft.pending_tasks).await?;
        self.require_email_available(&draft.email, id).await?;

        let stale: Vec<String> = existing
            .pending_tasks
            .iter()
            .filter(|tid| !draft.pending_tasks.contains(tid))
            .cloned()
            .collect();
        if !stale.is_empty() {
            self.release_tasks(&stale).await?;
        }
        if !draft.pending_tasks.is_empty() {
            self.claim_tasks(&draft.pending_tasks, id, &draft.name).await?;
        }

        let updated = User {
            id: existing.id,
            name: draft.name,
            email: draft.email,
            pending_tasks: draft.pending_tasks,
            // dateCreated is immutable; the stored value wins.
            date_created: existing.date_created,
        };
        self.save_user(&updated).await?;

        debug!(user = %id, pending = updated.pending_tasks.len(), "user updated");
        Ok(updated)
    }

    /// Deletes a user, unassigning (not deleting) all its pending tasks.
    pub async fn delete_user(&self, id: &str) -> StoreResult<()> {
        let user = self.require_user(id).await?;
        if !user.pending_tasks.is_empty() {
            self.release_tasks(&user.pending_tasks).await?;
        }
        self.store.remove(Collection::Users, id).await?;
        debug!(user = %id, "user deleted");
        Ok(())
    }

    // -------------------------------------------------------------- helpers

    async fn load_user(&self, id: &str) -> StoreResult<Option<User>> {
        match self.store.find_by_id(Collection::Users, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    async fn require_user(&self, id: &str) -> StoreResult<User> {
        self.load_user(id).await?.ok_or_else(|| {
            ResourceError::NotFound {
                collection: Collection::Users,
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Like [`require_user`](Self::require_user), but a missing user is the
    /// referencing document's fault: a 400, not a 404.
    async fn require_assignee(&self, id: &str) -> StoreResult<User> {
        self.load_user(id).await?.ok_or_else(|| {
            ValidationError::ReferenceNotFound {
                field: "assignedUser",
                id: id.to_string(),
            }
            .into()
        })
    }

    async fn require_task(&self, id: &str) -> StoreResult<Task> {
        match self.store.find_by_id(Collection::Tasks, id).await? {
            Some(doc) => Ok(serde_json::from_value(doc)?),
            None => Err(ResourceError::NotFound {
                collection: Collection::Tasks,
                id: id.to_string(),
            }
            .into()),
        }
    }

    async fn require_tasks_exist(&self, ids: &[String]) -> StoreResult<()> {
        for id in ids {
            if !self.store.exists(Collection::Tasks, id).await? {
                return Err(ValidationError::ReferenceNotFound {
                    field: "pendingTasks",
                    id: id.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Pre-flight uniqueness check so an email collision is reported before
    /// the bulk task writes begin. The backend's unique index remains the
    /// authoritative guard against races.
    async fn require_email_available(&self, email: &str, own_id: &str) -> StoreResult<()> {
        let mut plan = QueryPlan::all(Collection::Users);
        plan.filter = FilterExpr::Eq {
            field: "email".to_string(),
            value: Value::String(email.to_string()),
        };
        let holders = self.store.find(&plan).await?;
        let taken = holders
            .iter()
            .any(|doc| crate::core::document_id(doc) != Some(own_id));
        if taken {
            return Err(ValidationError::UniqueViolation { field: "email" }.into());
        }
        Ok(())
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.store
            .replace(Collection::Users, &user.id, serde_json::to_value(user)?)
            .await?;
        Ok(())
    }

    /// Removes a task id from a user's `pendingTasks`. Tolerates a missing
    /// user and an already-absent entry; both make the step replayable.
    async fn remove_pending_task(&self, user_id: &str, task_id: &str) -> StoreResult<()> {
        let Some(mut user) = self.load_user(user_id).await? else {
            return Ok(());
        };
        if user.pending_tasks.iter().any(|t| t == task_id) {
            user.pending_tasks.retain(|t| t != task_id);
            self.save_user(&user).await?;
        }
        Ok(())
    }

    /// Bulk-stamps tasks with an owner. Filter is "id in set"; unknown ids
    /// simply do not match.
    async fn claim_tasks(&self, ids: &[String], user_id: &str, user_name: &str) -> StoreResult<()> {
        let patch = json!({
            "assignedUser": user_id,
            "assignedUserName": user_name,
        });
        self.store
            .update_many(Collection::Tasks, ids, &patch)
            .await?;
        Ok(())
    }

    /// Bulk-clears task ownership.
    async fn release_tasks(&self, ids: &[String]) -> StoreResult<()> {
        let patch = json!({
            "assignedUser": "",
            "assignedUserName": UNASSIGNED,
        });
        self.store
            .update_many(Collection::Tasks, ids, &patch)
            .await?;
        Ok(())
    }
}

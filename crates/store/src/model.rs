//! Document model types.
//!
//! Stored documents use camelCase field names with the id under `_id`,
//! matching the wire format. [`TaskInput`] and [`UserInput`] are the raw
//! request-body shapes; [`TaskInput::into_draft`] / [`UserInput::into_draft`]
//! validate required fields and normalize values before anything touches
//! the store.
//!
//! `Task.assignedUserName` is a derived field: it caches the name of the
//! referenced user (or [`UNASSIGNED`]) and is recomputed on every write that
//! touches the reference. Client-supplied values are accepted on the wire
//! but always overwritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// The `assignedUserName` value for tasks without an assignee.
pub const UNASSIGNED: &str = "unassigned";

/// A stored Task document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Task name (required, non-empty).
    pub name: String,
    /// Free-form description, defaults to empty.
    #[serde(default)]
    pub description: String,
    /// Due date.
    pub deadline: DateTime<Utc>,
    /// Whether the task is done. Completed tasks are never pending.
    #[serde(default)]
    pub completed: bool,
    /// Id of the assigned user, or `""` when unassigned.
    #[serde(default)]
    pub assigned_user: String,
    /// Cached name of the assigned user, or `"unassigned"`.
    #[serde(default = "default_assigned_user_name")]
    pub assigned_user_name: String,
}

fn default_assigned_user_name() -> String {
    UNASSIGNED.to_string()
}

/// A stored User document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name (required).
    pub name: String,
    /// Unique email, stored trimmed and lower-cased.
    pub email: String,
    /// Ids of this user's pending (assigned, not completed) tasks.
    /// Ordered, no duplicates.
    #[serde(default)]
    pub pending_tasks: Vec<String>,
    /// Set once at creation; a later full replace cannot change it.
    pub date_created: DateTime<Utc>,
}

/// Raw Task request body.
///
/// Every field is optional at the serde level so missing required fields
/// surface as a validation message rather than a body-decode failure.
// Raw input shapes are self-describing; the drafts below carry the docs.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Accepts a JSON bool or the literal string `"true"` (legacy clients).
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: bool,
    #[serde(default)]
    pub assigned_user: Option<String>,
    /// Accepted on the wire but ignored; the cache is always recomputed.
    #[serde(default)]
    pub assigned_user_name: Option<String>,
}

/// Validated Task fields, ready for the coordinator.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub completed: bool,
    /// Empty string means unassigned.
    pub assigned_user: String,
}

impl TaskInput {
    /// Validates required fields and fills defaults.
    pub fn into_draft(self) -> Result<TaskDraft, ValidationError> {
        let name = self.name.unwrap_or_default();
        let missing = ValidationError::MissingRequired {
            fields: "name and deadline",
        };
        if name.is_empty() {
            return Err(missing);
        }
        let deadline = self.deadline.ok_or(missing)?;
        Ok(TaskDraft {
            name,
            description: self.description.unwrap_or_default(),
            deadline,
            completed: self.completed,
            assigned_user: self.assigned_user.unwrap_or_default(),
        })
    }
}

/// Raw User request body.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub pending_tasks: Option<Vec<String>>,
}

/// Validated User fields, ready for the coordinator.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub name: String,
    /// Trimmed and lower-cased.
    pub email: String,
    /// Deduplicated, first occurrence wins.
    pub pending_tasks: Vec<String>,
}

impl UserInput {
    /// Validates required fields, normalizes the email, and deduplicates
    /// the pending-task list so it can satisfy the "exactly once" invariant.
    pub fn into_draft(self) -> Result<UserDraft, ValidationError> {
        let name = self.name.unwrap_or_default();
        let email = normalize_email(&self.email.unwrap_or_default());
        if name.is_empty() || email.is_empty() {
            return Err(ValidationError::MissingRequired {
                fields: "name and email",
            });
        }
        Ok(UserDraft {
            name,
            email,
            pending_tasks: dedup_preserving_order(self.pending_tasks.unwrap_or_default()),
        })
    }
}

/// Normalizes an email for storage and uniqueness comparison.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Accepts `true`/`false` or the string `"true"`; anything else is false.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s == "true",
        _ => false,
    })
}

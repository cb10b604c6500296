//! Coordinator consistency tests.
//!
//! Each test drives a full write sequence through `ConsistencyCoordinator`
//! and then inspects both sides of the Task/User link.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use llamaio_store::backends::MemoryBackend;
use llamaio_store::coordinator::ConsistencyCoordinator;
use llamaio_store::core::{Collection, DocumentStore};
use llamaio_store::error::{StoreError, ValidationError};
use llamaio_store::model::{Task, TaskDraft, User, UserDraft, UNASSIGNED};

fn coordinator() -> ConsistencyCoordinator<MemoryBackend> {
    ConsistencyCoordinator::new(Arc::new(MemoryBackend::new()))
}

fn task_draft(name: &str, assigned_user: &str, completed: bool) -> TaskDraft {
    TaskDraft {
        name: name.to_string(),
        description: String::new(),
        deadline: Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
        completed,
        assigned_user: assigned_user.to_string(),
    }
}

fn user_draft(name: &str, email: &str, pending: &[&str]) -> UserDraft {
    UserDraft {
        name: name.to_string(),
        email: email.to_string(),
        pending_tasks: pending.iter().map(|s| s.to_string()).collect(),
    }
}

async fn fetch_user(c: &ConsistencyCoordinator<MemoryBackend>, id: &str) -> User {
    let doc = c
        .store()
        .find_by_id(Collection::Users, id)
        .await
        .unwrap()
        .expect("user should exist");
    serde_json::from_value(doc).unwrap()
}

async fn fetch_task(c: &ConsistencyCoordinator<MemoryBackend>, id: &str) -> Task {
    let doc = c
        .store()
        .find_by_id(Collection::Tasks, id)
        .await
        .unwrap()
        .expect("task should exist");
    serde_json::from_value(doc).unwrap()
}

#[tokio::test]
async fn creating_an_assigned_task_links_both_sides() {
    let c = coordinator();
    let user = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();

    let task = c.create_task(task_draft("write report", &user.id, false)).await.unwrap();
    assert_eq!(task.assigned_user, user.id);
    assert_eq!(task.assigned_user_name, "Ada");

    let user = fetch_user(&c, &user.id).await;
    assert_eq!(user.pending_tasks, vec![task.id]);
}

#[tokio::test]
async fn creating_a_completed_task_skips_pending_tasks() {
    let c = coordinator();
    let user = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();

    let task = c.create_task(task_draft("done already", &user.id, true)).await.unwrap();
    assert_eq!(task.assigned_user_name, "Ada");

    let user = fetch_user(&c, &user.id).await;
    assert!(user.pending_tasks.is_empty());
}

#[tokio::test]
async fn creating_a_task_with_a_dangling_assignee_writes_nothing() {
    let c = coordinator();
    let err = c.create_task(task_draft("orphan", "nope", false)).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::ReferenceNotFound {
            field: "assignedUser",
            ..
        })
    ));
    assert_eq!(err.to_string(), "assignedUser does not exist");

    let tasks = c
        .store()
        .find(&llamaio_store::query::QueryPlan::all(Collection::Tasks))
        .await
        .unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn completing_a_task_removes_it_from_pending() {
    let c = coordinator();
    let user = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();
    let task = c.create_task(task_draft("write report", &user.id, false)).await.unwrap();

    let updated = c
        .update_task(&task.id, task_draft("write report", &user.id, true))
        .await
        .unwrap();
    assert!(updated.completed);
    assert_eq!(updated.assigned_user, user.id);

    let user = fetch_user(&c, &user.id).await;
    assert!(user.pending_tasks.is_empty());
}

#[tokio::test]
async fn reopening_a_task_restores_the_pending_entry() {
    let c = coordinator();
    let user = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();
    let task = c.create_task(task_draft("t", &user.id, false)).await.unwrap();
    c.update_task(&task.id, task_draft("t", &user.id, true)).await.unwrap();

    c.update_task(&task.id, task_draft("t", &user.id, false)).await.unwrap();
    let user = fetch_user(&c, &user.id).await;
    assert_eq!(user.pending_tasks, vec![task.id]);
}

#[tokio::test]
async fn reassigning_a_task_moves_it_between_users() {
    let c = coordinator();
    let a = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();
    let b = c.create_user(user_draft("Bob", "bob@example.com", &[])).await.unwrap();
    let task = c.create_task(task_draft("t", &a.id, false)).await.unwrap();

    let updated = c.update_task(&task.id, task_draft("t", &b.id, false)).await.unwrap();
    assert_eq!(updated.assigned_user, b.id);
    assert_eq!(updated.assigned_user_name, "Bob");

    let a = fetch_user(&c, &a.id).await;
    let b = fetch_user(&c, &b.id).await;
    assert!(a.pending_tasks.is_empty());
    assert_eq!(b.pending_tasks, vec![task.id]);
}

#[tokio::test]
async fn unassigning_a_task_clears_the_name_cache() {
    let c = coordinator();
    let user = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();
    let task = c.create_task(task_draft("t", &user.id, false)).await.unwrap();

    let updated = c.update_task(&task.id, task_draft("t", "", false)).await.unwrap();
    assert_eq!(updated.assigned_user, "");
    assert_eq!(updated.assigned_user_name, UNASSIGNED);

    let user = fetch_user(&c, &user.id).await;
    assert!(user.pending_tasks.is_empty());
}

#[tokio::test]
async fn updating_a_task_to_a_dangling_assignee_leaves_links_intact() {
    let c = coordinator();
    let user = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();
    let task = c.create_task(task_draft("t", &user.id, false)).await.unwrap();

    let err = c
        .update_task(&task.id, task_draft("t", "ghost", false))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::ReferenceNotFound { .. })
    ));

    // Nothing was written: task and user still point at each other.
    let task = fetch_task(&c, &task.id).await;
    assert_eq!(task.assigned_user, user.id);
    let user = fetch_user(&c, &user.id).await;
    assert_eq!(user.pending_tasks, vec![task.id]);
}

#[tokio::test]
async fn deleting_a_task_detaches_it_from_its_assignee() {
    let c = coordinator();
    let user = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();
    let task = c.create_task(task_draft("t", &user.id, false)).await.unwrap();

    c.delete_task(&task.id).await.unwrap();
    let user = fetch_user(&c, &user.id).await;
    assert!(user.pending_tasks.is_empty());
}

#[tokio::test]
async fn creating_a_user_claims_its_pending_tasks() {
    let c = coordinator();
    let t1 = c.create_task(task_draft("t1", "", false)).await.unwrap();
    let t2 = c.create_task(task_draft("t2", "", false)).await.unwrap();

    let user = c
        .create_user(user_draft("Ada", "ada@example.com", &[&t1.id, &t2.id]))
        .await
        .unwrap();
    assert_eq!(user.pending_tasks, vec![t1.id.clone(), t2.id.clone()]);

    for id in [&t1.id, &t2.id] {
        let task = fetch_task(&c, id).await;
        assert_eq!(task.assigned_user, user.id);
        assert_eq!(task.assigned_user_name, "Ada");
    }
}

#[tokio::test]
async fn creating_a_user_with_a_dangling_task_writes_nothing() {
    let c = coordinator();
    let err = c
        .create_user(user_draft("Ada", "ada@example.com", &["ghost"]))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "pendingTasks does not exist");

    let users = c
        .store()
        .find(&llamaio_store::query::QueryPlan::all(Collection::Users))
        .await
        .unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn replacing_pending_tasks_releases_stale_and_claims_new() {
    let c = coordinator();
    let t1 = c.create_task(task_draft("t1", "", false)).await.unwrap();
    let t2 = c.create_task(task_draft("t2", "", false)).await.unwrap();
    let user = c
        .create_user(user_draft("Ada", "ada@example.com", &[&t1.id]))
        .await
        .unwrap();

    let updated = c
        .update_user(&user.id, user_draft("Ada", "ada@example.com", &[&t2.id]))
        .await
        .unwrap();
    assert_eq!(updated.pending_tasks, vec![t2.id.clone()]);

    let released = fetch_task(&c, &t1.id).await;
    assert_eq!(released.assigned_user, "");
    assert_eq!(released.assigned_user_name, UNASSIGNED);

    let claimed = fetch_task(&c, &t2.id).await;
    assert_eq!(claimed.assigned_user, user.id);
}

#[tokio::test]
async fn renaming_a_user_stamps_tasks_with_the_new_name() {
    let c = coordinator();
    let task = c.create_task(task_draft("t", "", false)).await.unwrap();
    let user = c
        .create_user(user_draft("Ada", "ada@example.com", &[&task.id]))
        .await
        .unwrap();

    c.update_user(&user.id, user_draft("Ada Lovelace", "ada@example.com", &[&task.id]))
        .await
        .unwrap();

    let task = fetch_task(&c, &task.id).await;
    assert_eq!(task.assigned_user_name, "Ada Lovelace");
}

#[tokio::test]
async fn update_user_preserves_date_created() {
    let c = coordinator();
    let user = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();

    let updated = c
        .update_user(&user.id, user_draft("Ada L.", "ada@example.com", &[]))
        .await
        .unwrap();
    assert_eq!(updated.date_created, user.date_created);
}

#[tokio::test]
async fn update_user_rejects_a_taken_email_before_any_write() {
    let c = coordinator();
    let _ada = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();
    let bob = c.create_user(user_draft("Bob", "bob@example.com", &[])).await.unwrap();
    let task = c.create_task(task_draft("t", "", false)).await.unwrap();

    let err = c
        .update_user(&bob.id, user_draft("Bob", "ada@example.com", &[&task.id]))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "email must be unique");

    // The rejected update claimed nothing.
    let task = fetch_task(&c, &task.id).await;
    assert_eq!(task.assigned_user, "");
}

#[tokio::test]
async fn deleting_a_user_unassigns_but_keeps_its_tasks() {
    let c = coordinator();
    let task = c.create_task(task_draft("t", "", false)).await.unwrap();
    let user = c
        .create_user(user_draft("Ada", "ada@example.com", &[&task.id]))
        .await
        .unwrap();

    c.delete_user(&user.id).await.unwrap();

    let task = fetch_task(&c, &task.id).await;
    assert_eq!(task.assigned_user, "");
    assert_eq!(task.assigned_user_name, UNASSIGNED);
    assert!(c
        .store()
        .find_by_id(Collection::Users, &user.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn detaching_an_already_absent_pending_entry_is_a_no_op() {
    let c = coordinator();
    let user = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();
    let task = c.create_task(task_draft("t", &user.id, false)).await.unwrap();

    // Completing removes the pending entry; the task stays assigned.
    c.update_task(&task.id, task_draft("t", &user.id, true)).await.unwrap();
    let before = fetch_user(&c, &user.id).await;
    assert!(before.pending_tasks.is_empty());

    // Deleting the task detaches again. The entry is already gone, so the
    // replayed removal must leave the user unchanged.
    c.delete_task(&task.id).await.unwrap();
    let after = fetch_user(&c, &user.id).await;
    assert_eq!(after.pending_tasks, before.pending_tasks);
    assert_eq!(after.name, before.name);
}

#[tokio::test]
async fn detaching_from_a_vanished_user_is_tolerated() {
    let c = coordinator();
    let user = c.create_user(user_draft("Ada", "ada@example.com", &[])).await.unwrap();
    let task = c.create_task(task_draft("t", &user.id, false)).await.unwrap();

    // Remove the user behind the coordinator's back, leaving the task with
    // a dangling assignee.
    c.store().remove(Collection::Users, &user.id).await.unwrap();

    // Deleting the task still succeeds; the user-side removal is a no-op.
    c.delete_task(&task.id).await.unwrap();
    assert!(c
        .store()
        .find_by_id(Collection::Tasks, &task.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn claiming_a_completed_task_keeps_it_in_pending_tasks() {
    // A completed task named in pendingTasks is accepted verbatim; only
    // the Task side records completion.
    let c = coordinator();
    let task = c.create_task(task_draft("done", "", true)).await.unwrap();
    let user = c
        .create_user(user_draft("Ada", "ada@example.com", &[&task.id]))
        .await
        .unwrap();
    assert_eq!(user.pending_tasks, vec![task.id.clone()]);

    let task = fetch_task(&c, &task.id).await;
    assert_eq!(task.assigned_user, user.id);
}

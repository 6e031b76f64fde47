//! Owner-scoped task operations for the web service
//!
//! Handlers call into this module after the auth middleware has resolved an
//! [`Identity`](crate::identity::Identity). Every function takes the caller's
//! uid and refuses to touch tasks owned by someone else.
//!
//! ```text
//! handlers ──> operations::tasks (this module) ──> docstore::TaskStore
//! ```
//!
//! Failure modes:
//! - `NotFound`: no task with that id exists at all
//! - `Forbidden`: the task exists but belongs to another owner
//! - `InvalidInput`: empty title or empty patch

use crate::docstore::TaskStore;
use crate::error::{Result, TickError};
use crate::model::{normalize_title, NewTask, Priority, TaskPatch, WebTask};

pub async fn create(
    store: &dyn TaskStore,
    owner: &str,
    title: &str,
    priority: Priority,
) -> Result<WebTask> {
    let title = normalize_title(title)?;
    let task = store.insert(owner, NewTask { title, priority }).await?;
    tracing::info!(task_id = %task.id, owner, "task created");
    Ok(task)
}

/// Caller's tasks, pending first, then by priority, then oldest first.
pub async fn list(store: &dyn TaskStore, owner: &str) -> Result<Vec<WebTask>> {
    let mut tasks = store.list_by_owner(owner).await?;
    // The store filters by owner; this is the last line of defence.
    tasks.retain(|t| t.owner == owner);
    tasks.sort_by(|a, b| {
        (a.completed, a.priority.rank(), a.created_at).cmp(&(
            b.completed,
            b.priority.rank(),
            b.created_at,
        ))
    });
    Ok(tasks)
}

pub async fn get(store: &dyn TaskStore, owner: &str, id: &str) -> Result<WebTask> {
    load_owned(store, owner, id).await
}

/// Apply a partial update.
///
/// # Steps
///
/// 1. Reject an empty patch, normalize the title if present
/// 2. Load the task and check ownership
/// 3. Apply and write back
pub async fn update(
    store: &dyn TaskStore,
    owner: &str,
    id: &str,
    mut patch: TaskPatch,
) -> Result<WebTask> {
    if patch.is_empty() {
        return Err(TickError::invalid_input(
            "nothing to update: send title, completed or priority",
        ));
    }
    if let Some(title) = &patch.title {
        patch.title = Some(normalize_title(title)?);
    }

    let mut task = load_owned(store, owner, id).await?;
    task.apply(&patch);
    store.put(&task).await?;
    tracing::info!(task_id = %task.id, owner, "task updated");
    Ok(task)
}

/// Mark done. Already-done tasks are returned unchanged.
pub async fn mark_done(store: &dyn TaskStore, owner: &str, id: &str) -> Result<WebTask> {
    let task = load_owned(store, owner, id).await?;
    if task.completed {
        return Ok(task);
    }
    update(
        store,
        owner,
        id,
        TaskPatch {
            completed: Some(true),
            ..Default::default()
        },
    )
    .await
}

pub async fn delete(store: &dyn TaskStore, owner: &str, id: &str) -> Result<()> {
    load_owned(store, owner, id).await?;
    if !store.remove(id).await? {
        // Gone between the ownership check and the delete.
        return Err(not_found(id));
    }
    tracing::info!(task_id = %id, owner, "task deleted");
    Ok(())
}

async fn load_owned(store: &dyn TaskStore, owner: &str, id: &str) -> Result<WebTask> {
    let task = store.get(id).await?.ok_or_else(|| not_found(id))?;
    if task.owner != owner {
        tracing::warn!(task_id = %id, caller = owner, "cross-owner access refused");
        return Err(TickError::Forbidden);
    }
    Ok(task)
}

fn not_found(id: &str) -> TickError {
    TickError::not_found(format!("task {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstore::memory::MemoryStore;

    #[tokio::test]
    async fn test_create_then_list() {
        let store = MemoryStore::new();
        let task = create(&store, "alice", "  Buy milk ", Priority::Low)
            .await
            .unwrap();
        assert_eq!(task.title, "Buy milk");

        let tasks = list(&store, "alice").await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert!(!tasks[0].completed);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let store = MemoryStore::new();
        assert!(matches!(
            create(&store, "alice", "  ", Priority::Low).await,
            Err(TickError::InvalidInput(_))
        ));
        assert!(list(&store, "alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_sorted() {
        let store = MemoryStore::new();
        let low = create(&store, "alice", "low", Priority::Low).await.unwrap();
        create(&store, "alice", "high", Priority::High).await.unwrap();
        create(&store, "alice", "medium", Priority::Medium).await.unwrap();
        create(&store, "bob", "bob's", Priority::High).await.unwrap();
        mark_done(&store, "alice", &low.id).await.unwrap();

        let titles: Vec<_> = list(&store, "alice")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["high", "medium", "low"]);
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found() {
        let store = MemoryStore::new();
        let patch = TaskPatch {
            completed: Some(true),
            ..Default::default()
        };
        assert!(matches!(
            get(&store, "alice", "nope").await,
            Err(TickError::NotFound(_))
        ));
        assert!(matches!(
            update(&store, "alice", "nope", patch).await,
            Err(TickError::NotFound(_))
        ));
        assert!(matches!(
            delete(&store, "alice", "nope").await,
            Err(TickError::NotFound(_))
        ));
        assert!(matches!(
            mark_done(&store, "alice", "nope").await,
            Err(TickError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_other_owner_is_forbidden() {
        let store = MemoryStore::new();
        let task = create(&store, "alice", "private", Priority::Low)
            .await
            .unwrap();

        assert!(matches!(
            get(&store, "bob", &task.id).await,
            Err(TickError::Forbidden)
        ));
        assert!(matches!(
            update(
                &store,
                "bob",
                &task.id,
                TaskPatch {
                    title: Some("mine now".into()),
                    ..Default::default()
                }
            )
            .await,
            Err(TickError::Forbidden)
        ));
        assert!(matches!(
            delete(&store, "bob", &task.id).await,
            Err(TickError::Forbidden)
        ));
        assert!(list(&store, "bob").await.unwrap().is_empty());

        let untouched = get(&store, "alice", &task.id).await.unwrap();
        assert_eq!(untouched.title, "private");
    }

    #[tokio::test]
    async fn test_update_fields() {
        let store = MemoryStore::new();
        let task = create(&store, "alice", "draft", Priority::Low).await.unwrap();

        let updated = update(
            &store,
            "alice",
            &task.id,
            TaskPatch {
                title: Some(" final ".into()),
                completed: None,
                priority: Some(Priority::High),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "final");
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.owner, "alice");
        assert!(updated.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_patch_and_title() {
        let store = MemoryStore::new();
        let task = create(&store, "alice", "x", Priority::Low).await.unwrap();

        assert!(matches!(
            update(&store, "alice", &task.id, TaskPatch::default()).await,
            Err(TickError::InvalidInput(_))
        ));
        assert!(matches!(
            update(
                &store,
                "alice",
                &task.id,
                TaskPatch {
                    title: Some("   ".into()),
                    ..Default::default()
                }
            )
            .await,
            Err(TickError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_mark_done_twice() {
        let store = MemoryStore::new();
        let task = create(&store, "alice", "twice", Priority::Low).await.unwrap();

        let first = mark_done(&store, "alice", &task.id).await.unwrap();
        let second = mark_done(&store, "alice", &task.id).await.unwrap();
        assert!(first.completed);
        assert!(second.completed);
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn test_buy_milk_scenario() {
        let store = MemoryStore::new();
        let task = create(&store, "alice", "Buy milk", Priority::Low)
            .await
            .unwrap();

        mark_done(&store, "alice", &task.id).await.unwrap();
        let tasks = list(&store, "alice").await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].completed);

        delete(&store, "alice", &task.id).await.unwrap();
        assert!(list(&store, "alice").await.unwrap().is_empty());
    }
}

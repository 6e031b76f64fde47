//! Local task list persisted as a single TOML file.
//!
//! The whole file is read on `open` and rewritten after every mutation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{load_toml, save_toml};
use crate::error::{Result, TickError};
use crate::model::{normalize_title, Priority};

/// Task record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Numeric id, never reused within one file
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Whether a status call actually changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Changed,
    AlreadySet,
}

/// On-disk layout (TOML)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TasksFile {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl TasksFile {
    /// Reject files that break the id invariants and repair a stale counter.
    fn validate(mut self, path: &Path) -> Result<Self> {
        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id) {
                return Err(TickError::storage(format!(
                    "{} is corrupt: duplicate task id {}",
                    path.display(),
                    task.id
                )));
            }
            if task.title.trim().is_empty() {
                return Err(TickError::storage(format!(
                    "{} is corrupt: task {} has an empty title",
                    path.display(),
                    task.id
                )));
            }
        }

        let max_id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        if self.next_id <= max_id {
            self.next_id = next_after(max_id)?;
        }
        Ok(self)
    }
}

/// The CLI's task collection, bound to one file.
#[derive(Debug)]
pub struct TaskList {
    path: PathBuf,
    file: TasksFile,
}

impl TaskList {
    /// Load the list. A missing file is an empty list; an unreadable or
    /// corrupt one is a storage error and is left untouched.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let file = if path.exists() {
            let raw: TasksFile = load_toml(&path).map_err(|e| {
                TickError::storage(format!("cannot read {}: {}", path.display(), e))
            })?;
            raw.validate(&path)?
        } else {
            TasksFile {
                next_id: 1,
                tasks: Vec::new(),
            }
        };

        tracing::debug!(path = %path.display(), count = file.tasks.len(), "loaded task list");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All tasks in insertion order.
    pub fn list(&self) -> &[Task] {
        &self.file.tasks
    }

    pub fn get(&self, id: u64) -> Result<&Task> {
        self.file
            .tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))
    }

    pub fn add(&mut self, title: &str, priority: Priority) -> Result<Task> {
        let title = normalize_title(title)?;

        self.mutate(|file| {
            let task = Task {
                id: file.next_id.max(1),
                title,
                completed: false,
                priority,
                created_at: Utc::now(),
                completed_at: None,
            };
            file.next_id = next_after(task.id)?;
            file.tasks.push(task.clone());
            Ok(task)
        })
    }

    /// Mark a task done. Completing a finished task is a no-op.
    pub fn complete(&mut self, id: u64) -> Result<(Task, StatusChange)> {
        let current = self.get(id)?;
        if current.completed {
            return Ok((current.clone(), StatusChange::AlreadySet));
        }

        let task = self.mutate(|file| {
            let task = find_mut(file, id)?;
            task.completed = true;
            task.completed_at = Some(Utc::now());
            Ok(task.clone())
        })?;
        Ok((task, StatusChange::Changed))
    }

    /// Mark a task pending again.
    pub fn reopen(&mut self, id: u64) -> Result<(Task, StatusChange)> {
        let current = self.get(id)?;
        if !current.completed {
            return Ok((current.clone(), StatusChange::AlreadySet));
        }

        let task = self.mutate(|file| {
            let task = find_mut(file, id)?;
            task.completed = false;
            task.completed_at = None;
            Ok(task.clone())
        })?;
        Ok((task, StatusChange::Changed))
    }

    pub fn rename(&mut self, id: u64, title: &str) -> Result<Task> {
        let title = normalize_title(title)?;
        self.get(id)?;

        self.mutate(|file| {
            let task = find_mut(file, id)?;
            task.title = title;
            Ok(task.clone())
        })
    }

    pub fn delete(&mut self, id: u64) -> Result<Task> {
        self.get(id)?;

        self.mutate(|file| {
            let idx = file
                .tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| not_found(id))?;
            Ok(file.tasks.remove(idx))
        })
    }

    /// Drop every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> Result<usize> {
        let count = self.file.tasks.iter().filter(|t| t.completed).count();
        if count == 0 {
            return Ok(0);
        }

        self.mutate(|file| {
            file.tasks.retain(|t| !t.completed);
            Ok(count)
        })
    }

    /// Run `f` against the in-memory file and persist. Any failure restores
    /// the previous state, so memory never runs ahead of disk.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut TasksFile) -> Result<T>) -> Result<T> {
        let before = self.file.clone();

        let out = match f(&mut self.file) {
            Ok(out) => out,
            Err(e) => {
                self.file = before;
                return Err(e);
            }
        };

        if let Err(e) = save_toml(&self.path, &self.file) {
            self.file = before;
            return Err(TickError::storage(format!(
                "cannot write {}: {}",
                self.path.display(),
                e
            )));
        }
        Ok(out)
    }
}

fn find_mut(file: &mut TasksFile, id: u64) -> Result<&mut Task> {
    file.tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| not_found(id))
}

fn next_after(id: u64) -> Result<u64> {
    id.checked_add(1)
        .ok_or_else(|| TickError::storage(format!("task id {} leaves no room for another id", id)))
}

fn not_found(id: u64) -> TickError {
    TickError::not_found(format!("no task with id {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_list() -> (tempfile::TempDir, TaskList) {
        let dir = tempfile::tempdir().unwrap();
        let list = TaskList::open(dir.path().join("tasks.toml")).unwrap();
        (dir, list)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, list) = temp_list();
        assert!(list.list().is_empty());
        assert!(!list.path().exists());
    }

    #[test]
    fn test_buy_milk_scenario() {
        let (_dir, mut list) = temp_list();

        let task = list.add("Buy milk", Priority::Low).unwrap();
        assert_eq!(list.list().len(), 1);
        assert_eq!(list.list()[0].title, "Buy milk");
        assert!(!list.list()[0].completed);

        list.complete(task.id).unwrap();
        assert_eq!(list.list().len(), 1);
        assert!(list.list()[0].completed);

        list.delete(task.id).unwrap();
        assert!(list.list().is_empty());
    }

    #[test]
    fn test_add_trims_and_rejects_empty() {
        let (_dir, mut list) = temp_list();
        let task = list.add("  Water plants  ", Priority::High).unwrap();
        assert_eq!(task.title, "Water plants");
        assert_eq!(task.priority, Priority::High);

        let err = list.add("   ", Priority::Low).unwrap_err();
        assert!(matches!(err, TickError::InvalidInput(_)));
        assert_eq!(list.list().len(), 1);
    }

    #[test]
    fn test_insertion_order() {
        let (_dir, mut list) = temp_list();
        list.add("first", Priority::Low).unwrap();
        list.add("second", Priority::High).unwrap();
        list.add("third", Priority::Medium).unwrap();

        let titles: Vec<_> = list.list().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_missing_id_is_not_found() {
        let (_dir, mut list) = temp_list();
        list.add("only", Priority::Low).unwrap();

        assert!(matches!(list.complete(42), Err(TickError::NotFound(_))));
        assert!(matches!(list.delete(42), Err(TickError::NotFound(_))));
        assert!(matches!(list.reopen(42), Err(TickError::NotFound(_))));
        assert!(matches!(list.rename(42, "x"), Err(TickError::NotFound(_))));
        assert_eq!(list.list().len(), 1);
    }

    #[test]
    fn test_complete_twice_is_noop() {
        let (_dir, mut list) = temp_list();
        let task = list.add("twice", Priority::Low).unwrap();

        let (first, change) = list.complete(task.id).unwrap();
        assert_eq!(change, StatusChange::Changed);
        assert!(first.completed);

        let (second, change) = list.complete(task.id).unwrap();
        assert_eq!(change, StatusChange::AlreadySet);
        assert!(second.completed);
        assert_eq!(first.completed_at, second.completed_at);
    }

    #[test]
    fn test_reopen() {
        let (_dir, mut list) = temp_list();
        let task = list.add("again", Priority::Low).unwrap();
        list.complete(task.id).unwrap();

        let (reopened, change) = list.reopen(task.id).unwrap();
        assert_eq!(change, StatusChange::Changed);
        assert!(!reopened.completed);
        assert!(reopened.completed_at.is_none());

        let (_, change) = list.reopen(task.id).unwrap();
        assert_eq!(change, StatusChange::AlreadySet);
    }

    #[test]
    fn test_rename() {
        let (_dir, mut list) = temp_list();
        let task = list.add("draft", Priority::Low).unwrap();
        let renamed = list.rename(task.id, "final").unwrap();
        assert_eq!(renamed.title, "final");
        assert!(matches!(
            list.rename(task.id, " "),
            Err(TickError::InvalidInput(_))
        ));
        assert_eq!(list.get(task.id).unwrap().title, "final");
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");

        let mut list = TaskList::open(&path).unwrap();
        let a = list.add("a", Priority::Low).unwrap();
        list.add("b", Priority::High).unwrap();
        list.complete(a.id).unwrap();
        let before = list.list().to_vec();
        drop(list);

        let reopened = TaskList::open(&path).unwrap();
        assert_eq!(reopened.list(), before.as_slice());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");

        let mut list = TaskList::open(&path).unwrap();
        list.add("one", Priority::Low).unwrap();
        let two = list.add("two", Priority::Low).unwrap();
        list.delete(two.id).unwrap();
        drop(list);

        let mut list = TaskList::open(&path).unwrap();
        let three = list.add("three", Priority::Low).unwrap();
        assert_eq!(three.id, 3);
    }

    #[test]
    fn test_clear_completed() {
        let (_dir, mut list) = temp_list();
        let a = list.add("a", Priority::Low).unwrap();
        list.add("b", Priority::Low).unwrap();
        let c = list.add("c", Priority::Low).unwrap();
        list.complete(a.id).unwrap();
        list.complete(c.id).unwrap();

        assert_eq!(list.clear_completed().unwrap(), 2);
        assert_eq!(list.list().len(), 1);
        assert_eq!(list.list()[0].title, "b");
        assert_eq!(list.clear_completed().unwrap(), 0);
    }

    #[test]
    fn test_corrupt_file_is_storage_error_and_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");
        std::fs::write(&path, "[[tasks]\nid = oops").unwrap();

        let err = TaskList::open(&path).unwrap_err();
        assert!(err.is_storage());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[[tasks]\nid = oops"
        );
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");
        std::fs::write(
            &path,
            r#"
next_id = 3

[[tasks]]
id = 1
title = "a"
created_at = "2026-01-01T00:00:00Z"

[[tasks]]
id = 1
title = "b"
created_at = "2026-01-01T00:00:00Z"
"#,
        )
        .unwrap();

        assert!(TaskList::open(&path).unwrap_err().is_storage());
    }

    #[test]
    fn test_stale_counter_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");
        std::fs::write(
            &path,
            r#"
[[tasks]]
id = 7
title = "hand edited"
created_at = "2026-01-01T00:00:00Z"
"#,
        )
        .unwrap();

        let mut list = TaskList::open(&path).unwrap();
        let task = list.add("next", Priority::Low).unwrap();
        assert_eq!(task.id, 8);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocker").join("tasks.toml");
        let mut list = TaskList::open(&path).unwrap();

        // A file where the parent directory should be makes every save fail.
        std::fs::write(dir.path().join("blocker"), "").unwrap();

        let err = list.add("doomed", Priority::Low).unwrap_err();
        assert!(err.is_storage());
        assert!(list.list().is_empty());
    }

    fn sample_task(id: u64) -> Task {
        Task {
            id,
            title: "edge".into(),
            completed: false,
            priority: Priority::Low,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_largest_id_is_storage_error() {
        let file = TasksFile {
            next_id: 0,
            tasks: vec![sample_task(u64::MAX)],
        };
        let err = file.validate(Path::new("tasks.toml")).unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_exhausted_counter_fails_add_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");
        let mut list = TaskList {
            path: path.clone(),
            file: TasksFile {
                next_id: u64::MAX,
                tasks: Vec::new(),
            },
        };

        let err = list.add("one too many", Priority::Low).unwrap_err();
        assert!(err.is_storage());
        assert!(list.list().is_empty());
        assert_eq!(list.file.next_id, u64::MAX);
        assert!(!path.exists());
    }
}

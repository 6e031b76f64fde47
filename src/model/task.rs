//! Web-side task records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Priority;

/// A task held in the external document store. Owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebTask {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WebTask {
    /// Build a fresh, pending task. The store assigns `id`.
    pub fn new(id: String, owner: &str, new: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner: owner.to_string(),
            title: new.title,
            completed: false,
            priority: new.priority,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch. `owner` is not patchable.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.updated_at = Utc::now();
    }
}

/// Fields for a task about to be created. `title` is already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub priority: Priority,
}

/// Partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none() && self.priority.is_none()
    }
}

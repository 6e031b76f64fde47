use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::TaskStore;
use crate::error::{Result, TickError};
use crate::model::{NewTask, WebTask};

/// In-memory task store.
#[derive(Default)]
pub struct MemoryStore {
    tasks: RwLock<HashMap<String, WebTask>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> TickError {
    TickError::storage("memory store lock poisoned")
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, owner: &str, new: NewTask) -> Result<WebTask> {
        let task = WebTask::new(Uuid::new_v4().to_string(), owner, new);
        self.tasks
            .write()
            .map_err(|_| poisoned())?
            .insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<WebTask>> {
        let tasks = self.tasks.read().map_err(|_| poisoned())?;
        Ok(tasks
            .values()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<WebTask>> {
        Ok(self.tasks.read().map_err(|_| poisoned())?.get(id).cloned())
    }

    async fn put(&self, task: &WebTask) -> Result<()> {
        let mut tasks = self.tasks.write().map_err(|_| poisoned())?;
        match tasks.get_mut(&task.id) {
            Some(slot) => {
                *slot = task.clone();
                Ok(())
            }
            None => Err(TickError::not_found(format!("task {}", task.id))),
        }
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self
            .tasks
            .write()
            .map_err(|_| poisoned())?
            .remove(id)
            .is_some())
    }
}

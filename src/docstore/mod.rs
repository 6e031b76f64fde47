//! # Document store
//!
//! Web tasks live in an external document database. [`TaskStore`] is the
//! narrow surface the service needs; ownership rules are enforced above it in
//! `operations::tasks`, never here.
//!
//! - [`firestore::FirestoreStore`]: Firestore REST v1
//! - [`memory::MemoryStore`]: process-local map (dev, tests)

pub mod firestore;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, TickError};
use crate::model::{NewTask, WebTask};
use crate::storage::config::{StoreConfig, StoreKind, DEFAULT_FIRESTORE_URL};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create a task for `owner`; the store assigns the id.
    async fn insert(&self, owner: &str, new: NewTask) -> Result<WebTask>;

    /// Every task whose owner is `owner`.
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<WebTask>>;

    async fn get(&self, id: &str) -> Result<Option<WebTask>>;

    /// Overwrite an existing task.
    async fn put(&self, task: &WebTask) -> Result<()>;

    /// Returns false if nothing was there.
    async fn remove(&self, id: &str) -> Result<bool>;
}

/// Build the store selected in config.
pub fn from_config(config: &StoreConfig) -> Result<Arc<dyn TaskStore>> {
    match config.kind {
        StoreKind::Memory => {
            tracing::warn!("using in-memory task store; tasks are lost on restart");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
        StoreKind::Firestore => {
            let project_id = config.project_id.clone().ok_or_else(|| {
                TickError::config("firestore store needs web.store.project_id (or TICKD_PROJECT_ID)")
            })?;
            let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_FIRESTORE_URL);
            let store = firestore::FirestoreStore::new(
                base_url,
                &project_id,
                &config.app_id,
                config.access_token.clone(),
            )?;
            Ok(Arc::new(store))
        }
    }
}

//! Shared state for the Web API server.

use std::sync::Arc;

use crate::docstore::{self, TaskStore};
use crate::error::Result;
use crate::identity::{self, TokenVerifier};
use crate::storage::config::WebConfig;

/// Handles to the two external collaborators. Cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { store, verifier }
    }

    /// Build state from config. Fails before the server binds if either
    /// collaborator is misconfigured.
    pub fn from_config(config: &WebConfig) -> Result<Self> {
        let store = docstore::from_config(&config.store)?;
        let verifier = identity::from_config(&config.verifier)?;
        Ok(Self::new(store, verifier))
    }
}

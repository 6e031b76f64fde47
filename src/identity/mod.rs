//! Credential verification
//!
//! The web API never inspects tokens itself. It hands the bearer string to a
//! [`TokenVerifier`] and trusts the uid that comes back.
//!
//! - [`http::HttpVerifier`]: identity-toolkit `accounts:lookup` over HTTPS
//! - [`fixed::StaticVerifier`]: token -> uid table from config (dev, tests)

pub mod fixed;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, TickError};
use crate::storage::config::{VerifierConfig, VerifierKind, DEFAULT_VERIFIER_ENDPOINT};

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// Resolves a bearer credential to an identity.
///
/// Rejections are `TickError::Unauthorized`; failures to reach the provider
/// are `TickError::Upstream`.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity>;
}

/// Build the verifier selected in config.
pub fn from_config(config: &VerifierConfig) -> Result<Arc<dyn TokenVerifier>> {
    match config.kind {
        VerifierKind::Http => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                TickError::config("http verifier needs web.verifier.api_key (or TICKD_API_KEY)")
            })?;
            let endpoint = config
                .endpoint
                .as_deref()
                .unwrap_or(DEFAULT_VERIFIER_ENDPOINT);
            Ok(Arc::new(http::HttpVerifier::new(endpoint, api_key)?))
        }
        VerifierKind::Static => {
            if config.tokens.is_empty() {
                tracing::warn!("static verifier has no tokens; every request will be rejected");
            }
            Ok(Arc::new(fixed::StaticVerifier::new(config.tokens.clone())))
        }
    }
}

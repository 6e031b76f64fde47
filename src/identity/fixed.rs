use std::collections::HashMap;

use async_trait::async_trait;

use super::{Identity, TokenVerifier};
use crate::error::{Result, TickError};

/// Verifier backed by a fixed token table.
pub struct StaticVerifier {
    tokens: HashMap<String, String>,
}

impl StaticVerifier {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    #[cfg(test)]
    pub fn with_token(mut self, token: impl Into<String>, uid: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), uid.into());
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Identity> {
        self.tokens
            .get(token)
            .map(Identity::new)
            .ok_or_else(|| TickError::unauthorized("token is invalid or expired"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_tokens() {
        let verifier = StaticVerifier::new(HashMap::new()).with_token("abc", "alice");

        assert_eq!(verifier.verify("abc").await.unwrap().uid, "alice");
        assert!(matches!(
            verifier.verify("nope").await,
            Err(TickError::Unauthorized(_))
        ));
    }
}

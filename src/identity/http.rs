//! Identity-toolkit verifier
//!
//! `POST {endpoint}/v1/accounts:lookup?key={api_key}` with `{"idToken": ...}`.
//! The provider answers 200 with the account record for a live token and 400
//! (`INVALID_ID_TOKEN`, `TOKEN_EXPIRED`, ...) otherwise.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Identity, TokenVerifier};
use crate::error::{Result, TickError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
}

#[derive(Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
}

pub struct HttpVerifier {
    client: reqwest::Client,
    lookup_url: Url,
    api_key: String,
}

impl HttpVerifier {
    pub fn new(endpoint: &str, api_key: String) -> Result<Self> {
        let raw = format!("{}/v1/accounts:lookup", endpoint.trim_end_matches('/'));
        let lookup_url = Url::parse(&raw)
            .map_err(|e| TickError::config(format!("invalid verifier endpoint '{}': {}", endpoint, e)))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TickError::config(format!("cannot build http client: {}", e)))?;

        Ok(Self {
            client,
            lookup_url,
            api_key,
        })
    }
}

#[async_trait]
impl TokenVerifier for HttpVerifier {
    async fn verify(&self, token: &str) -> Result<Identity> {
        let response = self
            .client
            .post(self.lookup_url.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token: token })
            .send()
            .await?;

        let status = response.status();
        match status {
            s if s.is_success() => {
                let body: LookupResponse = response.json().await?;
                body.users
                    .into_iter()
                    .next()
                    .map(|u| Identity::new(u.local_id))
                    .ok_or_else(|| TickError::unauthorized("token does not belong to any account"))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let reason = response
                    .json::<ProviderError>()
                    .await
                    .map(|e| e.error.message)
                    .unwrap_or_default();
                tracing::debug!(%status, %reason, "token rejected by provider");
                Err(TickError::unauthorized("token is invalid or expired"))
            }
            other => Err(TickError::upstream(format!(
                "identity provider returned {}",
                other
            ))),
        }
    }
}

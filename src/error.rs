//! Unified error type for tickd
//!
//! Built on `thiserror`. The CLI prints these and exits non-zero; the web API
//! turns them into status codes through `IntoResponse`.

use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// tickd error type
#[derive(Debug, Error)]
pub enum TickError {
    /// I/O error (reading or writing the task file, config dir)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML parse error (corrupt task file)
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Target does not exist in the caller's scope
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, malformed or rejected credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid identity, wrong owner. Carries no detail about the target.
    #[error("Forbidden")]
    Forbidden,

    /// Rejected user input (empty title, empty patch)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// External verifier or document store failed
    #[error("Upstream error: {0}")]
    Upstream(String),
}

/// tickd Result alias
pub type Result<T> = std::result::Result<T, TickError>;

impl TickError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// True for every flavour of local persistence failure.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::TomlParse(_)
                | Self::TomlSerialize(_)
                | Self::Json(_)
                | Self::Storage(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Io(_)
            | Self::TomlParse(_)
            | Self::TomlSerialize(_)
            | Self::Json(_)
            | Self::Storage(_)
            | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for TickError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

/// JSON error body returned by the web API
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for TickError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            // Internals stay in the log.
            match self {
                Self::Upstream(_) => "Upstream service unavailable".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

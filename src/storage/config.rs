//! Application config persistence (~/.tickd/config.toml)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::tickd_dir;

/// Default port; Cloud Run style `PORT` overrides it.
pub const DEFAULT_PORT: u16 = 8080;

/// Default identity-toolkit endpoint used by the http verifier.
pub const DEFAULT_VERIFIER_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

/// Default Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";

/// Application config
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub cli: CliConfig,
    #[serde(default)]
    pub web: WebConfig,
}

/// CLI config
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Task file (default ~/.tickd/tasks.toml)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Web service config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// Directory with a browser front end (index.html) served at `/`
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            verifier: VerifierConfig::default(),
            store: StoreConfig::default(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerifierKind {
    #[default]
    Http,
    Static,
}

/// Credential verifier config
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifierConfig {
    #[serde(default)]
    pub kind: VerifierKind,
    /// Web API key for the http verifier
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override for the identity-toolkit endpoint (emulator)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// token -> uid, static verifier only
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Firestore,
    Memory,
}

/// Document store config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// Override for the Firestore endpoint (emulator)
    #[serde(default)]
    pub base_url: Option<String>,
    /// OAuth bearer attached to Firestore calls
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_app_id() -> String {
    "default-app-id".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            project_id: None,
            app_id: default_app_id(),
            base_url: None,
            access_token: None,
        }
    }
}

/// Config file path
pub fn config_path() -> PathBuf {
    tickd_dir().join("config.toml")
}

/// Default task file path
pub fn default_tasks_path() -> PathBuf {
    tickd_dir().join("tasks.toml")
}

/// Load config (defaults if the file is missing or unreadable), then apply
/// environment overrides.
pub fn load_config() -> Config {
    let mut config = load_config_from(&config_path());
    apply_env(&mut config, |key| std::env::var(key).ok());
    config
}

/// Load config from an explicit path without environment overrides.
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match super::load_toml(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config, using defaults");
            Config::default()
        }
    }
}

/// Apply `TICKD_*` and `PORT` overrides through the given lookup.
pub fn apply_env(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(file) = var("TICKD_FILE").filter(|v| !v.is_empty()) {
        config.cli.file = Some(PathBuf::from(file));
    }
    if let Some(port) = var("PORT") {
        match port.parse() {
            Ok(p) => config.web.port = p,
            Err(e) => tracing::warn!(value = %port, error = %e, "invalid PORT, keeping configured port"),
        }
    }
    if let Some(key) = var("TICKD_API_KEY").filter(|v| !v.is_empty()) {
        config.web.verifier.api_key = Some(key);
    }
    if let Some(project) = var("TICKD_PROJECT_ID").filter(|v| !v.is_empty()) {
        config.web.store.project_id = Some(project);
    }
    if let Some(token) = var("TICKD_FIRESTORE_TOKEN").filter(|v| !v.is_empty()) {
        config.web.store.access_token = Some(token);
    }
    if let Some(dir) = var("TICKD_STATIC_DIR").filter(|v| !v.is_empty()) {
        config.web.static_dir = Some(PathBuf::from(dir));
    }
}

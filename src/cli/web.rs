//! Web server CLI command

use crate::api::{self, state::AppState};
use crate::error::Result;
use crate::storage::config::WebConfig;

/// Port precedence: `--port`, then PORT / config (already folded into `web`).
pub fn resolve_port(flag: Option<u16>, web: &WebConfig) -> u16 {
    flag.unwrap_or(web.port)
}

/// Build the store and verifier from config, then serve until shutdown.
pub async fn execute(port: Option<u16>, web: &WebConfig) -> Result<()> {
    let state = AppState::from_config(web)?;
    let port = resolve_port(port, web);
    api::start_server(port, state, web.static_dir.as_deref()).await?;
    Ok(())
}

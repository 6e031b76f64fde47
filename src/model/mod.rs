pub mod priority;
pub mod task;

pub use priority::Priority;
pub use task::{NewTask, TaskPatch, WebTask};

use crate::error::{Result, TickError};

/// Trim a title and reject it if nothing is left.
pub fn normalize_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TickError::invalid_input("task title cannot be empty"));
    }
    Ok(title.to_string())
}

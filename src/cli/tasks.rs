//! Local task commands (add / list / done / undo / rename / delete / clear)

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Result, TickError};
use crate::storage::tasks::{StatusChange, Task, TaskList};

use super::Commands;

/// Which tasks `list` shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Pending,
    Done,
}

impl ListFilter {
    pub fn from_flags(pending: bool, done: bool) -> Self {
        match (pending, done) {
            (true, _) => ListFilter::Pending,
            (_, true) => ListFilter::Done,
            _ => ListFilter::All,
        }
    }

    fn keeps(self, task: &Task) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Pending => !task.completed,
            ListFilter::Done => task.completed,
        }
    }
}

/// Run one local command against the task file at `path` and return what
/// should be printed.
pub fn execute(path: &Path, command: Commands) -> Result<String> {
    let mut list = TaskList::open(path)?;

    let output = match command {
        Commands::Add { title, priority } => {
            let task = list.add(&title.join(" "), priority)?;
            format!("Added task {}: {}", task.id, task.title)
        }
        Commands::List { pending, done } => {
            render_list(list.list(), ListFilter::from_flags(pending, done))
        }
        Commands::Done { id } => match list.complete(id)? {
            (task, StatusChange::Changed) => format!("Task {} marked as done: {}", task.id, task.title),
            (task, StatusChange::AlreadySet) => format!("Task {} is already done.", task.id),
        },
        Commands::Undo { id } => match list.reopen(id)? {
            (task, StatusChange::Changed) => format!("Task {} is pending again: {}", task.id, task.title),
            (task, StatusChange::AlreadySet) => format!("Task {} is not done yet.", task.id),
        },
        Commands::Rename { id, title } => {
            let task = list.rename(id, &title.join(" "))?;
            format!("Renamed task {}: {}", task.id, task.title)
        }
        Commands::Delete { id } => {
            let task = list.delete(id)?;
            format!("Deleted task {}: {}", task.id, task.title)
        }
        Commands::Clear => match list.clear_completed()? {
            0 => "No finished tasks to clear.".to_string(),
            1 => "Cleared 1 finished task.".to_string(),
            n => format!("Cleared {} finished tasks.", n),
        },
        Commands::Serve { .. } => {
            return Err(TickError::invalid_input("serve is not a task command"));
        }
    };

    tracing::debug!(path = %list.path().display(), "command finished");
    Ok(output)
}

/// Render tasks one per line: `  3. [x] Title  (HIGH)`.
pub fn render_list(tasks: &[Task], filter: ListFilter) -> String {
    let shown: Vec<&Task> = tasks.iter().filter(|t| filter.keeps(t)).collect();

    if shown.is_empty() {
        return match filter {
            ListFilter::All => "No tasks yet. Add one with `tickd add <title>`.".to_string(),
            ListFilter::Pending => "Nothing left to do.".to_string(),
            ListFilter::Done => "No finished tasks.".to_string(),
        };
    }

    let id_width = shown
        .iter()
        .map(|t| t.id.to_string().len())
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    for task in &shown {
        let mark = if task.completed { "x" } else { " " };
        let _ = write!(
            out,
            "{:>width$}. [{}] {}",
            task.id,
            mark,
            task.title,
            width = id_width
        );
        let _ = writeln!(out, "  ({})", task.priority);
    }

    let pending = tasks.iter().filter(|t| !t.completed).count();
    let _ = write!(out, "\n{} of {} pending", pending, tasks.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    fn add(path: &Path, title: &str) -> String {
        execute(
            path,
            Commands::Add {
                title: title.split(' ').map(String::from).collect(),
                priority: Priority::Low,
            },
        )
        .unwrap()
    }

    fn list_all(path: &Path) -> String {
        execute(
            path,
            Commands::List {
                pending: false,
                done: false,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_scenario_through_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");

        assert_eq!(add(&path, "Buy milk"), "Added task 1: Buy milk");
        assert!(list_all(&path).contains("1. [ ] Buy milk"));

        let out = execute(&path, Commands::Done { id: 1 }).unwrap();
        assert_eq!(out, "Task 1 marked as done: Buy milk");
        assert!(list_all(&path).contains("1. [x] Buy milk"));

        let out = execute(&path, Commands::Done { id: 1 }).unwrap();
        assert_eq!(out, "Task 1 is already done.");

        execute(&path, Commands::Delete { id: 1 }).unwrap();
        assert!(list_all(&path).starts_with("No tasks yet"));
    }

    #[test]
    fn test_missing_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");
        add(&path, "only");

        let err = execute(&path, Commands::Delete { id: 9 }).unwrap_err();
        assert!(matches!(err, TickError::NotFound(_)));
        let err = execute(&path, Commands::Done { id: 9 }).unwrap_err();
        assert!(matches!(err, TickError::NotFound(_)));
    }

    #[test]
    fn test_corrupt_file_fails_every_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        assert!(execute(&path, Commands::List { pending: false, done: false })
            .unwrap_err()
            .is_storage());
        let err = execute(
            &path,
            Commands::Add {
                title: vec!["x".into()],
                priority: Priority::Low,
            },
        )
        .unwrap_err();
        assert!(err.is_storage());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not = [valid");
    }

    #[test]
    fn test_render_filters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");
        add(&path, "one");
        add(&path, "two");
        execute(&path, Commands::Done { id: 2 }).unwrap();

        let pending = execute(&path, Commands::List { pending: true, done: false }).unwrap();
        assert!(pending.contains("one"));
        assert!(!pending.contains("two"));
        assert!(pending.ends_with("1 of 2 pending"));

        let done = execute(&path, Commands::List { pending: false, done: true }).unwrap();
        assert!(done.contains("2. [x] two  (LOW)"));
        assert!(!done.contains("one"));
    }

    #[test]
    fn test_rename_undo_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");
        add(&path, "draft");

        let out = execute(
            &path,
            Commands::Rename {
                id: 1,
                title: vec!["final".into(), "copy".into()],
            },
        )
        .unwrap();
        assert_eq!(out, "Renamed task 1: final copy");

        assert_eq!(
            execute(&path, Commands::Undo { id: 1 }).unwrap(),
            "Task 1 is not done yet."
        );
        execute(&path, Commands::Done { id: 1 }).unwrap();
        assert_eq!(
            execute(&path, Commands::Clear).unwrap(),
            "Cleared 1 finished task."
        );
        assert_eq!(
            execute(&path, Commands::Clear).unwrap(),
            "No finished tasks to clear."
        );
    }
}

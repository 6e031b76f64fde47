//! CLI module

pub mod tasks;
pub mod web;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::model::Priority;

#[derive(Parser)]
#[command(name = "tickd")]
#[command(version)]
#[command(about = "File-backed to-do list, plus a multi-user task API")]
pub struct Cli {
    /// Task file to use (overrides config and TICKD_FILE)
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task title (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        /// low, medium or high
        #[arg(short, long, default_value = "low")]
        priority: Priority,
    },
    /// List tasks in the order they were added
    #[command(alias = "ls")]
    List {
        /// Only tasks still to do
        #[arg(long, conflicts_with = "done")]
        pending: bool,
        /// Only finished tasks
        #[arg(long)]
        done: bool,
    },
    /// Mark a task as done
    #[command(alias = "complete")]
    Done { id: u64 },
    /// Mark a finished task as pending again
    Undo { id: u64 },
    /// Change a task's title
    #[command(alias = "edit")]
    Rename {
        id: u64,
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Delete a task
    #[command(alias = "rm")]
    Delete { id: u64 },
    /// Remove every finished task
    Clear,
    /// Start the task API server
    Serve {
        /// Port to listen on (defaults to PORT, then config, then 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Commands {
    /// Commands that talk to the web stack rather than the local file
    pub fn is_server(&self) -> bool {
        matches!(self, Commands::Serve { .. })
    }
}

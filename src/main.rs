mod api;
mod cli;
mod docstore;
mod error;
mod identity;
mod model;
mod operations;
mod storage;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::{Result, TickError};
use storage::config::Config;

/// Server runs log requests by default; local commands stay quiet.
fn init_tracing(server: bool) {
    let default = if server { "tickd=info" } else { "tickd=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `--file`, then config / TICKD_FILE, then ~/.tickd/tasks.toml
fn resolve_task_file(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.or_else(|| config.cli.file.clone())
        .unwrap_or_else(storage::config::default_tasks_path)
}

fn run(cli: Cli) -> Result<()> {
    let config = storage::config::load_config();
    let command = cli.command.unwrap_or(Commands::List {
        pending: false,
        done: false,
    });

    match command {
        Commands::Serve { port } => {
            let runtime = tokio::runtime::Runtime::new()
                .map_err(|e| TickError::config(format!("failed to start tokio runtime: {}", e)))?;
            runtime.block_on(cli::web::execute(port, &config.web))
        }
        command => {
            let path = resolve_task_file(cli.file, &config);
            let output = cli::tasks::execute(&path, command)?;
            println!("{}", output);
            Ok(())
        }
    }
}

/// What the user sees on stderr for a failed command.
fn error_report(e: &TickError, server: bool) -> String {
    let mut report = format!("Error: {}\n", e);
    if !server && e.is_storage() {
        report.push_str("The task file was not modified.\n");
    }
    report
}

fn main() {
    let cli = Cli::parse();
    let server = cli.command.as_ref().is_some_and(Commands::is_server);
    init_tracing(server);

    if let Err(e) = run(cli) {
        eprint!("{}", error_report(&e, server));
        std::process::exit(1);
    }
}

//! Server entry point for taskwheel.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use taskwheel_app::{AsyncTaskService, TaskService};
use taskwheel_store_sqlite::SqliteStore;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod server;

use config::ServerConfig;
use server::AppState;

/// Todo scheduler with repeat rules, served over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "taskwheel",
    version,
    about = "taskwheel: todo scheduler with repeat rules"
)]
struct Cli {
    /// Port to listen on (falls back to TASKWHEEL_PORT, then 7540).
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file (falls back to TASKWHEEL_DBFILE, then scheduler.db).
    #[arg(long)]
    db_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    install_tracing();

    let Cli { port, db_file } = Cli::parse();
    let config = ServerConfig::load(port, db_file)?;

    let store = SqliteStore::open(&config.db_file)
        .with_context(|| format!("failed to open database {}", config.db_file.display()))?;
    let state = AppState::new(AsyncTaskService::new(TaskService::new(store)));

    tokio::runtime::Runtime::new()?.block_on(server::serve(state, config.port))
}

fn install_tracing() {
    // EnvFilter honors RUST_LOG; default is INFO.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from([
            "taskwheel",
            "--port",
            "8080",
            "--db-file",
            "/tmp/tasks.db",
        ]);
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.db_file, Some(PathBuf::from("/tmp/tasks.db")));
    }

    #[test]
    fn flags_are_optional() {
        let cli = Cli::parse_from(["taskwheel"]);
        assert_eq!(cli.port, None);
        assert_eq!(cli.db_file, None);
    }
}

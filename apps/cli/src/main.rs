//! # Tally Command-Line Entry Point
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          tally (this crate)                             │
//! │                                                                         │
//! │  main.rs ─────► logging, config, database, dispatch                     │
//! │  cli.rs ──────► clap command tree                                       │
//! │  context.rs ──► AppContext: db, config, project and period selection    │
//! │  commands/ ───► project, sale, report, export, version, autosave, clear │
//! │  output.rs ───► terminal tables                                         │
//! │                                                                         │
//! │         │                 │                  │                 │        │
//! │         ▼                 ▼                  ▼                 ▼        │
//! │    tally-core         tally-db         tally-backup      tally-export   │
//! │    (rules, totals)    (SQLite)         (config, auto-save) (xlsx, pdf)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging to stderr)
//! 2. Load `tally.toml` and `TALLY_*` overrides
//! 3. Connect to the database and run migrations
//! 4. Run the command and print its output

mod cli;
mod commands;
mod context;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::context::AppContext;
use crate::error::CliResult;
use tally_backup::TallyConfig;
use tally_db::{Database, DbConfig};

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output.trim_end());
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(e.code.exit_code());
        }
    }
}

/// Initializes tracing.
///
/// Logs go to stderr so command output stays pipeable. `RUST_LOG`
/// overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> CliResult<String> {
    let mut config = TallyConfig::load_or_default(cli.config);
    if let Some(path) = cli.db {
        config.database.path = Some(path);
    }

    let path = config.database_path();
    debug!(path = %path.display(), "Using database");
    let db = Arc::new(Database::new(DbConfig::new(path)).await?);

    let ctx = AppContext::new(db.clone(), config, cli.project);
    let result = commands::dispatch(&ctx, cli.command).await;

    db.close().await;
    result
}

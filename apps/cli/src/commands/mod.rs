//! # Commands
//!
//! One module per subcommand group. Every command takes the shared
//! [`AppContext`] and returns the text to print.
//!
//! ```text
//! commands/
//! ├── mod.rs      ◄─── dispatch
//! ├── project.rs  ◄─── projects and tier tables
//! ├── sale.rs     ◄─── entry recording and maintenance
//! ├── report.rs   ◄─── period totals and saved reports
//! ├── export.rs   ◄─── XLSX / PDF files
//! ├── version.rs  ◄─── version history
//! ├── autosave.rs ◄─── foreground auto-save loop
//! └── clear.rs    ◄─── start over
//! ```

pub mod autosave;
pub mod clear;
pub mod export;
pub mod project;
pub mod report;
pub mod sale;
pub mod version;

use crate::cli::Command;
use crate::context::AppContext;
use crate::error::CliResult;

pub async fn dispatch(ctx: &AppContext, command: Command) -> CliResult<String> {
    match command {
        Command::Project(cmd) => project::run(ctx, cmd).await,
        Command::Sale(cmd) => sale::run(ctx, cmd).await,
        Command::Report(cmd) => report::run(ctx, cmd).await,
        Command::Export(args) => export::run(ctx, args).await,
        Command::Version(cmd) => version::run(ctx, cmd).await,
        Command::Autosave => autosave::run(ctx).await,
        Command::Clear { yes } => clear::run(ctx, yes).await,
    }
}

//! # Command Line
//!
//! clap derive definitions for every `tally` subcommand.
//!
//! ## Command Tree
//! ```text
//! tally [--config FILE] [--db FILE] [--project ID]
//! ├── project   show | list | new | rename | levels | set-level
//! ├── sale      add | no-sale | edit | list | cancel | note | delete
//! ├── report    show | save | list
//! ├── export    --format xlsx|pdf
//! ├── version   list | save | restore
//! ├── autosave
//! └── clear     --yes
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use tally_core::{ManagerName, Money, Points, RangeKind, Rate, SaleType};
use tally_export::ExportFormat;

#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Sales commission and metrics tracker")]
pub struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configured one.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Project to work on (defaults to the current project).
    #[arg(long, global = true)]
    pub project: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage projects and their commission tiers
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Record and maintain sales
    #[command(subcommand)]
    Sale(SaleCommand),

    /// Period reports
    #[command(subcommand)]
    Report(ReportCommand),

    /// Write a period report to XLSX or PDF
    Export(ExportArgs),

    /// Version history
    #[command(subcommand)]
    Version(VersionCommand),

    /// Run auto-save in the foreground until Ctrl-C
    Autosave,

    /// Delete all data and start over with a fresh project
    Clear {
        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },
}

// =============================================================================
// Period Selection
// =============================================================================

#[derive(Debug, Clone, Default, Args)]
pub struct PeriodArgs {
    /// Range kind: monthly, annual, 45day or 90day.
    #[arg(long)]
    pub range: Option<RangeKind>,

    /// Month number for a monthly report.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Year for monthly and annual reports (defaults to the current year).
    #[arg(long)]
    pub year: Option<i32>,

    /// First day of a rolling window (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,
}

impl PeriodArgs {
    /// True when any selection flag was given.
    pub fn is_explicit(&self) -> bool {
        self.range.is_some() || self.month.is_some() || self.year.is_some() || self.start.is_some()
    }
}

// =============================================================================
// Projects
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Show the project with its sale count and tier table
    Show,
    /// List all projects
    List,
    /// Create a project with the default tier table
    New { name: String },
    /// Copy the project, its tier table and all of its entries under a new name
    SaveAs { name: String },
    /// Rename the project
    Rename { name: String },
    /// Show the commission tier table
    Levels,
    /// Change one tier of the table
    SetLevel(SetLevelArgs),
}

#[derive(Debug, Args)]
pub struct SetLevelArgs {
    /// Level number to change.
    pub level: u32,

    /// Inclusive lower volume bound.
    #[arg(long)]
    pub min: Option<Money>,

    /// Inclusive upper volume bound.
    #[arg(long)]
    pub max: Option<Money>,

    /// Additional rate, e.g. 3.5 or 3.5%.
    #[arg(long)]
    pub rate: Option<Rate>,
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// Record a sale
    Add(AddSaleArgs),
    /// Record a tour that did not close
    NoSale(NoSaleArgs),
    /// Change fields of a recorded entry
    Edit(EditSaleArgs),
    /// List entries in a period
    List(PeriodArgs),
    /// Toggle the cancelled flag
    Cancel { id: String },
    /// Replace the notes of an entry
    Note { id: String, text: String },
    /// Delete an entry
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct AddSaleArgs {
    /// Client last name.
    #[arg(long)]
    pub client: String,

    /// Sale amount, e.g. 30000 or 30,000.00.
    #[arg(long)]
    pub amount: Money,

    /// DEED or TRUST.
    #[arg(long = "type", default_value = "DEED")]
    pub sale_type: SaleType,

    #[arg(long, default_value = "")]
    pub manager: ManagerName,

    /// Date of the tour (defaults to today).
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long, default_value_t = 1)]
    pub tours: u32,

    #[arg(long, default_value = "")]
    pub lead: String,

    /// FDI points granted to the client.
    #[arg(long, default_value = "0")]
    pub fdi_given: Points,

    #[arg(long, default_value = "0")]
    pub existing_trust: Points,

    #[arg(long, default_value = "0")]
    pub new_trust: Points,

    #[arg(long, default_value = "")]
    pub notes: String,

    /// Record the sale as already cancelled.
    #[arg(long)]
    pub cancelled: bool,
}

#[derive(Debug, Args)]
pub struct NoSaleArgs {
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long, default_value_t = 1)]
    pub tours: u32,

    #[arg(long, default_value = "")]
    pub lead: String,

    #[arg(long, default_value = "")]
    pub notes: String,
}

/// Every field is optional; omitted ones keep their stored value.
#[derive(Debug, Default, Args)]
pub struct EditSaleArgs {
    pub id: String,

    #[arg(long)]
    pub client: Option<String>,

    #[arg(long)]
    pub amount: Option<Money>,

    #[arg(long = "type")]
    pub sale_type: Option<SaleType>,

    #[arg(long)]
    pub manager: Option<ManagerName>,

    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub tours: Option<u32>,

    #[arg(long)]
    pub lead: Option<String>,

    #[arg(long)]
    pub fdi_given: Option<Points>,

    #[arg(long)]
    pub existing_trust: Option<Points>,

    #[arg(long)]
    pub new_trust: Option<Points>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Turn the entry into a no-sale.
    #[arg(long, conflicts_with_all = ["client", "amount", "sale_type", "manager"])]
    pub no_sale: bool,
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Print the totals of a period
    Show {
        #[command(flatten)]
        period: PeriodArgs,

        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Store the period report under a name
    Save {
        name: String,

        #[command(flatten)]
        period: PeriodArgs,
    },
    /// List saved reports, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(long)]
    pub format: ExportFormat,

    #[command(flatten)]
    pub period: PeriodArgs,

    /// Output file (defaults to a name derived from the period title).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Add a notes column to the PDF listing.
    #[arg(long)]
    pub notes: bool,
}

// =============================================================================
// Versions
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum VersionCommand {
    /// List stored versions, newest first
    List,
    /// Snapshot the project now
    Save,
    /// Restore the project to a stored version
    Restore { version: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sale_add() {
        let cli = Cli::parse_from([
            "tally", "sale", "add", "--client", "Smith", "--amount", "30,000", "--type", "trust",
            "--manager", "lisa", "--tours", "2", "--date", "2025-03-01",
        ]);

        match cli.command {
            Command::Sale(SaleCommand::Add(args)) => {
                assert_eq!(args.client, "Smith");
                assert_eq!(args.amount, Money::from_dollars(30_000));
                assert_eq!(args.sale_type, SaleType::Trust);
                assert_eq!(args.manager, ManagerName::Lisa);
                assert_eq!(args.tours, 2);
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 3, 1));
                assert_eq!(args.fdi_given, Points::zero());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_period_flags() {
        let cli = Cli::parse_from(["tally", "report", "show", "--range", "45day", "--start", "2025-03-01"]);
        match cli.command {
            Command::Report(ReportCommand::Show { period, json }) => {
                assert_eq!(period.range, Some(RangeKind::Rolling45));
                assert!(period.is_explicit());
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_month_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["tally", "sale", "list", "--month", "13"]).is_err());
    }

    #[test]
    fn test_export_format() {
        let cli = Cli::parse_from(["tally", "export", "--format", "pdf", "--month", "3"]);
        match cli.command {
            Command::Export(args) => {
                assert_eq!(args.format, ExportFormat::Pdf);
                assert_eq!(args.period.month, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

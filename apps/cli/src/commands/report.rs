//! Period reports and saved reports.

use chrono::Utc;
use tracing::info;

use crate::cli::{PeriodArgs, ReportCommand};
use crate::context::AppContext;
use crate::error::CliResult;
use crate::output;
use tally_core::validation::validate_name;
use tally_db::SavedReport;

pub async fn run(ctx: &AppContext, command: ReportCommand) -> CliResult<String> {
    match command {
        ReportCommand::Show { period, json } => show(ctx, &period, json).await,
        ReportCommand::Save { name, period } => save(ctx, &name, &period).await,
        ReportCommand::List { limit } => list(ctx, limit).await,
    }
}

async fn show(ctx: &AppContext, args: &PeriodArgs, json: bool) -> CliResult<String> {
    let project = ctx.project().await?;
    let period = ctx.select_period(args).await?;
    let summary = ctx.summary(&project, &period).await?;

    if json {
        return Ok(serde_json::to_string_pretty(&summary)?);
    }

    Ok(format!(
        "{} - {}\n{} to {}\n\n{}",
        project.name,
        period.title,
        period.start.format("%m/%d/%Y"),
        period.end.format("%m/%d/%Y"),
        output::totals_block(&summary.totals, summary.current_level.as_ref())
    ))
}

async fn save(ctx: &AppContext, name: &str, args: &PeriodArgs) -> CliResult<String> {
    validate_name("report name", name)?;

    let project = ctx.project().await?;
    let period = ctx.select_period(args).await?;
    let summary = ctx.summary(&project, &period).await?;

    let report = SavedReport::build(name, &project, &summary, Utc::now());
    ctx.db.reports().save(&report).await?;

    info!(id = %report.id, name = %report.name, period = %period.title, "Report saved");
    Ok(format!(
        "Saved report '{}' ({}) with {} entries",
        report.name,
        report.id,
        report.content.metadata.total_sales
    ))
}

async fn list(ctx: &AppContext, limit: u32) -> CliResult<String> {
    let reports = ctx.db.reports().list_recent(limit).await?;
    Ok(output::reports_table(&reports))
}

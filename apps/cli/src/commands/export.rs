//! Export command: renders the period report and writes it to disk.

use std::path::PathBuf;

use chrono::Utc;
use tracing::info;

use crate::cli::ExportArgs;
use crate::context::AppContext;
use crate::error::CliResult;
use tally_export::SalesReport;

pub async fn run(ctx: &AppContext, args: ExportArgs) -> CliResult<String> {
    let project = ctx.project().await?;
    let period = ctx.select_period(&args.period).await?;
    let summary = ctx.summary(&project, &period).await?;

    let report = SalesReport::from_summary(
        &project.name,
        &summary,
        &project.commission_levels,
        Utc::now(),
    )
    .with_notes(args.notes);
    let bytes = args.format.render(&report)?;

    let path = args.output.unwrap_or_else(|| default_path(ctx, &report, args.format));
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&path, &bytes)?;

    info!(path = %path.display(), bytes = bytes.len(), format = %args.format, "Report exported");
    Ok(format!(
        "Wrote {} ({} entries, {} bytes)",
        path.display(),
        report.sales.len(),
        bytes.len()
    ))
}

fn default_path(ctx: &AppContext, report: &SalesReport, format: tally_export::ExportFormat) -> PathBuf {
    ctx.config
        .export_dir()
        .join(format!("{}.{}", report.file_stem(), format.extension()))
}

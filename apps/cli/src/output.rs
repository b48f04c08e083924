//! Plain-text rendering of listings and totals for the terminal.

use std::fmt::Write;

use tally_core::{CommissionLevel, Project, SaleRecord, SalesTotals};
use tally_db::{SavedReport, VersionSnapshot};

/// Fixed-width listing of sale records.
pub fn sales_table(sales: &[SaleRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36}  {:<10}  {:<16}  {:>5}  {:<8}  {:<5}  {:>14}  {:>7}  {:>12}  {:<9}",
        "ID", "Date", "Client", "Tours", "Manager", "Type", "Amount", "Rate", "Daily VPG", "Status"
    );

    for sale in sales {
        let (amount, rate, vpg) = match sale.details() {
            Some(d) => (
                d.sale_amount.to_grouped_string(),
                d.commission_rate.to_string(),
                d.daily_vpg.to_grouped_string(),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        let _ = writeln!(
            out,
            "{:<36}  {:<10}  {:<16}  {:>5}  {:<8}  {:<5}  {:>14}  {:>7}  {:>12}  {:<9}",
            sale.id,
            sale.date.format("%m/%d/%Y"),
            truncate(sale.client_name(), 16),
            sale.tours,
            sale.manager().as_str(),
            sale.sale_type().map(|t| t.as_str()).unwrap_or("-"),
            amount,
            rate,
            vpg,
            sale.status_label(),
        );
    }

    if sales.is_empty() {
        out.push_str("(no entries)\n");
    }
    out
}

/// Totals block with the tier the volume reached.
pub fn totals_block(totals: &SalesTotals, level: Option<&CommissionLevel>) -> String {
    let mut out = String::new();
    let rows = [
        ("Total volume", totals.total_volume.to_grouped_string()),
        ("Total commission", totals.total_commission.to_grouped_string()),
        ("Total tours", totals.total_tours.to_string()),
        ("Monthly VPG", totals.monthly_vpg.to_grouped_string()),
        ("Active sales", totals.active_sales.to_string()),
        ("Cancelled sales", totals.cancelled_sales.to_string()),
        ("No sales", totals.no_sales.to_string()),
        ("DEED sales", totals.deed_sales.to_string()),
        ("TRUST sales", totals.trust_sales.to_string()),
        ("FDI points", totals.total_fdi_points.to_string()),
        ("FDI given", totals.total_fdi_given_points.to_string()),
        ("FDI cost", totals.total_fdi_cost.to_grouped_string()),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{:<18}{:>16}", format!("{}:", label), value);
    }

    let tier = match level {
        Some(l) => format!("Level {} (+{})", l.level, l.additional_rate),
        None => "none".to_string(),
    };
    let _ = writeln!(out, "{:<18}{:>16}", "Current tier:", tier);
    out
}

pub fn levels_table(levels: &[CommissionLevel]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<6}  {:>16}  {:>16}  {:>8}", "Level", "Min volume", "Max volume", "Rate");
    for level in levels {
        let _ = writeln!(
            out,
            "{:<6}  {:>16}  {:>16}  {:>8}",
            level.level,
            level.min_volume.to_grouped_string(),
            level.max_volume.to_grouped_string(),
            format!("+{}", level.additional_rate),
        );
    }
    out
}

pub fn projects_table(projects: &[Project], current_id: Option<&str>) -> String {
    let mut out = String::new();
    for project in projects {
        let marker = if Some(project.id.as_str()) == current_id { "*" } else { " " };
        let _ = writeln!(
            out,
            "{} {:<36}  {:<30}  created {}",
            marker,
            project.id,
            project.name,
            project.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    out
}

pub fn versions_table(versions: &[VersionSnapshot]) -> String {
    let mut out = String::new();
    for snapshot in versions {
        let _ = writeln!(
            out,
            "v{:<4}  {}  {:<30}  {} entries",
            snapshot.version,
            snapshot.created_at.format("%Y-%m-%d %H:%M:%S"),
            snapshot.data.project.name,
            snapshot.data.sales.len()
        );
    }
    if versions.is_empty() {
        out.push_str("(no versions)\n");
    }
    out
}

pub fn reports_table(reports: &[SavedReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = writeln!(
            out,
            "{}  {:<30}  {:<24}  {:>4} sales  {:>16}",
            report.created_at.format("%Y-%m-%d %H:%M"),
            truncate(&report.name, 30),
            truncate(&report.project_name, 24),
            report.content.metadata.total_sales,
            report.content.metadata.total_volume.to_grouped_string(),
        );
    }
    if reports.is_empty() {
        out.push_str("(no saved reports)\n");
    }
    out
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

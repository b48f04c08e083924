//! # XLSX Export
//!
//! ## Workbook Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dashboard     title, performance metrics, quick stats, FDI summary     │
//! │  Sales Log     one row per record, 15 columns, header row bold          │
//! │  Instructions  how the figures are derived                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are written as computed; the workbook carries no formulas.

use std::io::Cursor;
use tracing::debug;
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::error::{ExportError, ExportResult};
use crate::report::{format_date, SalesReport};
use tally_core::{Money, Points, SaleRecord};

pub const DASHBOARD_SHEET: &str = "Dashboard";
pub const SALES_LOG_SHEET: &str = "Sales Log";
pub const INSTRUCTIONS_SHEET: &str = "Instructions";

/// Column headers of the sales log, in order.
pub const SALES_LOG_HEADERS: [&str; 15] = [
    "Date",
    "Client Name",
    "Lead Number",
    "Number of Tours",
    "Manager",
    "Sale Amount",
    "Commission %",
    "Commission Amount",
    "Daily VPG",
    "FDI Points",
    "FDI Given",
    "FDI Cost",
    "Sale Type",
    "Status",
    "Notes",
];

const SALES_LOG_COLUMNS: [&str; 15] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O",
];

const INSTRUCTIONS: &[&str] = &[
    "Sales Performance Tracker - Instructions",
    "",
    "Figures:",
    "- Commission %: base rate by sale amount plus the volume tier rate",
    "- Commission Amount: sale amount at the base rate",
    "- Daily VPG: sale amount divided by number of tours",
    "- FDI Points: sale amount x 0.55",
    "- FDI Cost: (FDI Given - FDI Points) x 0.048 when more points are given",
    "",
    "Totals:",
    "- Volume, commission and FDI totals count active sales only",
    "- Tours count every entry, including no-sales and cancellations",
    "- Monthly VPG: total volume divided by total tours",
];

/// Renders the report as XLSX bytes.
pub fn render(report: &SalesReport) -> ExportResult<Vec<u8>> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();

    write_dashboard(add_sheet(&mut book, DASHBOARD_SHEET)?, report);
    write_sales_log(add_sheet(&mut book, SALES_LOG_SHEET)?, &report.sales);
    write_instructions(add_sheet(&mut book, INSTRUCTIONS_SHEET)?);

    let mut out = Cursor::new(Vec::<u8>::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut out)
        .map_err(|e| ExportError::Spreadsheet(e.to_string()))?;

    let bytes = out.into_inner();
    debug!(rows = report.sales.len(), bytes = bytes.len(), "Rendered workbook");
    Ok(bytes)
}

fn add_sheet<'a>(book: &'a mut Spreadsheet, name: &str) -> ExportResult<&'a mut Worksheet> {
    book.new_sheet(name)
        .map_err(|e| ExportError::Spreadsheet(format!("Failed to create sheet {name}: {e}")))
}

// =============================================================================
// Cell Helpers
// =============================================================================

fn text(ws: &mut Worksheet, col: u32, row: u32, value: &str) {
    ws.get_cell_mut((col, row)).set_value_string(value);
}

fn bold(ws: &mut Worksheet, col: u32, row: u32, value: &str) {
    text(ws, col, row, value);
    ws.get_style_mut((col, row)).get_font_mut().set_bold(true);
}

fn number(ws: &mut Worksheet, col: u32, row: u32, value: f64) {
    ws.get_cell_mut((col, row)).set_value_number(value);
}

fn money(ws: &mut Worksheet, col: u32, row: u32, value: Money) {
    number(ws, col, row, value.as_f64());
}

fn points(ws: &mut Worksheet, col: u32, row: u32, value: Points) {
    number(ws, col, row, value.as_f64());
}

// =============================================================================
// Sheets
// =============================================================================

fn write_dashboard(ws: &mut Worksheet, report: &SalesReport) {
    let totals = &report.totals;

    bold(ws, 1, 1, "Sales Performance Dashboard");
    text(ws, 1, 2, &format!("{} - {}", report.project_name, report.title));

    bold(ws, 1, 3, "Performance Metrics");
    bold(ws, 3, 3, "Quick Stats");

    text(ws, 1, 4, "Total Volume:");
    money(ws, 2, 4, totals.total_volume);
    text(ws, 3, 4, "Active Sales:");
    number(ws, 4, 4, f64::from(totals.active_sales));

    text(ws, 1, 5, "Total Tours:");
    number(ws, 2, 5, f64::from(totals.total_tours));
    text(ws, 3, 5, "Cancelled Sales:");
    number(ws, 4, 5, f64::from(totals.cancelled_sales));

    text(ws, 1, 6, "Monthly VPG:");
    money(ws, 2, 6, totals.monthly_vpg);
    text(ws, 3, 6, "DEED Sales:");
    number(ws, 4, 6, f64::from(totals.deed_sales));

    text(ws, 1, 7, "Total Commission:");
    money(ws, 2, 7, totals.total_commission);
    text(ws, 3, 7, "TRUST Sales:");
    number(ws, 4, 7, f64::from(totals.trust_sales));

    text(ws, 3, 8, "No Sales:");
    number(ws, 4, 8, f64::from(totals.no_sales));

    bold(ws, 1, 9, "FDI Summary");
    text(ws, 1, 10, "Total FDI Points:");
    points(ws, 2, 10, totals.total_fdi_points);
    text(ws, 1, 11, "Total FDI Given:");
    points(ws, 2, 11, totals.total_fdi_given_points);
    text(ws, 1, 12, "Total FDI Cost:");
    money(ws, 2, 12, totals.total_fdi_cost);

    bold(ws, 1, 14, "Commission Levels");
    for (i, level) in report.levels.iter().enumerate() {
        let row = 15 + i as u32;
        text(ws, 1, row, &format!("Level {}", level.level));
        text(
            ws,
            2,
            row,
            &format!(
                "{} - {}",
                level.min_volume.to_grouped_string(),
                level.max_volume.to_grouped_string()
            ),
        );
        text(ws, 3, row, &format!("+{}", level.additional_rate));
    }

    for col in ["A", "B", "C", "D"] {
        ws.get_column_dimension_mut(col).set_width(20.0);
    }
}

fn write_sales_log(ws: &mut Worksheet, sales: &[SaleRecord]) {
    for (i, header) in SALES_LOG_HEADERS.iter().enumerate() {
        bold(ws, i as u32 + 1, 1, header);
    }

    for (i, sale) in sales.iter().enumerate() {
        let row = i as u32 + 2;

        text(ws, 1, row, &format_date(sale.date));
        text(ws, 2, row, sale.client_name());
        text(ws, 3, row, &sale.lead_number);
        number(ws, 4, row, f64::from(sale.tours));
        text(ws, 5, row, sale.manager().as_str());

        if let Some(details) = sale.details() {
            money(ws, 6, row, details.sale_amount);
            number(ws, 7, row, details.commission_rate.percentage());
            money(ws, 8, row, details.commission_amount);
            money(ws, 9, row, details.daily_vpg);
            points(ws, 10, row, details.fdi_points);
            points(ws, 11, row, details.fdi_given_points);
            money(ws, 12, row, details.fdi_cost);
            text(ws, 13, row, details.sale_type.as_str());
        } else {
            for col in 6..=12 {
                number(ws, col, row, 0.0);
            }
        }

        text(ws, 14, row, sale.status_label());
        text(ws, 15, row, &sale.notes);
    }

    for col in SALES_LOG_COLUMNS {
        ws.get_column_dimension_mut(col).set_width(15.0);
    }
}

fn write_instructions(ws: &mut Worksheet) {
    for (i, line) in INSTRUCTIONS.iter().enumerate() {
        let row = i as u32 + 1;
        if i == 0 || line.ends_with(':') {
            bold(ws, 1, row, line);
        } else if !line.is_empty() {
            text(ws, 1, row, line);
        }
    }
    ws.get_column_dimension_mut("A").set_width(80.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;

    #[test]
    fn test_render_produces_zip() {
        let bytes = render(&fixtures::report(4)).unwrap();
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_workbook_contents() {
        let bytes = render(&fixtures::report(3)).unwrap();
        let book = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true).unwrap();

        assert!(book.get_sheet_by_name(DASHBOARD_SHEET).is_some());
        assert!(book.get_sheet_by_name(INSTRUCTIONS_SHEET).is_some());

        let log = book.get_sheet_by_name(SALES_LOG_SHEET).unwrap();
        assert_eq!(log.get_value((1, 1)), "Date");
        assert_eq!(log.get_value((15, 1)), "Notes");
        assert_eq!(log.get_value((1, 2)), "03/01/2025");
        assert_eq!(log.get_value((2, 2)), "Smith");
        assert_eq!(log.get_value((14, 3)), "Cancelled");
        assert_eq!(log.get_value((2, 4)), "NO SALE");
        assert_eq!(log.get_value((14, 4)), "No Sale");
    }

    #[test]
    fn test_empty_report_renders() {
        let bytes = render(&fixtures::report(0)).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}

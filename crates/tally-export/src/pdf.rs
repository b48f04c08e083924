//! # PDF Export
//!
//! Landscape US-letter report built directly with lopdf.
//!
//! ## Page Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sales Performance Report                         (page 1 only)         │
//! │  Generated on 03/31/2025 17:05                                          │
//! │  Performance Summary                                                    │
//! │    Total Volume: ...        Active Sales: ...                           │
//! │                                                                         │
//! │  Detailed Sales                                                         │
//! │  Date        Client      Sale Amount   Daily VPG   FDI Cost   Status    │
//! │  ...         rows continue onto following pages                         │
//! │                                                                         │
//! │  Additional Notes         (after the last row)                          │
//! │                          Page 1 of N                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::error::ExportResult;
use crate::report::{format_date, SalesReport};
use tally_core::SaleRecord;

const PAGE_WIDTH: i64 = 792;
const PAGE_HEIGHT: i64 = 612;
const MARGIN: i64 = 40;
const LINE_SPACING: i64 = 6;
/// Height of one 10pt table row.
const ROW_HEIGHT: i64 = 10 + LINE_SPACING;
const FOOTER_Y: i64 = 20;
/// Lowest baseline a table row may use.
const BOTTOM_LIMIT: i64 = 60;
const NOTES_BOX_HEIGHT: i64 = 80;

/// Monospace layout of the listing: (header, width in characters).
const COLUMNS: [(&str, usize); 6] = [
    ("Date", 12),
    ("Client", 22),
    ("Sale Amount", 16),
    ("Daily VPG", 14),
    ("FDI Cost", 12),
    ("Status", 11),
];
const NOTES_COLUMN_WIDTH: usize = 40;

// =============================================================================
// Page Builder
// =============================================================================

/// Collects drawing operations page by page.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        PageWriter {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn current(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_room(&mut self, height: i64) -> bool {
        if self.y - height < BOTTOM_LIMIT {
            self.new_page();
            return true;
        }
        false
    }

    /// Writes a line at the cursor and moves the cursor down.
    fn line(&mut self, font: &str, size: i64, value: &str) {
        let ops = text_ops(font, size, MARGIN, self.y, value);
        self.current().extend(ops);
        self.y -= size + LINE_SPACING;
    }

    fn gap(&mut self, height: i64) {
        self.y -= height;
    }

    fn rect(&mut self, x: i64, y: i64, width: i64, height: i64) {
        let ops = self.current();
        ops.push(Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ));
        ops.push(Operation::new("S", vec![]));
    }
}

/// Standard Type1 fonts only cover ASCII reliably.
fn ascii(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

fn pad(value: &str, width: usize) -> String {
    let mut cell: String = value.chars().take(width.saturating_sub(1)).collect();
    while cell.chars().count() < width {
        cell.push(' ');
    }
    cell
}

fn table_row(cells: &[String], include_notes: bool) -> String {
    let mut row = String::new();
    for (cell, (_, width)) in cells.iter().zip(COLUMNS.iter()) {
        row.push_str(&pad(cell, *width));
    }
    if include_notes {
        if let Some(notes) = cells.get(COLUMNS.len()) {
            row.push_str(&pad(notes, NOTES_COLUMN_WIDTH));
        }
    }
    row.trim_end().to_string()
}

fn sale_cells(sale: &SaleRecord) -> Vec<String> {
    let (amount, vpg, cost) = match sale.details() {
        Some(d) => (d.sale_amount, d.daily_vpg, d.fdi_cost),
        None => Default::default(),
    };
    vec![
        format_date(sale.date),
        sale.client_name().to_string(),
        amount.to_grouped_string(),
        vpg.to_grouped_string(),
        cost.to_grouped_string(),
        sale.status_label().to_string(),
        sale.notes.clone(),
    ]
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders the report as PDF bytes.
pub fn render(report: &SalesReport) -> ExportResult<Vec<u8>> {
    let pages = layout(report);
    let page_count = pages.len();
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let heading = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => heading,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for (index, mut operations) in pages.into_iter().enumerate() {
        let footer = format!("Page {} of {}", index + 1, page_count);
        let x = PAGE_WIDTH / 2 - (footer.len() as i64 * 3);
        operations.extend(text_ops("F1", 10, x, FOOTER_Y, &footer));

        let page_id = add_page(&mut doc, pages_id, operations)?;
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)?;

    debug!(pages = page_count, bytes = out.len(), "Rendered PDF");
    Ok(out)
}

fn text_ops(font: &str, size: i64, x: i64, y: i64, value: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(ascii(value))]),
        Operation::new("ET", vec![]),
    ]
}

fn add_page(doc: &mut Document, parent: ObjectId, operations: Vec<Operation>) -> ExportResult<ObjectId> {
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    }))
}

/// Lays out every page's drawing operations, without footers.
fn layout(report: &SalesReport) -> Vec<Vec<Operation>> {
    let totals = &report.totals;
    let mut pw = PageWriter::new();

    pw.line("F2", 18, "Sales Performance Report");
    pw.line(
        "F1",
        12,
        &format!("{} - {}", report.project_name, report.title),
    );
    pw.line(
        "F1",
        12,
        &format!("Generated on {}", report.generated_at.format("%m/%d/%Y %H:%M")),
    );
    pw.gap(10);

    pw.line("F2", 14, "Performance Summary");
    let summary = [
        (
            format!("Total Volume: {}", totals.total_volume.to_grouped_string()),
            format!("Active Sales: {}", totals.active_sales),
        ),
        (
            format!("Total Tours: {}", totals.total_tours),
            format!("Cancelled Sales: {}", totals.cancelled_sales),
        ),
        (
            format!("Monthly VPG: {}", totals.monthly_vpg.to_grouped_string()),
            format!("Total Commission: {}", totals.total_commission.to_grouped_string()),
        ),
        (
            format!("FDI Cost: {}", totals.total_fdi_cost.to_grouped_string()),
            format!("No Sales: {}", totals.no_sales),
        ),
    ];
    for (left, right) in &summary {
        pw.line("F1", 12, &format!("{}{}", pad(left, 36), right));
    }
    pw.gap(16);

    pw.line("F2", 14, "Detailed Sales");
    let mut headers: Vec<String> = COLUMNS.iter().map(|(h, _)| h.to_string()).collect();
    headers.push("Notes".to_string());
    let header_row = table_row(&headers, report.include_notes);
    pw.line("F2", 10, &header_row);

    if report.sales.is_empty() {
        pw.line("F1", 10, "No sales in this period.");
    }
    for sale in &report.sales {
        if pw.ensure_room(ROW_HEIGHT) {
            pw.line("F2", 10, &header_row);
        }
        pw.line("F1", 10, &table_row(&sale_cells(sale), report.include_notes));
    }

    pw.gap(16);
    pw.ensure_room(NOTES_BOX_HEIGHT + 30);
    pw.line("F2", 14, "Additional Notes");
    let top = pw.y;
    pw.rect(MARGIN, top - NOTES_BOX_HEIGHT, PAGE_WIDTH - 2 * MARGIN, NOTES_BOX_HEIGHT);

    pw.pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render(&fixtures::report(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }

    #[test]
    fn test_long_listing_paginates() {
        assert_eq!(layout(&fixtures::report(5)).len(), 1);
        assert!(layout(&fixtures::report(120)).len() >= 3);

        let bytes = render(&fixtures::report(120)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), layout(&fixtures::report(120)).len());
    }

    #[test]
    fn test_table_row_layout() {
        let cells: Vec<String> = ["03/01/2025", "Smith", "$30,000.00", "$15,000.00", "$0.00", "Active", "vip"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = table_row(&cells, false);
        assert!(row.starts_with("03/01/2025  Smith"));
        assert!(!row.contains("vip"));
        assert!(table_row(&cells, true).ends_with("vip"));
    }

    #[test]
    fn test_ascii_replaces_non_ascii() {
        assert_eq!(ascii("Muñoz"), "Mu?oz");
    }
}

//! # tally-export: Report Rendering
//!
//! Turns a computed [`SalesReport`] into XLSX or PDF bytes. Exporters only
//! format; every figure comes from tally-core.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  tally-core summarize() ──► SalesReport ──┬──► excel::render ──► .xlsx  │
//! │                                           └──► pdf::render   ──► .pdf   │
//! │                                                                         │
//! │  apps/cli writes the bytes to the configured export directory          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod excel;
pub mod pdf;
pub mod report;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ExportError, ExportResult};
pub use report::SalesReport;

use std::fmt;
use std::str::FromStr;

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Renders `report` in this format.
    pub fn render(&self, report: &SalesReport) -> ExportResult<Vec<u8>> {
        match self {
            ExportFormat::Xlsx => excel::render(report),
            ExportFormat::Pdf => pdf::render(report),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("Excel".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_render_dispatch() {
        let report = report::fixtures::report(2);
        assert!(ExportFormat::Pdf.render(&report).unwrap().starts_with(b"%PDF"));
        assert!(ExportFormat::Xlsx.render(&report).unwrap().starts_with(b"PK"));
    }
}

//! # Report Input
//!
//! Everything an exporter renders, already computed by tally-core.

use chrono::{DateTime, NaiveDate, Utc};

use tally_core::{CommissionLevel, PeriodSummary, SaleRecord, SalesTotals};

/// Render input for both exporters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesReport {
    /// Period title, e.g. `March 2025`.
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub project_name: String,
    pub totals: SalesTotals,
    /// Records in display order.
    pub sales: Vec<SaleRecord>,
    pub levels: Vec<CommissionLevel>,
    /// Adds a notes column to the PDF listing.
    pub include_notes: bool,
}

impl SalesReport {
    pub fn from_summary(
        project_name: &str,
        summary: &PeriodSummary,
        levels: &[CommissionLevel],
        generated_at: DateTime<Utc>,
    ) -> Self {
        SalesReport {
            title: summary.period.title.clone(),
            generated_at,
            project_name: project_name.to_string(),
            totals: summary.totals,
            sales: summary.sales.clone(),
            levels: levels.to_vec(),
            include_notes: false,
        }
    }

    pub fn with_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }

    /// Lowercase, dash-separated file name stem, e.g. `sales-report-march-2025`.
    pub fn file_stem(&self) -> String {
        let slug: Vec<String> = self
            .title
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(|part| part.to_ascii_lowercase())
            .collect();

        if slug.is_empty() {
            "sales-report".to_string()
        } else {
            format!("sales-report-{}", slug.join("-"))
        }
    }
}

/// `MM/DD/YYYY`, as used in both exports.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use tally_core::{
        default_commission_levels, ManagerName, Money, Points, Rate, SaleDetails, SaleType,
        TourOutcome, TrustPoints,
    };

    fn record(day: u32, outcome: TourOutcome, tours: u32, cancelled: bool) -> SaleRecord {
        let now = Utc::now();
        SaleRecord {
            id: format!("sale-{day}"),
            project_id: "p-1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            tours,
            lead_number: format!("L-{day}"),
            is_cancelled: cancelled,
            notes: if cancelled { "client backed out".to_string() } else { String::new() },
            outcome,
            created_at: now,
            updated_at: now,
        }
    }

    fn details(client: &str, dollars: i64, sale_type: SaleType) -> TourOutcome {
        TourOutcome::Sale(SaleDetails {
            client_last_name: client.to_string(),
            manager: ManagerName::Lisa,
            sale_type,
            sale_amount: Money::from_dollars(dollars),
            commission_rate: Rate::from_percent(5),
            commission_amount: Money::from_dollars(dollars / 20),
            fdi_points: Points::from_whole(dollars * 55 / 100),
            fdi_given_points: Points::zero(),
            fdi_cost: Money::zero(),
            daily_vpg: Money::from_dollars(dollars),
            trust_points: TrustPoints::default(),
        })
    }

    pub fn report(rows: usize) -> SalesReport {
        let sales: Vec<SaleRecord> = (0..rows)
            .map(|i| {
                let day = (i % 28) as u32 + 1;
                match i % 3 {
                    0 => record(day, details("Smith", 30_000, SaleType::Deed), 2, false),
                    1 => record(day, details("Jones", 60_000, SaleType::Trust), 1, true),
                    _ => record(day, TourOutcome::NoSale, 1, false),
                }
            })
            .collect();

        SalesReport {
            title: "March 2025".to_string(),
            generated_at: Utc::now(),
            project_name: "March 2025".to_string(),
            totals: SalesTotals {
                total_tours: 3,
                total_volume: Money::from_dollars(30_000),
                active_sales: 1,
                cancelled_sales: 1,
                no_sales: 1,
                deed_sales: 1,
                monthly_vpg: Money::from_dollars(10_000),
                ..SalesTotals::default()
            },
            sales,
            levels: default_commission_levels(),
            include_notes: true,
        }
    }
}

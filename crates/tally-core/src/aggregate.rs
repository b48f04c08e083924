//! # Aggregator
//!
//! Filters sales to a report period and rolls them up into [`SalesTotals`].
//!
//! ## Partitioning
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  filtered sales (date within period, inclusive)                         │
//! │       │                                                                 │
//! │       ├── is_cancelled ───────────────► cancelled                       │
//! │       ├── NoSale (not cancelled) ─────► no_sale                         │
//! │       └── everything else ────────────► active                          │
//! │                                                                         │
//! │  tours          Σ over ALL filtered records                             │
//! │  money and FDI  Σ over active records only                              │
//! │  monthly VPG    total volume / total tours                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here re-prices a sale. Commission, FDI and daily VPG are summed
//! exactly as they were stored.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::commission::current_level;
use crate::money::{Money, Points};
use crate::period::ReportPeriod;
use crate::types::{CommissionLevel, SaleRecord, SaleType, TourOutcome};
use crate::vpg::monthly_vpg;

// =============================================================================
// Totals
// =============================================================================

/// Rolled-up metrics for one report period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesTotals {
    pub total_tours: u32,
    pub total_volume: Money,
    pub total_commission: Money,
    pub active_sales: u32,
    pub cancelled_sales: u32,
    pub no_sales: u32,
    pub deed_sales: u32,
    pub trust_sales: u32,
    pub monthly_vpg: Money,
    pub total_fdi_points: Points,
    pub total_fdi_given_points: Points,
    pub total_fdi_cost: Money,
}

/// Filtered records split by status.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub active: Vec<&'a SaleRecord>,
    pub cancelled: Vec<&'a SaleRecord>,
    pub no_sale: Vec<&'a SaleRecord>,
}

/// Everything a report consumer needs for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodSummary {
    pub period: ReportPeriod,
    /// Records in the period, oldest first.
    pub sales: Vec<SaleRecord>,
    pub totals: SalesTotals,
    /// Tier the period's volume falls in, if any.
    pub current_level: Option<CommissionLevel>,
}

// =============================================================================
// Operations
// =============================================================================

/// Records dated within `period`, oldest first.
///
/// Records sharing a date keep their input order.
pub fn filter_sales<'a>(sales: &'a [SaleRecord], period: &ReportPeriod) -> Vec<&'a SaleRecord> {
    let mut filtered: Vec<&SaleRecord> = sales
        .iter()
        .filter(|sale| period.contains_date(sale.date))
        .collect();
    filtered.sort_by_key(|sale| sale.date);
    filtered
}

/// Splits records into active, cancelled and no-sale groups.
///
/// A cancelled no-sale counts as cancelled only.
pub fn partition<'a>(sales: &[&'a SaleRecord]) -> Partition<'a> {
    let mut groups = Partition::default();
    for &sale in sales {
        if sale.is_cancelled {
            groups.cancelled.push(sale);
        } else if sale.is_no_sale() {
            groups.no_sale.push(sale);
        } else {
            groups.active.push(sale);
        }
    }
    groups
}

/// Totals over records that have already been filtered.
///
/// Sums clamp at the numeric bounds, so stored records that predate the
/// amount limits cannot make the totals wrap.
pub fn totals_of(sales: &[&SaleRecord]) -> SalesTotals {
    let groups = partition(sales);

    let mut totals = SalesTotals {
        total_tours: sales.iter().fold(0u32, |acc, s| acc.saturating_add(s.tours)),
        active_sales: groups.active.len() as u32,
        cancelled_sales: groups.cancelled.len() as u32,
        no_sales: groups.no_sale.len() as u32,
        ..SalesTotals::default()
    };

    for sale in &groups.active {
        let TourOutcome::Sale(details) = &sale.outcome else {
            continue;
        };
        totals.total_volume = totals.total_volume.saturating_add(details.sale_amount);
        totals.total_commission = totals.total_commission.saturating_add(details.commission_amount);
        totals.total_fdi_points = totals.total_fdi_points.saturating_add(details.fdi_points);
        totals.total_fdi_given_points = totals
            .total_fdi_given_points
            .saturating_add(details.fdi_given_points);
        totals.total_fdi_cost = totals.total_fdi_cost.saturating_add(details.fdi_cost);
        match details.sale_type {
            SaleType::Deed => totals.deed_sales += 1,
            SaleType::Trust => totals.trust_sales += 1,
        }
    }

    totals.monthly_vpg = monthly_vpg(totals.total_volume, totals.total_tours);
    totals
}

/// Filters to `period` and computes its totals.
pub fn calculate_totals(sales: &[SaleRecord], period: &ReportPeriod) -> SalesTotals {
    totals_of(&filter_sales(sales, period))
}

/// Filtered records, totals and current tier for `period`.
pub fn summarize(
    sales: &[SaleRecord],
    period: &ReportPeriod,
    levels: &[CommissionLevel],
) -> PeriodSummary {
    let filtered = filter_sales(sales, period);
    let totals = totals_of(&filtered);

    PeriodSummary {
        period: period.clone(),
        sales: filtered.into_iter().cloned().collect(),
        totals,
        current_level: current_level(totals.total_volume, levels).copied(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Report Period Generator
//!
//! Builds the reporting windows offered for a given anchor date.
//!
//! ## Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  anchor = 2025-03-15                                                    │
//! │                                                                         │
//! │  monthly   Jan 1..Jan 31, Feb 1..Feb 28, ... Dec 1..Dec 31   (12)       │
//! │  annual    Jan 1..Dec 31                                     (1)        │
//! │  rolling45 Mar 15..Apr 29                                    (1)        │
//! │  rolling90 Mar 15..Jun 13                                    (1)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every window is inclusive on both ends. Rolling windows start at the
//! anchor and span anchor + N days, so they cover N + 1 calendar days.
//!
//! The generator never reads the clock: the caller passes the anchor (and,
//! for [`ReportGroup::select`], "today").

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Range Kind
// =============================================================================

/// Which family of report windows to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RangeKind {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "annual")]
    Annual,
    #[serde(rename = "45day")]
    Rolling45,
    #[serde(rename = "90day")]
    Rolling90,
}

impl RangeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RangeKind::Monthly => "monthly",
            RangeKind::Annual => "annual",
            RangeKind::Rolling45 => "45day",
            RangeKind::Rolling90 => "90day",
        }
    }

    /// Length of a rolling window in days.
    const fn rolling_days(&self) -> Option<u64> {
        match self {
            RangeKind::Rolling45 => Some(45),
            RangeKind::Rolling90 => Some(90),
            _ => None,
        }
    }
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(RangeKind::Monthly),
            "annual" | "year" => Ok(RangeKind::Annual),
            "45day" | "45" | "rolling45" => Ok(RangeKind::Rolling45),
            "90day" | "90" | "rolling90" => Ok(RangeKind::Rolling90),
            _ => Err(ValidationError::NotAllowed {
                field: "range".to_string(),
                allowed: ["monthly", "annual", "45day", "90day"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Report Period
// =============================================================================

/// An inclusive date window with a display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportPeriod {
    pub kind: RangeKind,
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
    pub title: String,
}

impl ReportPeriod {
    /// Check if a date falls within this period (inclusive).
    #[inline]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Rolling window of `kind` starting at `start`.
    ///
    /// Returns `None` for non-rolling kinds.
    pub fn rolling(kind: RangeKind, start: NaiveDate) -> Option<Self> {
        let days = kind.rolling_days()?;
        let end = start.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
        Some(ReportPeriod {
            kind,
            start,
            end,
            title: format!(
                "{}-Day Rolling ({} - {})",
                days,
                start.format("%m/%d/%Y"),
                end.format("%m/%d/%Y")
            ),
        })
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

// =============================================================================
// Report Group
// =============================================================================

/// All windows generated for one anchor date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportGroup {
    pub monthly: Vec<ReportPeriod>,
    pub annual: Vec<ReportPeriod>,
    pub rolling45: Vec<ReportPeriod>,
    pub rolling90: Vec<ReportPeriod>,
}

impl ReportGroup {
    /// Windows of one kind.
    pub fn periods(&self, kind: RangeKind) -> &[ReportPeriod] {
        match kind {
            RangeKind::Monthly => &self.monthly,
            RangeKind::Annual => &self.annual,
            RangeKind::Rolling45 => &self.rolling45,
            RangeKind::Rolling90 => &self.rolling90,
        }
    }

    /// Default window for a range.
    ///
    /// Monthly picks the month containing `today` when `today` falls in the
    /// generated year, otherwise January. The other kinds have exactly one
    /// window.
    pub fn select(&self, kind: RangeKind, today: NaiveDate) -> Option<&ReportPeriod> {
        match kind {
            RangeKind::Monthly => self
                .monthly
                .iter()
                .find(|p| p.contains_date(today))
                .or_else(|| self.monthly.first()),
            other => self.periods(other).first(),
        }
    }

    /// Monthly window by month number (1-12).
    pub fn month(&self, month: u32) -> Option<&ReportPeriod> {
        month
            .checked_sub(1)
            .and_then(|index| self.monthly.get(index as usize))
    }

    /// Looks up any window by its exact title.
    pub fn find_by_title(&self, title: &str) -> Option<&ReportPeriod> {
        self.iter().find(|p| p.title == title)
    }

    /// Every window, monthly first.
    pub fn iter(&self) -> impl Iterator<Item = &ReportPeriod> {
        self.monthly
            .iter()
            .chain(&self.annual)
            .chain(&self.rolling45)
            .chain(&self.rolling90)
    }
}

// =============================================================================
// Generator
// =============================================================================

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn monthly_period(year: i32, month: u32) -> Option<ReportPeriod> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = last_day_of_month(year, month)?;
    Some(ReportPeriod {
        kind: RangeKind::Monthly,
        start,
        end,
        title: start.format("%B %Y").to_string(),
    })
}

fn annual_period(year: i32) -> Option<ReportPeriod> {
    Some(ReportPeriod {
        kind: RangeKind::Annual,
        start: NaiveDate::from_ymd_opt(year, 1, 1)?,
        end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        title: format!("Annual Report {}", year),
    })
}

/// Generates every report window for `anchor`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use tally_core::period::generate_report_periods;
///
/// let anchor = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
/// let group = generate_report_periods(anchor);
/// assert_eq!(group.monthly[2].title, "March 2025");
/// ```
pub fn generate_report_periods(anchor: NaiveDate) -> ReportGroup {
    let year = anchor.year();

    ReportGroup {
        monthly: (1..=12).filter_map(|m| monthly_period(year, m)).collect(),
        annual: annual_period(year).into_iter().collect(),
        rolling45: ReportPeriod::rolling(RangeKind::Rolling45, anchor)
            .into_iter()
            .collect(),
        rolling90: ReportPeriod::rolling(RangeKind::Rolling90, anchor)
            .into_iter()
            .collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_periods() {
        let group = generate_report_periods(date(2025, 3, 15));
        assert_eq!(group.monthly.len(), 12);

        let march = &group.monthly[2];
        assert_eq!(march.title, "March 2025");
        assert_eq!(march.start, date(2025, 3, 1));
        assert_eq!(march.end, date(2025, 3, 31));

        assert_eq!(group.monthly[0].title, "January 2025");
        assert_eq!(group.monthly[1].end, date(2025, 2, 28));
        assert_eq!(group.monthly[11].end, date(2025, 12, 31));
    }

    #[test]
    fn test_leap_february() {
        let group = generate_report_periods(date(2024, 7, 1));
        assert_eq!(group.monthly[1].end, date(2024, 2, 29));
    }

    #[test]
    fn test_annual_period() {
        let group = generate_report_periods(date(2025, 3, 15));
        assert_eq!(group.annual.len(), 1);
        assert_eq!(group.annual[0].title, "Annual Report 2025");
        assert_eq!(group.annual[0].start, date(2025, 1, 1));
        assert_eq!(group.annual[0].end, date(2025, 12, 31));
    }

    #[test]
    fn test_rolling_periods() {
        let group = generate_report_periods(date(2025, 3, 15));

        let r45 = &group.rolling45[0];
        assert_eq!(r45.start, date(2025, 3, 15));
        assert_eq!(r45.end, date(2025, 4, 29));
        assert_eq!(r45.title, "45-Day Rolling (03/15/2025 - 04/29/2025)");

        let r90 = &group.rolling90[0];
        assert_eq!(r90.end, date(2025, 6, 13));
        assert_eq!(r90.title, "90-Day Rolling (03/15/2025 - 06/13/2025)");
    }

    #[test]
    fn test_rolling_crosses_year() {
        let group = generate_report_periods(date(2025, 12, 1));
        assert_eq!(group.rolling90[0].end, date(2026, 3, 1));
    }

    #[test]
    fn test_contains_date_inclusive() {
        let group = generate_report_periods(date(2025, 3, 15));
        let march = &group.monthly[2];
        assert!(march.contains_date(date(2025, 3, 1)));
        assert!(march.contains_date(date(2025, 3, 31)));
        assert!(!march.contains_date(date(2025, 4, 1)));
        assert!(!march.contains_date(date(2025, 2, 28)));
    }

    #[test]
    fn test_select_defaults() {
        let group = generate_report_periods(date(2025, 1, 1));

        let current = group.select(RangeKind::Monthly, date(2025, 6, 10)).unwrap();
        assert_eq!(current.title, "June 2025");

        let other_year = group.select(RangeKind::Monthly, date(2026, 6, 10)).unwrap();
        assert_eq!(other_year.title, "January 2025");

        let annual = group.select(RangeKind::Annual, date(2025, 6, 10)).unwrap();
        assert_eq!(annual.kind, RangeKind::Annual);
    }

    #[test]
    fn test_month_and_title_lookup() {
        let group = generate_report_periods(date(2025, 3, 15));
        assert_eq!(group.month(12).unwrap().title, "December 2025");
        assert!(group.month(0).is_none());
        assert!(group.month(13).is_none());

        let found = group.find_by_title("Annual Report 2025").unwrap();
        assert_eq!(found.kind, RangeKind::Annual);
        assert!(group.find_by_title("Smarch 2025").is_none());
        assert_eq!(group.iter().count(), 15);
    }

    #[test]
    fn test_range_kind_parse() {
        assert_eq!("monthly".parse::<RangeKind>().unwrap(), RangeKind::Monthly);
        assert_eq!("45day".parse::<RangeKind>().unwrap(), RangeKind::Rolling45);
        assert_eq!("90DAY".parse::<RangeKind>().unwrap(), RangeKind::Rolling90);
        assert!("weekly".parse::<RangeKind>().is_err());
        assert_eq!(RangeKind::Rolling45.to_string(), "45day");
    }
}

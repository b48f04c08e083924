//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Project      │   │   SaleRecord    │   │ CommissionLevel │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  project_id     │   │  level          │       │
//! │  │  name           │   │  date, tours    │   │  min / max      │       │
//! │  │  levels ────────┼──►│  outcome ───┐   │   │  additional %   │       │
//! │  └─────────────────┘   └─────────────┼───┘   └─────────────────┘       │
//! │                                      ▼                                  │
//! │                        ┌──────────────────────────┐                     │
//! │                        │       TourOutcome        │                     │
//! │                        │  Sale(SaleDetails)       │  amount, rates,     │
//! │                        │  NoSale                  │  FDI, VPG           │
//! │                        └──────────────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A no-sale tour carries no monetary data at all. The string sentinel used
//! in storage never appears in these types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Points, Rate};
use crate::{MANAGER_PLACEHOLDER, NO_SALE_SENTINEL};

// =============================================================================
// Sale Type
// =============================================================================

/// How the purchased interest is conveyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum SaleType {
    /// Deeded week. Base commission depends on the sale amount.
    Deed,
    /// Trust points. Always pays the top base rate.
    Trust,
}

impl SaleType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleType::Deed => "DEED",
            SaleType::Trust => "TRUST",
        }
    }
}

impl fmt::Display for SaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEED" => Ok(SaleType::Deed),
            "TRUST" => Ok(SaleType::Trust),
            _ => Err(ValidationError::NotAllowed {
                field: "sale type".to_string(),
                allowed: vec!["DEED".to_string(), "TRUST".to_string()],
            }),
        }
    }
}

// =============================================================================
// Manager Name
// =============================================================================

/// Sales manager credited on a tour.
///
/// `Unassigned` is the `-` placeholder used for no-sale tours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ManagerName {
    Dan,
    Denise,
    Josh,
    Kathie,
    Lisa,
    Marlene,
    Martina,
    Raymond,
    #[serde(rename = "-")]
    Unassigned,
}

impl ManagerName {
    /// Every manager in display order, placeholder last.
    pub const ALL: [ManagerName; 9] = [
        ManagerName::Dan,
        ManagerName::Denise,
        ManagerName::Josh,
        ManagerName::Kathie,
        ManagerName::Lisa,
        ManagerName::Marlene,
        ManagerName::Martina,
        ManagerName::Raymond,
        ManagerName::Unassigned,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ManagerName::Dan => "Dan",
            ManagerName::Denise => "Denise",
            ManagerName::Josh => "Josh",
            ManagerName::Kathie => "Kathie",
            ManagerName::Lisa => "Lisa",
            ManagerName::Marlene => "Marlene",
            ManagerName::Martina => "Martina",
            ManagerName::Raymond => "Raymond",
            ManagerName::Unassigned => MANAGER_PLACEHOLDER,
        }
    }
}

impl fmt::Display for ManagerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagerName {
    type Err = ValidationError;

    /// Case-insensitive; empty input maps to the placeholder.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(ManagerName::Unassigned);
        }
        ManagerName::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "manager".to_string(),
                allowed: ManagerName::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Sale Details
// =============================================================================

/// Trust point balances recorded with a sale. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrustPoints {
    pub existing: Points,
    pub new: Points,
}

/// Monetary data of a tour that closed.
///
/// Every derived value is computed once when the sale is recorded and
/// stored as-is; later changes to the tier table do not reprice history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetails {
    /// Client surname.
    pub client_last_name: String,

    pub manager: ManagerName,

    pub sale_type: SaleType,

    pub sale_amount: Money,

    /// Base rate plus the tier rate in force at entry time.
    pub commission_rate: Rate,

    /// `sale_amount × base rate`. The tier rate is not applied here.
    pub commission_amount: Money,

    /// FDI points the sale earns.
    pub fdi_points: Points,

    /// FDI points actually granted to the client.
    pub fdi_given_points: Points,

    /// Cost of the points granted above `fdi_points`.
    pub fdi_cost: Money,

    /// `sale_amount / tours` for this entry.
    pub daily_vpg: Money,

    pub trust_points: TrustPoints,
}

/// Result of a single tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind")]
pub enum TourOutcome {
    Sale(SaleDetails),
    NoSale,
}

// =============================================================================
// Sale Record
// =============================================================================

/// One logged tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Project this record belongs to.
    pub project_id: String,

    /// Calendar date of the tour.
    #[ts(as = "String")]
    pub date: NaiveDate,

    /// Number of tours logged on this entry.
    pub tours: u32,

    pub lead_number: String,

    /// Cancelled sales keep their figures but drop out of the totals.
    pub is_cancelled: bool,

    pub notes: String,

    pub outcome: TourOutcome,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl SaleRecord {
    #[inline]
    pub fn is_no_sale(&self) -> bool {
        matches!(self.outcome, TourOutcome::NoSale)
    }

    /// Counted toward volume and commission.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.is_cancelled && !self.is_no_sale()
    }

    pub fn details(&self) -> Option<&SaleDetails> {
        match &self.outcome {
            TourOutcome::Sale(details) => Some(details),
            TourOutcome::NoSale => None,
        }
    }

    /// Sale amount, zero for a no-sale.
    pub fn sale_amount(&self) -> Money {
        self.details()
            .map(|d| d.sale_amount)
            .unwrap_or_else(Money::zero)
    }

    /// Client surname as shown in listings and exports.
    pub fn client_name(&self) -> &str {
        self.details()
            .map(|d| d.client_last_name.as_str())
            .unwrap_or(NO_SALE_SENTINEL)
    }

    pub fn manager(&self) -> ManagerName {
        self.details()
            .map(|d| d.manager)
            .unwrap_or(ManagerName::Unassigned)
    }

    pub fn sale_type(&self) -> Option<SaleType> {
        self.details().map(|d| d.sale_type)
    }

    /// `Cancelled`, `No Sale` or `Active`.
    pub fn status_label(&self) -> &'static str {
        if self.is_cancelled {
            "Cancelled"
        } else if self.is_no_sale() {
            "No Sale"
        } else {
            "Active"
        }
    }
}

// =============================================================================
// Commission Level
// =============================================================================

/// One band of the cumulative-volume tier table.
///
/// Bounds are inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionLevel {
    pub level: u32,
    pub min_volume: Money,
    pub max_volume: Money,
    pub additional_rate: Rate,
}

impl CommissionLevel {
    #[inline]
    pub fn contains(&self, volume: Money) -> bool {
        volume >= self.min_volume && volume <= self.max_volume
    }
}

/// The tier table every new project starts with.
pub fn default_commission_levels() -> Vec<CommissionLevel> {
    const TABLE: [(u32, i64, i64, u32); 8] = [
        (1, 162_500, 243_749, 100),
        (2, 243_750, 324_999, 200),
        (3, 325_000, 406_249, 300),
        (4, 406_250, 487_499, 350),
        (5, 487_500, 584_999, 400),
        (6, 585_000, 682_499, 500),
        (7, 682_500, 893_749, 550),
        (8, 893_750, 999_999_999, 600),
    ];

    TABLE
        .iter()
        .map(|&(level, min, max, bps)| CommissionLevel {
            level,
            min_volume: Money::from_dollars(min),
            max_volume: Money::from_dollars(max),
            additional_rate: Rate::from_bps(bps),
        })
        .collect()
}

// =============================================================================
// Project
// =============================================================================

/// A named container for sales with its own tier table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Project {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub commission_levels: Vec<CommissionLevel>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # tally-core: Pure Business Logic for Tally
//!
//! This crate is the **heart** of Tally. It contains the commission, FDI and
//! VPG rules, the report period generator and the period aggregator as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    CLI (apps/cli)                               │   │
//! │  │    sale add ──► report show ──► export xlsx/pdf                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │commission │  │    fdi    │  │    vpg    │  │  period   │  │   │
//! │  │   │ base rate │  │  points   │  │ daily     │  │ monthly   │  │   │
//! │  │   │ tiers     │  │  cost     │  │ monthly   │  │ rolling   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │ aggregate │  │   entry   │  │ validation│                 │   │
//! │  │   │  totals   │  │  pricing  │  │   rules   │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Record Store)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (SaleRecord, Project, CommissionLevel, ...)
//! - [`money`] - Money (cents), Points (hundredths) and Rate (basis points)
//! - [`commission`] - Base and tiered additional commission
//! - [`fdi`] - FDI points earned and over-grant cost
//! - [`vpg`] - Volume per guest
//! - [`period`] - Report period generator
//! - [`aggregate`] - Period filtering and totals
//! - [`entry`] - Pricing of a submitted sale entry
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::commission::base_commission;
//! use tally_core::money::Money;
//! use tally_core::types::SaleType;
//!
//! let rate = base_commission(Money::from_dollars(30_000), SaleType::Deed);
//! assert_eq!(rate.bps(), 500); // 5%
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod commission;
pub mod entry;
pub mod error;
pub mod fdi;
pub mod money;
pub mod period;
pub mod types;
pub mod validation;
pub mod vpg;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregate::{PeriodSummary, SalesTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Points, Rate};
pub use period::{RangeKind, ReportGroup, ReportPeriod};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Client surname that marks a no-sale tour in stored records.
///
/// Only the storage and export boundaries see this string; everywhere else
/// a no-sale is [`TourOutcome::NoSale`].
pub const NO_SALE_SENTINEL: &str = "NO SALE";

/// Manager placeholder used for no-sale tours and unassigned entries.
pub const MANAGER_PLACEHOLDER: &str = "-";

/// Maximum tours that can be logged on a single entry.
pub const MAX_TOURS_PER_ENTRY: u32 = 99;

/// Maximum length of the free-text note on a sale.
pub const MAX_NOTES_LEN: usize = 1000;

/// Maximum length of a lead number.
pub const MAX_LEAD_NUMBER_LEN: usize = 50;

/// Largest sale amount accepted on one entry ($1,000,000,000).
///
/// At this bound the volume sum stays inside `i64` cents for more than
/// 90 million entries.
pub const MAX_SALE_AMOUNT: Money = Money::from_dollars(1_000_000_000);

/// Largest point balance accepted on one entry.
pub const MAX_POINTS: Points = Points::from_whole(1_000_000_000);

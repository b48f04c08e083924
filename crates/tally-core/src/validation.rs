//! # Validation Module
//!
//! Input validation for sale entries, names and tier tables.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  └── Types: dates, amounts, enums                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rules: lengths, ranges, tier ordering                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_client_name, validate_tours};
//!
//! assert!(validate_client_name("Smith").is_ok());
//! assert!(validate_tours(100).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Points};
use crate::types::CommissionLevel;
use crate::{
    MAX_LEAD_NUMBER_LEN, MAX_NOTES_LEN, MAX_POINTS, MAX_SALE_AMOUNT, MAX_TOURS_PER_ENTRY,
    NO_SALE_SENTINEL,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of project and saved report names.
pub const MAX_NAME_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a client surname on a real sale.
///
/// ## Rules
/// - Must not be empty
/// - Must not be the no-sale sentinel
/// - At most 100 characters
pub fn validate_client_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "client last name".to_string(),
        });
    }

    if name.eq_ignore_ascii_case(NO_SALE_SENTINEL) {
        return Err(ValidationError::invalid_format(
            "client last name",
            format!("'{}' is reserved for no-sale tours", NO_SALE_SENTINEL),
        ));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "client last name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

pub fn validate_lead_number(lead: &str) -> ValidationResult<()> {
    if lead.trim().chars().count() > MAX_LEAD_NUMBER_LEN {
        return Err(ValidationError::TooLong {
            field: "lead number".to_string(),
            max: MAX_LEAD_NUMBER_LEN,
        });
    }
    Ok(())
}

pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        });
    }
    Ok(())
}

/// Validates a project or saved report name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the tour count of one entry (0-99).
pub fn validate_tours(tours: u32) -> ValidationResult<()> {
    if tours > MAX_TOURS_PER_ENTRY {
        return Err(ValidationError::OutOfRange {
            field: "number of tours".to_string(),
            min: 0,
            max: MAX_TOURS_PER_ENTRY as i64,
        });
    }
    Ok(())
}

/// Validates a sale amount (0 to [`MAX_SALE_AMOUNT`]).
pub fn validate_sale_amount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "sale amount".to_string(),
        });
    }
    if amount > MAX_SALE_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: "sale amount".to_string(),
            min: 0,
            max: MAX_SALE_AMOUNT.dollars(),
        });
    }
    Ok(())
}

pub fn validate_points(field: &str, points: Points) -> ValidationResult<()> {
    if points.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if points > MAX_POINTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_POINTS.hundredths() / 100,
        });
    }
    Ok(())
}

// =============================================================================
// Parsers
// =============================================================================

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid_format("date", "expected YYYY-MM-DD"))
}

// =============================================================================
// Tier Table
// =============================================================================

/// Checks a tier table is well formed.
///
/// ## Rules
/// - Each tier has `min <= max`
/// - Tiers are sorted by `min` and do not overlap
/// - Level numbers are unique
///
/// Gaps between tiers are allowed; volumes in a gap earn no tier rate.
pub fn validate_levels(levels: &[CommissionLevel]) -> CoreResult<()> {
    for level in levels {
        if level.min_volume.is_negative() {
            return Err(CoreError::InvalidCommissionLevels {
                reason: format!("level {} has a negative minimum", level.level),
            });
        }
        if level.min_volume > level.max_volume {
            return Err(CoreError::InvalidCommissionLevels {
                reason: format!(
                    "level {} minimum {} exceeds maximum {}",
                    level.level,
                    level.min_volume.to_grouped_string(),
                    level.max_volume.to_grouped_string()
                ),
            });
        }
    }

    for pair in levels.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.min_volume <= prev.max_volume {
            return Err(CoreError::InvalidCommissionLevels {
                reason: format!("level {} overlaps level {}", next.level, prev.level),
            });
        }
    }

    let mut numbers: Vec<u32> = levels.iter().map(|l| l.level).collect();
    numbers.sort_unstable();
    if numbers.windows(2).any(|w| w[0] == w[1]) {
        return Err(CoreError::InvalidCommissionLevels {
            reason: "level numbers must be unique".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

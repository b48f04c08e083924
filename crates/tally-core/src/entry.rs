//! # Entry Pricing
//!
//! Turns a submitted entry into a stored [`SaleRecord`].
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleDraft ──► validate_draft ──► price_draft ──► into_record           │
//! │                                        ▲                                │
//! │               period volume + tiers ───┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tier rate is looked up from the volume of the period the operator is
//! working in when the entry is submitted. It is frozen into the record and
//! never recomputed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::commission::{commission_amount, total_commission_rate};
use crate::error::ValidationError;
use crate::fdi::{fdi_cost, fdi_points_available};
use crate::money::{Money, Points};
use crate::types::{
    CommissionLevel, ManagerName, SaleDetails, SaleRecord, SaleType, TourOutcome, TrustPoints,
};
use crate::validation::{
    validate_client_name, validate_lead_number, validate_notes, validate_points,
    validate_sale_amount, validate_tours, ValidationResult,
};
use crate::vpg::daily_vpg;

/// What the operator entered for the tour outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftOutcome {
    Sale {
        client_last_name: String,
        manager: ManagerName,
        sale_type: SaleType,
        sale_amount: Money,
        fdi_given_points: Points,
        trust_points: TrustPoints,
    },
    NoSale,
}

/// An entry as submitted, before any derived value is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub date: NaiveDate,
    pub tours: u32,
    pub lead_number: String,
    pub notes: String,
    pub is_cancelled: bool,
    pub outcome: DraftOutcome,
}

impl SaleDraft {
    /// Recovers the editable fields of a stored record.
    pub fn from_record(record: &SaleRecord) -> Self {
        let outcome = match &record.outcome {
            TourOutcome::Sale(d) => DraftOutcome::Sale {
                client_last_name: d.client_last_name.clone(),
                manager: d.manager,
                sale_type: d.sale_type,
                sale_amount: d.sale_amount,
                fdi_given_points: d.fdi_given_points,
                trust_points: d.trust_points,
            },
            TourOutcome::NoSale => DraftOutcome::NoSale,
        };

        SaleDraft {
            date: record.date,
            tours: record.tours,
            lead_number: record.lead_number.clone(),
            notes: record.notes.clone(),
            is_cancelled: record.is_cancelled,
            outcome,
        }
    }

    /// Builds a new record from a priced outcome.
    pub fn into_record(
        self,
        id: String,
        project_id: String,
        outcome: TourOutcome,
        now: DateTime<Utc>,
    ) -> SaleRecord {
        SaleRecord {
            id,
            project_id,
            date: self.date,
            tours: self.tours,
            lead_number: self.lead_number.trim().to_string(),
            is_cancelled: self.is_cancelled,
            notes: self.notes,
            outcome,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites an existing record with this draft, keeping its identity.
    pub fn apply_to(self, record: &mut SaleRecord, outcome: TourOutcome, now: DateTime<Utc>) {
        record.date = self.date;
        record.tours = self.tours;
        record.lead_number = self.lead_number.trim().to_string();
        record.is_cancelled = self.is_cancelled;
        record.notes = self.notes;
        record.outcome = outcome;
        record.updated_at = now;
    }
}

/// Checks every field of a draft.
pub fn validate_draft(draft: &SaleDraft) -> ValidationResult<()> {
    validate_tours(draft.tours)?;
    validate_lead_number(&draft.lead_number)?;
    validate_notes(&draft.notes)?;

    if let DraftOutcome::Sale {
        client_last_name,
        sale_amount,
        fdi_given_points,
        trust_points,
        ..
    } = &draft.outcome
    {
        validate_client_name(client_last_name)?;
        validate_sale_amount(*sale_amount)?;
        validate_points("FDI given points", *fdi_given_points)?;
        validate_points("existing trust points", trust_points.existing)?;
        validate_points("new trust points", trust_points.new)?;
    }

    Ok(())
}

/// Computes the stored figures for a draft.
///
/// `period_volume` is the active volume of the period the entry is made in;
/// it selects the tier rate recorded in the commission percentage.
pub fn price_draft(
    draft: &SaleDraft,
    period_volume: Money,
    levels: &[CommissionLevel],
) -> TourOutcome {
    match &draft.outcome {
        DraftOutcome::NoSale => TourOutcome::NoSale,
        DraftOutcome::Sale {
            client_last_name,
            manager,
            sale_type,
            sale_amount,
            fdi_given_points,
            trust_points,
        } => {
            let available = fdi_points_available(*sale_amount);
            TourOutcome::Sale(SaleDetails {
                client_last_name: client_last_name.trim().to_string(),
                manager: *manager,
                sale_type: *sale_type,
                sale_amount: *sale_amount,
                commission_rate: total_commission_rate(
                    *sale_amount,
                    period_volume,
                    *sale_type,
                    levels,
                ),
                commission_amount: commission_amount(*sale_amount, *sale_type),
                fdi_points: available,
                fdi_given_points: *fdi_given_points,
                fdi_cost: fdi_cost(*fdi_given_points, available),
                daily_vpg: daily_vpg(*sale_amount, draft.tours),
                trust_points: *trust_points,
            })
        }
    }
}

/// Validates then prices a draft.
pub fn validate_and_price(
    draft: &SaleDraft,
    period_volume: Money,
    levels: &[CommissionLevel],
) -> Result<TourOutcome, ValidationError> {
    validate_draft(draft)?;
    Ok(price_draft(draft, period_volume, levels))
}

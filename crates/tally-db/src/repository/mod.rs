//! # Repository Module
//!
//! Database repository implementations for Tally.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.sales().list_by_project(&project.id)                       │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── insert / update / delete                                          │
//! │  ├── list_by_project / list_between                                    │
//! │  └── toggle_cancelled / update_notes                                   │
//! │       │                                                                 │
//! │       │  SQL Query (runtime-bound parameters)                           │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository owns a clone of the pool. Operations that must touch
//! several tables atomically run inside one transaction and use the
//! connection-level helpers (`*_on`) shared between repositories.
//!
//! ## Available Repositories
//!
//! - [`ProjectRepository`](project::ProjectRepository) - Projects and their tier tables
//! - [`SaleRepository`](sale::SaleRepository) - Tour records
//! - [`SettingsRepository`](settings::SettingsRepository) - Key/value settings
//! - [`VersionRepository`](version::VersionRepository) - Auto-save snapshots
//! - [`SavedReportRepository`](report::SavedReportRepository) - Named report snapshots

pub mod project;
pub mod report;
pub mod sale;
pub mod settings;
pub mod version;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, Utc};
    use tally_core::entry::{price_draft, DraftOutcome, SaleDraft};
    use tally_core::{ManagerName, Money, Points, SaleRecord, SaleType, TrustPoints};
    use uuid::Uuid;

    use crate::{Database, DbConfig};

    pub async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn sale(project_id: &str, on: NaiveDate, dollars: i64, tours: u32) -> SaleRecord {
        let draft = SaleDraft {
            date: on,
            tours,
            lead_number: "L-1".to_string(),
            notes: String::new(),
            is_cancelled: false,
            outcome: DraftOutcome::Sale {
                client_last_name: "Smith".to_string(),
                manager: ManagerName::Lisa,
                sale_type: SaleType::Deed,
                sale_amount: Money::from_dollars(dollars),
                fdi_given_points: Points::zero(),
                trust_points: TrustPoints::default(),
            },
        };
        let outcome = price_draft(&draft, Money::zero(), &[]);
        draft.into_record(
            Uuid::new_v4().to_string(),
            project_id.to_string(),
            outcome,
            Utc::now(),
        )
    }

    pub fn no_sale(project_id: &str, on: NaiveDate, tours: u32) -> SaleRecord {
        let draft = SaleDraft {
            date: on,
            tours,
            lead_number: String::new(),
            notes: String::new(),
            is_cancelled: false,
            outcome: DraftOutcome::NoSale,
        };
        let outcome = price_draft(&draft, Money::zero(), &[]);
        draft.into_record(
            Uuid::new_v4().to_string(),
            project_id.to_string(),
            outcome,
            Utc::now(),
        )
    }
}

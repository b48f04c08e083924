//! # Sale Repository
//!
//! Database operations for tour records.
//!
//! ## Storage Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TourOutcome::Sale(details)          sales row                          │
//! │    client_last_name ───────────────► client_last_name                   │
//! │    sale_amount (Money) ────────────► sale_amount_cents                  │
//! │    commission_rate (Rate) ─────────► commission_rate_bps                │
//! │    fdi_points (Points) ────────────► fdi_points (hundredths)            │
//! │                                                                         │
//! │  TourOutcome::NoSale                                                    │
//! │    ───────────────────────────────► client_last_name = 'NO SALE'        │
//! │                                     manager_name = '-'                  │
//! │                                     every money/points column = 0       │
//! │                                                                         │
//! │  Reading: client_last_name = 'NO SALE' ──► TourOutcome::NoSale          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::{
    ManagerName, Money, Points, Rate, SaleDetails, SaleRecord, SaleType, TourOutcome,
    TrustPoints, MANAGER_PLACEHOLDER, NO_SALE_SENTINEL,
};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    project_id: String,
    date: NaiveDate,
    client_last_name: String,
    lead_number: String,
    number_of_tours: i64,
    manager_name: String,
    sale_type: SaleType,
    sale_amount_cents: i64,
    commission_rate_bps: i64,
    commission_amount_cents: i64,
    fdi_points: i64,
    fdi_given_points: i64,
    fdi_cost_cents: i64,
    daily_vpg_cents: i64,
    existing_trust_points: i64,
    new_trust_points: i64,
    is_cancelled: bool,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SaleRow> for SaleRecord {
    type Error = DbError;

    fn try_from(row: SaleRow) -> DbResult<Self> {
        let outcome = if row.client_last_name == NO_SALE_SENTINEL {
            TourOutcome::NoSale
        } else {
            let manager: ManagerName = row.manager_name.parse().map_err(|_| {
                DbError::InvalidData(format!(
                    "sale {} has unknown manager '{}'",
                    row.id, row.manager_name
                ))
            })?;
            let commission_rate = u32::try_from(row.commission_rate_bps).map_err(|_| {
                DbError::InvalidData(format!("sale {} has a negative commission rate", row.id))
            })?;

            TourOutcome::Sale(SaleDetails {
                client_last_name: row.client_last_name,
                manager,
                sale_type: row.sale_type,
                sale_amount: Money::from_cents(row.sale_amount_cents),
                commission_rate: Rate::from_bps(commission_rate),
                commission_amount: Money::from_cents(row.commission_amount_cents),
                fdi_points: Points::from_hundredths(row.fdi_points),
                fdi_given_points: Points::from_hundredths(row.fdi_given_points),
                fdi_cost: Money::from_cents(row.fdi_cost_cents),
                daily_vpg: Money::from_cents(row.daily_vpg_cents),
                trust_points: TrustPoints {
                    existing: Points::from_hundredths(row.existing_trust_points),
                    new: Points::from_hundredths(row.new_trust_points),
                },
            })
        };

        let tours = u32::try_from(row.number_of_tours).map_err(|_| {
            DbError::InvalidData(format!("sale {} has an invalid tour count", row.id))
        })?;

        Ok(SaleRecord {
            id: row.id,
            project_id: row.project_id,
            date: row.date,
            tours,
            lead_number: row.lead_number,
            is_cancelled: row.is_cancelled,
            notes: row.notes,
            outcome,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Column values of the outcome, with the no-sale collapse applied.
struct OutcomeColumns<'a> {
    client_last_name: &'a str,
    manager_name: &'a str,
    sale_type: SaleType,
    sale_amount_cents: i64,
    commission_rate_bps: i64,
    commission_amount_cents: i64,
    fdi_points: i64,
    fdi_given_points: i64,
    fdi_cost_cents: i64,
    daily_vpg_cents: i64,
    existing_trust_points: i64,
    new_trust_points: i64,
}

impl<'a> From<&'a TourOutcome> for OutcomeColumns<'a> {
    fn from(outcome: &'a TourOutcome) -> Self {
        match outcome {
            TourOutcome::Sale(d) => OutcomeColumns {
                client_last_name: &d.client_last_name,
                manager_name: d.manager.as_str(),
                sale_type: d.sale_type,
                sale_amount_cents: d.sale_amount.cents(),
                commission_rate_bps: d.commission_rate.bps() as i64,
                commission_amount_cents: d.commission_amount.cents(),
                fdi_points: d.fdi_points.hundredths(),
                fdi_given_points: d.fdi_given_points.hundredths(),
                fdi_cost_cents: d.fdi_cost.cents(),
                daily_vpg_cents: d.daily_vpg.cents(),
                existing_trust_points: d.trust_points.existing.hundredths(),
                new_trust_points: d.trust_points.new.hundredths(),
            },
            TourOutcome::NoSale => OutcomeColumns {
                client_last_name: NO_SALE_SENTINEL,
                manager_name: MANAGER_PLACEHOLDER,
                sale_type: SaleType::Deed,
                sale_amount_cents: 0,
                commission_rate_bps: 0,
                commission_amount_cents: 0,
                fdi_points: 0,
                fdi_given_points: 0,
                fdi_cost_cents: 0,
                daily_vpg_cents: 0,
                existing_trust_points: 0,
                new_trust_points: 0,
            },
        }
    }
}

const SELECT_SALE: &str = r#"
    SELECT
        id, project_id, date, client_last_name, lead_number, number_of_tours,
        manager_name, sale_type, sale_amount_cents, commission_rate_bps,
        commission_amount_cents, fdi_points, fdi_given_points, fdi_cost_cents,
        daily_vpg_cents, existing_trust_points, new_trust_points,
        is_cancelled, notes, created_at, updated_at
    FROM sales
"#;

const ORDER_BY_DATE: &str = "ORDER BY date ASC, created_at ASC, rowid ASC";

fn into_records(rows: Vec<SaleRow>) -> DbResult<Vec<SaleRecord>> {
    rows.into_iter().map(SaleRecord::try_from).collect()
}

/// Inserts one record on an open connection or transaction.
pub(crate) async fn insert_on(conn: &mut SqliteConnection, sale: &SaleRecord) -> DbResult<()> {
    let cols = OutcomeColumns::from(&sale.outcome);

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, project_id, date, client_last_name, lead_number, number_of_tours,
            manager_name, sale_type, sale_amount_cents, commission_rate_bps,
            commission_amount_cents, fdi_points, fdi_given_points, fdi_cost_cents,
            daily_vpg_cents, existing_trust_points, new_trust_points,
            is_cancelled, notes, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14,
            ?15, ?16, ?17,
            ?18, ?19, ?20, ?21
        )
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.project_id)
    .bind(sale.date)
    .bind(cols.client_last_name)
    .bind(&sale.lead_number)
    .bind(sale.tours as i64)
    .bind(cols.manager_name)
    .bind(cols.sale_type)
    .bind(cols.sale_amount_cents)
    .bind(cols.commission_rate_bps)
    .bind(cols.commission_amount_cents)
    .bind(cols.fdi_points)
    .bind(cols.fdi_given_points)
    .bind(cols.fdi_cost_cents)
    .bind(cols.daily_vpg_cents)
    .bind(cols.existing_trust_points)
    .bind(cols.new_trust_points)
    .bind(sale.is_cancelled)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Deletes a project's records and inserts `sales` in their place.
pub(crate) async fn replace_on(
    conn: &mut SqliteConnection,
    project_id: &str,
    sales: &[SaleRecord],
) -> DbResult<()> {
    sqlx::query("DELETE FROM sales WHERE project_id = ?1")
        .bind(project_id)
        .execute(&mut *conn)
        .await?;

    for sale in sales {
        insert_on(&mut *conn, sale).await?;
    }

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    pub async fn insert(&self, sale: &SaleRecord) -> DbResult<()> {
        debug!(id = %sale.id, project_id = %sale.project_id, date = %sale.date, "Inserting sale");

        let mut conn = self.pool.acquire().await?;
        insert_on(&mut conn, sale).await
    }

    /// Overwrites every mutable column of an existing record.
    pub async fn update(&self, sale: &SaleRecord) -> DbResult<()> {
        debug!(id = %sale.id, "Updating sale");
        let cols = OutcomeColumns::from(&sale.outcome);

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                date = ?1,
                client_last_name = ?2,
                lead_number = ?3,
                number_of_tours = ?4,
                manager_name = ?5,
                sale_type = ?6,
                sale_amount_cents = ?7,
                commission_rate_bps = ?8,
                commission_amount_cents = ?9,
                fdi_points = ?10,
                fdi_given_points = ?11,
                fdi_cost_cents = ?12,
                daily_vpg_cents = ?13,
                existing_trust_points = ?14,
                new_trust_points = ?15,
                is_cancelled = ?16,
                notes = ?17,
                updated_at = ?18
            WHERE id = ?19
            "#,
        )
        .bind(sale.date)
        .bind(cols.client_last_name)
        .bind(&sale.lead_number)
        .bind(sale.tours as i64)
        .bind(cols.manager_name)
        .bind(cols.sale_type)
        .bind(cols.sale_amount_cents)
        .bind(cols.commission_rate_bps)
        .bind(cols.commission_amount_cents)
        .bind(cols.fdi_points)
        .bind(cols.fdi_given_points)
        .bind(cols.fdi_cost_cents)
        .bind(cols.daily_vpg_cents)
        .bind(cols.existing_trust_points)
        .bind(cols.new_trust_points)
        .bind(sale.is_cancelled)
        .bind(&sale.notes)
        .bind(sale.updated_at)
        .bind(&sale.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", &sale.id));
        }

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleRecord>> {
        let row: Option<SaleRow> = sqlx::query_as(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SaleRecord::try_from).transpose()
    }

    /// Every record, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<SaleRecord>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!("{SELECT_SALE} {ORDER_BY_DATE}"))
            .fetch_all(&self.pool)
            .await?;

        into_records(rows)
    }

    pub async fn list_by_project(&self, project_id: &str) -> DbResult<Vec<SaleRecord>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!(
            "{SELECT_SALE} WHERE project_id = ?1 {ORDER_BY_DATE}"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    /// Records dated within `start..=end`, across all projects.
    pub async fn list_between(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<SaleRecord>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!(
            "{SELECT_SALE} WHERE date >= ?1 AND date <= ?2 {ORDER_BY_DATE}"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    pub async fn count_by_project(&self, project_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE project_id = ?1")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Flips the cancellation flag and returns the new value.
    pub async fn toggle_cancelled(&self, id: &str) -> DbResult<bool> {
        let flag: Option<bool> = sqlx::query_scalar(
            r#"
            UPDATE sales
            SET is_cancelled = NOT is_cancelled, updated_at = ?1
            WHERE id = ?2
            RETURNING is_cancelled
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let flag = flag.ok_or_else(|| DbError::not_found("Sale", id))?;
        debug!(id = %id, cancelled = flag, "Toggled cancellation");
        Ok(flag)
    }

    pub async fn update_notes(&self, id: &str, notes: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE sales SET notes = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(notes)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Atomically replaces all records of a project.
    pub async fn replace_for_project(&self, project_id: &str, sales: &[SaleRecord]) -> DbResult<()> {
        debug!(project_id = %project_id, count = sales.len(), "Replacing project sales");

        let mut tx = self.pool.begin().await?;
        replace_on(&mut tx, project_id, sales).await?;
        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{date, memory_db, no_sale, sale};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = memory_db().await;
        let project = db.projects().ensure_current().await.unwrap();
        let record = sale(&project.id, date(2025, 3, 5), 30_000, 2);

        db.sales().insert(&record).await.unwrap();
        let stored = db.sales().get_by_id(&record.id).await.unwrap().unwrap();

        assert_eq!(stored.outcome, record.outcome);
        assert_eq!(stored.date, record.date);
        assert_eq!(stored.tours, 2);
        assert_eq!(stored.sale_amount(), Money::from_dollars(30_000));
        assert!(db.sales().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_sale_round_trips_through_sentinel() {
        let db = memory_db().await;
        let project = db.projects().ensure_current().await.unwrap();
        let record = no_sale(&project.id, date(2025, 3, 5), 1);
        db.sales().insert(&record).await.unwrap();

        let (name, manager, amount): (String, String, i64) = sqlx::query_as(
            "SELECT client_last_name, manager_name, sale_amount_cents FROM sales WHERE id = ?1",
        )
        .bind(&record.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(name, NO_SALE_SENTINEL);
        assert_eq!(manager, MANAGER_PLACEHOLDER);
        assert_eq!(amount, 0);

        let stored = db.sales().get_by_id(&record.id).await.unwrap().unwrap();
        assert!(stored.is_no_sale());
    }

    #[tokio::test]
    async fn test_foreign_key_enforced() {
        let db = memory_db().await;
        let orphan = sale("no-such-project", date(2025, 3, 5), 100, 1);
        let err = db.sales().insert(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_listing_and_ranges() {
        let db = memory_db().await;
        let project = db.projects().ensure_current().await.unwrap();
        for (day, amount) in [(20, 300), (1, 100), (31, 200)] {
            db.sales()
                .insert(&sale(&project.id, date(2025, 3, day), amount, 1))
                .await
                .unwrap();
        }
        db.sales()
            .insert(&sale(&project.id, date(2025, 4, 1), 400, 1))
            .await
            .unwrap();

        let all = db.sales().list_by_project(&project.id).await.unwrap();
        let days: Vec<NaiveDate> = all.iter().map(|s| s.date).collect();
        assert_eq!(
            days,
            vec![date(2025, 3, 1), date(2025, 3, 20), date(2025, 3, 31), date(2025, 4, 1)]
        );

        let march = db
            .sales()
            .list_between(date(2025, 3, 1), date(2025, 3, 31))
            .await
            .unwrap();
        assert_eq!(march.len(), 3);
        assert_eq!(db.sales().count_by_project(&project.id).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_update_toggle_notes_delete() {
        let db = memory_db().await;
        let project = db.projects().ensure_current().await.unwrap();
        let mut record = sale(&project.id, date(2025, 3, 5), 30_000, 2);
        db.sales().insert(&record).await.unwrap();

        record.tours = 5;
        record.outcome = TourOutcome::NoSale;
        db.sales().update(&record).await.unwrap();
        let stored = db.sales().get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.tours, 5);
        assert!(stored.is_no_sale());

        assert!(db.sales().toggle_cancelled(&record.id).await.unwrap());
        assert!(!db.sales().toggle_cancelled(&record.id).await.unwrap());

        db.sales().update_notes(&record.id, "called back").await.unwrap();
        let stored = db.sales().get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.notes, "called back");

        db.sales().delete(&record.id).await.unwrap();
        assert!(matches!(
            db.sales().delete(&record.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(db.sales().toggle_cancelled(&record.id).await.is_err());
    }

    #[tokio::test]
    async fn test_replace_for_project() {
        let db = memory_db().await;
        let project = db.projects().ensure_current().await.unwrap();
        db.sales()
            .insert(&sale(&project.id, date(2025, 3, 5), 100, 1))
            .await
            .unwrap();

        let replacement = vec![
            sale(&project.id, date(2025, 3, 6), 200, 1),
            no_sale(&project.id, date(2025, 3, 7), 1),
        ];
        db.sales()
            .replace_for_project(&project.id, &replacement)
            .await
            .unwrap();

        let stored = db.sales().list_by_project(&project.id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, replacement[0].id);
    }
}

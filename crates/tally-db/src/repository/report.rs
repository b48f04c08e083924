//! # Saved Report Repository
//!
//! Named, frozen copies of a report period. A saved report carries its own
//! records and totals so it reads the same after the live data changes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::{CommissionLevel, Money, PeriodSummary, Project, SaleRecord, SalesTotals};

/// Payload format version written into new reports.
pub const REPORT_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub total_sales: usize,
    pub total_volume: Money,
    /// First and last record dates, absent for an empty report.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedReportContent {
    pub sales: Vec<SaleRecord>,
    pub totals: SalesTotals,
    pub commission_levels: Vec<CommissionLevel>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    pub id: String,
    pub name: String,
    pub project_id: String,
    pub project_name: String,
    pub created_at: DateTime<Utc>,
    pub content: SavedReportContent,
}

impl SavedReport {
    /// Freezes a period summary under `name`.
    pub fn build(name: &str, project: &Project, summary: &PeriodSummary, now: DateTime<Utc>) -> Self {
        let date_range = summary
            .sales
            .iter()
            .map(|s| s.date)
            .min()
            .zip(summary.sales.iter().map(|s| s.date).max());

        SavedReport {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            created_at: now,
            content: SavedReportContent {
                sales: summary.sales.clone(),
                totals: summary.totals,
                commission_levels: project.commission_levels.clone(),
                metadata: ReportMetadata {
                    version: REPORT_FORMAT_VERSION.to_string(),
                    generated_at: now,
                    total_sales: summary.sales.len(),
                    total_volume: summary.totals.total_volume,
                    date_range,
                },
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SavedReportRow {
    id: String,
    name: String,
    project_id: String,
    project_name: String,
    created_at: DateTime<Utc>,
    payload: String,
}

impl TryFrom<SavedReportRow> for SavedReport {
    type Error = DbError;

    fn try_from(row: SavedReportRow) -> DbResult<Self> {
        Ok(SavedReport {
            id: row.id,
            name: row.name,
            project_id: row.project_id,
            project_name: row.project_name,
            created_at: row.created_at,
            content: serde_json::from_str(&row.payload)?,
        })
    }
}

const SELECT_REPORT: &str = r#"
    SELECT id, name, project_id, project_name, created_at, payload
    FROM saved_reports
"#;

/// Repository for saved reports.
#[derive(Debug, Clone)]
pub struct SavedReportRepository {
    pool: SqlitePool,
}

impl SavedReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SavedReportRepository { pool }
    }

    pub async fn save(&self, report: &SavedReport) -> DbResult<()> {
        debug!(id = %report.id, name = %report.name, "Saving report");

        let payload = serde_json::to_string(&report.content)?;
        sqlx::query(
            r#"
            INSERT INTO saved_reports (id, name, project_id, project_name, created_at, payload)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&report.id)
        .bind(&report.name)
        .bind(&report.project_id)
        .bind(&report.project_name)
        .bind(report.created_at)
        .bind(payload)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The most recently saved reports, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<SavedReport>> {
        let rows: Vec<SavedReportRow> = sqlx::query_as(&format!(
            "{SELECT_REPORT} ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SavedReport::try_from).collect()
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<SavedReport>> {
        let row: Option<SavedReportRow> = sqlx::query_as(&format!("{SELECT_REPORT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SavedReport::try_from).transpose()
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM saved_reports WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Saved report", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{date, memory_db, sale};
    use tally_core::aggregate::summarize;
    use tally_core::period::generate_report_periods;

    #[tokio::test]
    async fn test_save_list_get_delete() {
        let db = memory_db().await;
        let project = db.projects().ensure_current().await.unwrap();
        let records = vec![
            sale(&project.id, date(2025, 3, 20), 30_000, 2),
            sale(&project.id, date(2025, 3, 5), 10_000, 1),
        ];
        let periods = generate_report_periods(date(2025, 3, 15));
        let summary = summarize(&records, &periods.monthly[2], &project.commission_levels);

        let report = SavedReport::build(" March ", &project, &summary, Utc::now());
        assert_eq!(report.name, "March");
        assert_eq!(report.content.metadata.total_sales, 2);
        assert_eq!(report.content.metadata.total_volume, Money::from_dollars(40_000));
        assert_eq!(
            report.content.metadata.date_range,
            Some((date(2025, 3, 5), date(2025, 3, 20)))
        );

        db.reports().save(&report).await.unwrap();
        let fetched = db.reports().get(&report.id).await.unwrap().unwrap();
        assert_eq!(fetched, report);

        db.reports().delete(&report.id).await.unwrap();
        assert!(db.reports().get(&report.id).await.unwrap().is_none());
        assert!(db.reports().delete(&report.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let db = memory_db().await;
        let project = db.projects().ensure_current().await.unwrap();
        let periods = generate_report_periods(date(2025, 3, 15));
        let summary = summarize(&[], &periods.monthly[2], &project.commission_levels);

        let base = Utc::now();
        for i in 0..5 {
            let at = base + chrono::Duration::seconds(i);
            let report = SavedReport::build(&format!("R{i}"), &project, &summary, at);
            db.reports().save(&report).await.unwrap();
        }

        let names: Vec<String> = db
            .reports()
            .list_recent(4)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["R4", "R3", "R2", "R1"]);
    }
}

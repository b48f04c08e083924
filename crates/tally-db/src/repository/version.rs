//! # Version Repository
//!
//! Auto-save snapshots of a project and all of its records.
//!
//! ## Snapshot Rotation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save_snapshot(p, max = 4)                                              │
//! │                                                                         │
//! │   versions before:   1   2   3   4                                      │
//! │   insert MAX + 1:    1   2   3   4   5                                  │
//! │   prune to newest:       2   3   4   5                                  │
//! │                                                                         │
//! │  restore(v3) ──► project row + sales replaced in ONE transaction        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots are keyed by project id only, without a foreign key, so they
//! can be restored after the project itself has been removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::project::{upsert_on, ProjectRepository};
use crate::repository::sale::{replace_on, SaleRepository};
use tally_core::{Project, SaleRecord};

/// Snapshot payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotData {
    pub project: Project,
    pub sales: Vec<SaleRecord>,
}

/// One stored version of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSnapshot {
    pub project_id: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub data: SnapshotData,
}

#[derive(Debug, sqlx::FromRow)]
struct SnapshotRow {
    project_id: String,
    version: i64,
    created_at: DateTime<Utc>,
    payload: String,
}

impl TryFrom<SnapshotRow> for VersionSnapshot {
    type Error = DbError;

    fn try_from(row: SnapshotRow) -> DbResult<Self> {
        Ok(VersionSnapshot {
            project_id: row.project_id,
            version: row.version,
            created_at: row.created_at,
            data: serde_json::from_str(&row.payload)?,
        })
    }
}

/// Repository for version snapshots.
#[derive(Debug, Clone)]
pub struct VersionRepository {
    pool: SqlitePool,
}

impl VersionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VersionRepository { pool }
    }

    /// Captures the project and its records as a new version, keeping only
    /// the newest `max_versions`.
    ///
    /// Returns `None` when the project does not exist.
    pub async fn save_snapshot(
        &self,
        project_id: &str,
        max_versions: u32,
    ) -> DbResult<Option<VersionSnapshot>> {
        let projects = ProjectRepository::new(self.pool.clone());
        let Some(project) = projects.get_by_id(project_id).await? else {
            return Ok(None);
        };
        let sales = SaleRepository::new(self.pool.clone())
            .list_by_project(project_id)
            .await?;
        let data = SnapshotData { project, sales };
        let payload = serde_json::to_string(&data)?;
        let created_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        let latest: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM version_snapshots WHERE project_id = ?1")
                .bind(project_id)
                .fetch_one(&mut *tx)
                .await?;
        let version = latest.unwrap_or(0) + 1;

        sqlx::query(
            r#"
            INSERT INTO version_snapshots (project_id, version, created_at, payload)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(project_id)
        .bind(version)
        .bind(created_at)
        .bind(&payload)
        .execute(&mut *tx)
        .await?;

        let pruned = sqlx::query(
            r#"
            DELETE FROM version_snapshots
            WHERE project_id = ?1 AND version <= ?2
            "#,
        )
        .bind(project_id)
        .bind(version - i64::from(max_versions.max(1)))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            project_id = %project_id,
            version,
            records = data.sales.len(),
            pruned = pruned.rows_affected(),
            "Saved snapshot"
        );

        Ok(Some(VersionSnapshot {
            project_id: project_id.to_string(),
            version,
            created_at,
            data,
        }))
    }

    /// Stored versions of a project, newest first.
    pub async fn list(&self, project_id: &str) -> DbResult<Vec<VersionSnapshot>> {
        let rows: Vec<SnapshotRow> = sqlx::query_as(
            r#"
            SELECT project_id, version, created_at, payload
            FROM version_snapshots
            WHERE project_id = ?1
            ORDER BY version DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VersionSnapshot::try_from).collect()
    }

    pub async fn get(&self, project_id: &str, version: i64) -> DbResult<Option<VersionSnapshot>> {
        let row: Option<SnapshotRow> = sqlx::query_as(
            r#"
            SELECT project_id, version, created_at, payload
            FROM version_snapshots
            WHERE project_id = ?1 AND version = ?2
            "#,
        )
        .bind(project_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        row.map(VersionSnapshot::try_from).transpose()
    }

    /// Puts the project row and its records back to the snapshot's state.
    pub async fn restore(&self, snapshot: &VersionSnapshot) -> DbResult<()> {
        info!(
            project_id = %snapshot.project_id,
            version = snapshot.version,
            "Restoring snapshot"
        );

        let mut tx = self.pool.begin().await?;
        upsert_on(&mut tx, &snapshot.data.project).await?;
        replace_on(&mut tx, &snapshot.project_id, &snapshot.data.sales).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Removes every version of a project. Returns the count.
    pub async fn delete_all(&self, project_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM version_snapshots WHERE project_id = ?1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

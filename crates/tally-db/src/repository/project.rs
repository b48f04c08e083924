//! # Project Repository
//!
//! Projects and their commission tier tables.
//!
//! ## Project Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  first run ──► ensure_current() ──► "March 2025" with default tiers     │
//! │                                                                         │
//! │  current() = the OLDEST project                                         │
//! │                                                                         │
//! │  save_as(src) ──► new project, src tiers, src sales under new ids       │
//! │                                                                         │
//! │  clear_all() ──► delete sales, projects, snapshots, settings            │
//! │              └─► recreate one project with the SAME id                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tier table is stored as a JSON column on the project row.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::sale::{self, SaleRepository};
use tally_core::{default_commission_levels, CommissionLevel, Project};

/// Settings whose key contains this survive a clear-all.
pub const PRESERVED_SETTINGS_PATTERN: &str = "commission";

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    commission_levels: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = DbError;

    fn try_from(row: ProjectRow) -> DbResult<Self> {
        Ok(Project {
            id: row.id,
            name: row.name,
            commission_levels: serde_json::from_str(&row.commission_levels)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_PROJECT: &str = r#"
    SELECT id, name, commission_levels, created_at, updated_at
    FROM projects
"#;

/// Name given to automatically created projects, e.g. `March 2025`.
pub fn month_project_name(now: DateTime<Utc>) -> String {
    now.format("%B %Y").to_string()
}

fn new_project(id: String, name: &str, now: DateTime<Utc>) -> Project {
    Project {
        id,
        name: name.trim().to_string(),
        commission_levels: default_commission_levels(),
        created_at: now,
        updated_at: now,
    }
}

/// Inserts or fully replaces a project row.
pub(crate) async fn upsert_on(conn: &mut SqliteConnection, project: &Project) -> DbResult<()> {
    let levels = serde_json::to_string(&project.commission_levels)?;

    sqlx::query(
        r#"
        INSERT INTO projects (id, name, commission_levels, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            commission_levels = excluded.commission_levels,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&project.id)
    .bind(&project.name)
    .bind(levels)
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Repository for project database operations.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    /// Creates a new ProjectRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProjectRepository { pool }
    }

    /// Returns the current project, creating the initial one if none exist.
    pub async fn ensure_current(&self) -> DbResult<Project> {
        if let Some(project) = self.current().await? {
            return Ok(project);
        }

        let now = Utc::now();
        let name = month_project_name(now);
        info!(name = %name, "No projects found, creating initial project");
        self.create(&name).await
    }

    /// The oldest project, if any.
    pub async fn current(&self) -> DbResult<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            "{SELECT_PROJECT} ORDER BY created_at ASC, rowid ASC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Project::try_from).transpose()
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!("{SELECT_PROJECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Project::try_from).transpose()
    }

    /// All projects, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Project>> {
        let rows: Vec<ProjectRow> = sqlx::query_as(&format!(
            "{SELECT_PROJECT} ORDER BY created_at ASC, rowid ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Project::try_from).collect()
    }

    /// Creates a project with the default tier table.
    pub async fn create(&self, name: &str) -> DbResult<Project> {
        let project = new_project(Uuid::new_v4().to_string(), name, Utc::now());
        debug!(id = %project.id, name = %project.name, "Creating project");

        let mut conn = self.pool.acquire().await?;
        upsert_on(&mut conn, &project).await?;

        Ok(project)
    }

    /// Copies a project under a new name.
    ///
    /// The copy takes the source's tier table and a copy of every sale,
    /// each under a fresh id. Dates, figures and timestamps are unchanged.
    pub async fn save_as(&self, source_id: &str, name: &str) -> DbResult<Project> {
        let source = self
            .get_by_id(source_id)
            .await?
            .ok_or_else(|| DbError::not_found("Project", source_id))?;
        let sales = SaleRepository::new(self.pool.clone())
            .list_by_project(source_id)
            .await?;

        let mut project = new_project(Uuid::new_v4().to_string(), name, Utc::now());
        project.commission_levels = source.commission_levels;

        let mut tx = self.pool.begin().await?;
        upsert_on(&mut tx, &project).await?;
        for mut record in sales.iter().cloned() {
            record.id = Uuid::new_v4().to_string();
            record.project_id = project.id.clone();
            sale::insert_on(&mut tx, &record).await?;
        }
        tx.commit().await?;

        info!(
            source = %source_id,
            id = %project.id,
            name = %project.name,
            sales = sales.len(),
            "Project saved as copy"
        );
        Ok(project)
    }

    pub async fn rename(&self, id: &str, name: &str) -> DbResult<Project> {
        debug!(id = %id, name = %name, "Renaming project");

        let result = sqlx::query("UPDATE projects SET name = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(name.trim())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Project", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Project", id))
    }

    /// Replaces the whole tier table.
    pub async fn update_commission_levels(
        &self,
        id: &str,
        levels: &[CommissionLevel],
    ) -> DbResult<()> {
        debug!(id = %id, levels = levels.len(), "Updating commission levels");

        let json = serde_json::to_string(levels)?;
        let result = sqlx::query(
            "UPDATE projects SET commission_levels = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(json)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Project", id));
        }

        Ok(())
    }

    /// Replaces the tier with the same level number, returning the new table.
    pub async fn update_level(&self, id: &str, level: CommissionLevel) -> DbResult<Vec<CommissionLevel>> {
        let project = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Project", id))?;

        let mut levels = project.commission_levels;
        let slot = levels
            .iter_mut()
            .find(|l| l.level == level.level)
            .ok_or_else(|| DbError::not_found("Commission level", level.level.to_string()))?;
        *slot = level;

        self.update_commission_levels(id, &levels).await?;
        Ok(levels)
    }

    /// Deletes every sale, project and snapshot, then recreates one project.
    ///
    /// The new project reuses the id of the previous current project so
    /// anything holding that id keeps pointing at a valid project. Settings
    /// are cleared except those whose key contains
    /// [`PRESERVED_SETTINGS_PATTERN`].
    pub async fn clear_all(&self) -> DbResult<Project> {
        let previous = self.current().await?;
        let id = previous
            .map(|p| p.id)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = Utc::now();
        let project = new_project(id, &month_project_name(now), now);

        info!(id = %project.id, "Clearing all data");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sales").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM projects").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM version_snapshots")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM settings WHERE instr(key, ?1) = 0")
            .bind(PRESERVED_SETTINGS_PATTERN)
            .execute(&mut *tx)
            .await?;
        upsert_on(&mut tx, &project).await?;

        tx.commit().await?;

        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{date, memory_db, no_sale, sale};
    use tally_core::aggregate::calculate_totals;
    use tally_core::period::generate_report_periods;
    use tally_core::{Money, Rate};

    #[tokio::test]
    async fn test_ensure_current_creates_once() {
        let db = memory_db().await;
        let first = db.projects().ensure_current().await.unwrap();
        let second = db.projects().ensure_current().await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.commission_levels, default_commission_levels());
        assert_eq!(db.projects().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_current_is_oldest() {
        let db = memory_db().await;
        let first = db.projects().create("First").await.unwrap();
        db.projects().create("Second").await.unwrap();

        let current = db.projects().current().await.unwrap().unwrap();
        assert_eq!(current.id, first.id);

        let names: Vec<String> = db
            .projects()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_rename() {
        let db = memory_db().await;
        let project = db.projects().create("Old").await.unwrap();
        let renamed = db.projects().rename(&project.id, " New ").await.unwrap();
        assert_eq!(renamed.name, "New");

        let missing = db.projects().rename("nope", "x").await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_level() {
        let db = memory_db().await;
        let project = db.projects().create("P").await.unwrap();

        let mut level = project.commission_levels[0];
        level.additional_rate = Rate::from_bps(150);
        level.max_volume = Money::from_dollars(243_000);
        db.projects().update_level(&project.id, level).await.unwrap();

        let stored = db.projects().get_by_id(&project.id).await.unwrap().unwrap();
        assert_eq!(stored.commission_levels[0].additional_rate, Rate::from_bps(150));
        assert_eq!(stored.commission_levels[1], project.commission_levels[1]);

        let mut unknown = level;
        unknown.level = 42;
        assert!(db.projects().update_level(&project.id, unknown).await.is_err());
    }

    #[tokio::test]
    async fn test_clear_all_keeps_current_id() {
        let db = memory_db().await;
        let project = db.projects().ensure_current().await.unwrap();
        db.projects().create("Other").await.unwrap();
        db.sales()
            .insert(&sale(&project.id, date(2025, 3, 1), 10_000, 1))
            .await
            .unwrap();
        db.settings().set("last_selected_period", "March 2025").await.unwrap();
        db.settings().set("commission_view", "table").await.unwrap();

        let fresh = db.projects().clear_all().await.unwrap();

        assert_eq!(fresh.id, project.id);
        assert_eq!(db.projects().list().await.unwrap().len(), 1);
        assert!(db.sales().list_all().await.unwrap().is_empty());
        assert_eq!(db.settings().get("last_selected_period").await.unwrap(), None);
        assert_eq!(
            db.settings().get("commission_view").await.unwrap().as_deref(),
            Some("table")
        );
    }

    #[tokio::test]
    async fn test_save_as_copies_tiers_and_sales() {
        let db = memory_db().await;
        let source = db.projects().create("Source").await.unwrap();
        let mut level = source.commission_levels[0];
        level.additional_rate = Rate::from_bps(175);
        db.projects().update_level(&source.id, level).await.unwrap();

        for record in [
            sale(&source.id, date(2025, 3, 1), 30_000, 2),
            sale(&source.id, date(2025, 3, 12), 55_000, 1),
            no_sale(&source.id, date(2025, 3, 20), 3),
        ] {
            db.sales().insert(&record).await.unwrap();
        }

        let copy = db.projects().save_as(&source.id, " Source copy ").await.unwrap();
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.name, "Source copy");
        assert_eq!(copy.commission_levels[0].additional_rate, Rate::from_bps(175));

        let original = db.sales().list_by_project(&source.id).await.unwrap();
        let copied = db.sales().list_by_project(&copy.id).await.unwrap();
        assert_eq!(copied.len(), original.len());
        assert!(copied.iter().all(|c| original.iter().all(|o| o.id != c.id)));

        let periods = generate_report_periods(date(2025, 3, 1));
        let march = periods.month(3).unwrap();
        assert_eq!(
            calculate_totals(&copied, march),
            calculate_totals(&original, march)
        );
        assert_eq!(calculate_totals(&copied, march).total_tours, 6);
    }

    #[tokio::test]
    async fn test_save_as_missing_source() {
        let db = memory_db().await;
        let result = db.projects().save_as("nope", "Copy").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert!(db.projects().list().await.unwrap().is_empty());
    }

    #[test]
    fn test_month_project_name() {
        let now = date(2025, 3, 15).and_hms_opt(12, 0, 0).unwrap().and_utc();
        assert_eq!(month_project_name(now), "March 2025");
    }
}

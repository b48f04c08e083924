//! # Application Context
//!
//! Shared state handed to every command.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppContext                                                             │
//! │  ├── db        Arc<Database>   record store (sqlx pool)                 │
//! │  ├── config    TallyConfig     read-only after startup                  │
//! │  ├── project   Option<String>  --project override                       │
//! │  └── today     NaiveDate       local date used for period selection     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Period Selection
//! ```text
//! --start D            rolling window from D (45day unless --range 90day)
//! --month M [--year Y] monthly window
//! --range R [--year Y] default window of that range
//! (no flags)           last selected window, else the current month
//! ```
//! An explicit selection is remembered in the settings store.
//!
//! ## Pricing Volume
//! The tier rate of an entry comes from the active volume of the pricing
//! period. An edit is priced against every OTHER entry in that period, never
//! its own amount, so saving an entry twice cannot move it into a higher tier.

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use tracing::{debug, warn};

use crate::cli::PeriodArgs;
use crate::error::{CliError, CliResult};
use tally_backup::TallyConfig;
use tally_core::aggregate::{calculate_totals, summarize};
use tally_core::period::generate_report_periods;
use tally_core::{CoreError, Money, PeriodSummary, Project, RangeKind, ReportPeriod};
use tally_db::{Database, LAST_SELECTED_PERIOD};

pub struct AppContext {
    pub db: Arc<Database>,
    pub config: TallyConfig,
    project_id: Option<String>,
    today: NaiveDate,
}

impl AppContext {
    pub fn new(db: Arc<Database>, config: TallyConfig, project_id: Option<String>) -> Self {
        AppContext {
            db,
            config,
            project_id,
            today: Local::now().date_naive(),
        }
    }

    /// Pins the date used for period selection.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// The `--project` project, else the current one (created if missing).
    pub async fn project(&self) -> CliResult<Project> {
        match &self.project_id {
            Some(id) => self
                .db
                .projects()
                .get_by_id(id)
                .await?
                .ok_or_else(|| CoreError::ProjectNotFound(id.clone()).into()),
            None => Ok(self.db.projects().ensure_current().await?),
        }
    }

    // =========================================================================
    // Periods
    // =========================================================================

    /// Resolves the period flags, remembering an explicit choice.
    pub async fn select_period(&self, args: &PeriodArgs) -> CliResult<ReportPeriod> {
        if args.is_explicit() {
            let period = resolve_period(args, self.today)?;
            self.remember_period(&period).await?;
            return Ok(period);
        }

        match self.last_period().await? {
            Some(period) => Ok(period),
            None => month_of(self.today),
        }
    }

    async fn last_period(&self) -> CliResult<Option<ReportPeriod>> {
        let Some(raw) = self.db.settings().get(LAST_SELECTED_PERIOD).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(period) => Ok(Some(period)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable last selected period");
                Ok(None)
            }
        }
    }

    async fn remember_period(&self, period: &ReportPeriod) -> CliResult<()> {
        debug!(title = %period.title, "Remembering selected period");
        let json = serde_json::to_string(period)?;
        self.db.settings().set(LAST_SELECTED_PERIOD, &json).await?;
        Ok(())
    }

    /// Records and totals of `project` within `period`.
    pub async fn summary(&self, project: &Project, period: &ReportPeriod) -> CliResult<PeriodSummary> {
        let sales = self.db.sales().list_by_project(&project.id).await?;
        Ok(summarize(&sales, period, &project.commission_levels))
    }

    /// Active volume the tier rate of a new entry is looked up from.
    ///
    /// Uses the last selected period, or the month of `date` when none is
    /// stored. `exclude` leaves out the entry being edited; its previous
    /// amount never counts toward its own tier.
    pub async fn pricing_volume(
        &self,
        project_id: &str,
        date: NaiveDate,
        exclude: Option<&str>,
    ) -> CliResult<Money> {
        let period = match self.last_period().await? {
            Some(period) => period,
            None => month_of(date)?,
        };

        let mut sales = self.db.sales().list_by_project(project_id).await?;
        if let Some(id) = exclude {
            sales.retain(|s| s.id != id);
        }

        let volume = calculate_totals(&sales, &period).total_volume;
        debug!(period = %period.title, volume = %volume, "Pricing volume");
        Ok(volume)
    }
}

/// Maps period flags to a window. Pure; `today` anchors the defaults.
pub fn resolve_period(args: &PeriodArgs, today: NaiveDate) -> CliResult<ReportPeriod> {
    if let Some(start) = args.start {
        let kind = args.range.unwrap_or(RangeKind::Rolling45);
        return ReportPeriod::rolling(kind, start).ok_or_else(|| {
            CliError::validation("--start needs a rolling range (45day or 90day)")
        });
    }

    let anchor = match args.year {
        Some(year) if year != today.year() => NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| CliError::validation(format!("Invalid year: {}", year)))?,
        _ => today,
    };
    let group = generate_report_periods(anchor);

    if let Some(month) = args.month {
        if matches!(args.range, Some(kind) if kind != RangeKind::Monthly) {
            return Err(CliError::validation("--month only applies to monthly reports"));
        }
        return group
            .month(month)
            .cloned()
            .ok_or_else(|| CoreError::PeriodNotFound(format!("month {}", month)).into());
    }

    let kind = args.range.unwrap_or(RangeKind::Monthly);
    group
        .select(kind, anchor)
        .cloned()
        .ok_or_else(|| CoreError::PeriodNotFound(kind.to_string()).into())
}

fn month_of(date: NaiveDate) -> CliResult<ReportPeriod> {
    generate_report_periods(date)
        .select(RangeKind::Monthly, date)
        .cloned()
        .ok_or_else(|| CoreError::PeriodNotFound(date.to_string()).into())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tally_db::DbConfig;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// In-memory context pinned to 2025-03-15.
    pub async fn context() -> AppContext {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AppContext::new(Arc::new(db), TallyConfig::default(), None).with_today(date(2025, 3, 15))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{context, date};
    use super::*;
    use crate::error::ErrorCode;

    fn args() -> PeriodArgs {
        PeriodArgs::default()
    }

    #[test]
    fn test_resolve_defaults_to_current_month() {
        let period = resolve_period(&args(), date(2025, 3, 15)).unwrap();
        assert_eq!(period.title, "March 2025");
    }

    #[test]
    fn test_resolve_month_and_year() {
        let period = resolve_period(
            &PeriodArgs {
                month: Some(7),
                year: Some(2024),
                ..args()
            },
            date(2025, 3, 15),
        )
        .unwrap();
        assert_eq!(period.title, "July 2024");
        assert_eq!(period.end, date(2024, 7, 31));
    }

    #[test]
    fn test_resolve_annual() {
        let period = resolve_period(
            &PeriodArgs {
                range: Some(RangeKind::Annual),
                ..args()
            },
            date(2025, 3, 15),
        )
        .unwrap();
        assert_eq!(period.title, "Annual Report 2025");
    }

    #[test]
    fn test_resolve_rolling_start() {
        let period = resolve_period(
            &PeriodArgs {
                range: Some(RangeKind::Rolling90),
                start: Some(date(2025, 1, 1)),
                ..args()
            },
            date(2025, 3, 15),
        )
        .unwrap();
        assert_eq!(period.kind, RangeKind::Rolling90);
        assert_eq!(period.start, date(2025, 1, 1));
        assert_eq!(period.end, date(2025, 4, 1));
    }

    #[test]
    fn test_resolve_rejects_conflicting_flags() {
        let err = resolve_period(
            &PeriodArgs {
                range: Some(RangeKind::Annual),
                start: Some(date(2025, 1, 1)),
                ..args()
            },
            date(2025, 3, 15),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);

        let err = resolve_period(
            &PeriodArgs {
                range: Some(RangeKind::Annual),
                month: Some(2),
                ..args()
            },
            date(2025, 3, 15),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn test_explicit_selection_is_remembered() {
        let ctx = context().await;

        let first = ctx.select_period(&args()).await.unwrap();
        assert_eq!(first.title, "March 2025");

        let chosen = ctx
            .select_period(&PeriodArgs {
                range: Some(RangeKind::Rolling45),
                start: Some(date(2025, 2, 1)),
                ..args()
            })
            .await
            .unwrap();

        let again = ctx.select_period(&args()).await.unwrap();
        assert_eq!(again, chosen);
    }

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let db = Database::new(tally_db::DbConfig::in_memory()).await.unwrap();
        let ctx = AppContext::new(Arc::new(db), TallyConfig::default(), Some("nope".into()));
        let err = ctx.project().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}

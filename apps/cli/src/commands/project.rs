//! Project commands.

use tracing::info;

use crate::cli::{ProjectCommand, SetLevelArgs};
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output;
use tally_core::validation::{validate_levels, validate_name};

pub async fn run(ctx: &AppContext, command: ProjectCommand) -> CliResult<String> {
    match command {
        ProjectCommand::Show => show(ctx).await,
        ProjectCommand::List => list(ctx).await,
        ProjectCommand::New { name } => create(ctx, &name).await,
        ProjectCommand::SaveAs { name } => save_as(ctx, &name).await,
        ProjectCommand::Rename { name } => rename(ctx, &name).await,
        ProjectCommand::Levels => levels(ctx).await,
        ProjectCommand::SetLevel(args) => set_level(ctx, args).await,
    }
}

async fn show(ctx: &AppContext) -> CliResult<String> {
    let project = ctx.project().await?;
    let count = ctx.db.sales().count_by_project(&project.id).await?;

    Ok(format!(
        "{}\nid:      {}\ncreated: {}\nentries: {}\n\n{}",
        project.name,
        project.id,
        project.created_at.format("%Y-%m-%d %H:%M"),
        count,
        output::levels_table(&project.commission_levels)
    ))
}

async fn list(ctx: &AppContext) -> CliResult<String> {
    let current = ctx.project().await?;
    let projects = ctx.db.projects().list().await?;
    Ok(output::projects_table(&projects, Some(&current.id)))
}

async fn create(ctx: &AppContext, name: &str) -> CliResult<String> {
    validate_name("project name", name)?;
    let project = ctx.db.projects().create(name.trim()).await?;
    info!(id = %project.id, name = %project.name, "Project created");
    Ok(format!("Created project {} ({})", project.name, project.id))
}

async fn save_as(ctx: &AppContext, name: &str) -> CliResult<String> {
    validate_name("project name", name)?;
    let source = ctx.project().await?;
    let copy = ctx.db.projects().save_as(&source.id, name).await?;
    let count = ctx.db.sales().count_by_project(&copy.id).await?;

    Ok(format!(
        "Saved '{}' as {} ({}) with {} entries",
        source.name, copy.name, copy.id, count
    ))
}

async fn rename(ctx: &AppContext, name: &str) -> CliResult<String> {
    validate_name("project name", name)?;
    let project = ctx.project().await?;
    let renamed = ctx.db.projects().rename(&project.id, name).await?;
    Ok(format!("Renamed '{}' to '{}'", project.name, renamed.name))
}

async fn levels(ctx: &AppContext) -> CliResult<String> {
    let project = ctx.project().await?;
    Ok(output::levels_table(&project.commission_levels))
}

async fn set_level(ctx: &AppContext, args: SetLevelArgs) -> CliResult<String> {
    let project = ctx.project().await?;

    let mut level = project
        .commission_levels
        .iter()
        .find(|l| l.level == args.level)
        .copied()
        .ok_or_else(|| CliError::not_found("Commission level", &args.level.to_string()))?;

    if let Some(min) = args.min {
        level.min_volume = min;
    }
    if let Some(max) = args.max {
        level.max_volume = max;
    }
    if let Some(rate) = args.rate {
        level.additional_rate = rate;
    }

    let candidate: Vec<_> = project
        .commission_levels
        .iter()
        .map(|l| if l.level == level.level { level } else { *l })
        .collect();
    validate_levels(&candidate)?;

    let levels = ctx.db.projects().update_level(&project.id, level).await?;
    info!(project = %project.name, level = level.level, "Commission level updated");
    Ok(output::levels_table(&levels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::{context, date};
    use crate::error::ErrorCode;
    use chrono::Utc;
    use tally_core::entry::{price_draft, DraftOutcome, SaleDraft};
    use tally_core::{ManagerName, Money, Points, Rate, SaleRecord, SaleType, TrustPoints};

    fn sale(project_id: &str, on: chrono::NaiveDate, dollars: i64) -> SaleRecord {
        let draft = SaleDraft {
            date: on,
            tours: 1,
            lead_number: String::new(),
            notes: String::new(),
            is_cancelled: false,
            outcome: DraftOutcome::Sale {
                client_last_name: "Garcia".into(),
                manager: ManagerName::Kathie,
                sale_type: SaleType::Trust,
                sale_amount: Money::from_dollars(dollars),
                fdi_given_points: Points::zero(),
                trust_points: TrustPoints::default(),
            },
        };
        let outcome = price_draft(&draft, Money::zero(), &[]);
        draft.into_record(uuid::Uuid::new_v4().to_string(), project_id.to_string(), outcome, Utc::now())
    }

    #[tokio::test]
    async fn test_show_creates_initial_project() {
        let ctx = context().await;
        let text = show(&ctx).await.unwrap();
        assert!(text.contains("entries: 0"));
        assert_eq!(ctx.db.projects().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let ctx = context().await;
        ctx.project().await.unwrap();
        create(&ctx, "  Spring Push ").await.unwrap();

        let text = list(&ctx).await.unwrap();
        assert!(text.contains("Spring Push"));
        assert_eq!(text.lines().filter(|l| l.starts_with('*')).count(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let ctx = context().await;
        let err = create(&ctx, "   ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn test_save_as_copies_current_project() {
        let ctx = context().await;
        let source = ctx.project().await.unwrap();
        for on in [date(2025, 3, 2), date(2025, 3, 9)] {
            ctx.db
                .sales()
                .insert(&sale(&source.id, on, 20_000))
                .await
                .unwrap();
        }

        let text = save_as(&ctx, "March backup").await.unwrap();
        assert!(text.contains("with 2 entries"));

        let projects = ctx.db.projects().list().await.unwrap();
        assert_eq!(projects.len(), 2);
        let copy = projects.iter().find(|p| p.name == "March backup").unwrap();
        assert_eq!(ctx.db.sales().count_by_project(&copy.id).await.unwrap(), 2);
        assert_eq!(ctx.db.sales().count_by_project(&source.id).await.unwrap(), 2);
        assert_eq!(ctx.project().await.unwrap().id, source.id);

        let err = save_as(&ctx, "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn test_rename() {
        let ctx = context().await;
        rename(&ctx, "Q1 Team").await.unwrap();
        assert_eq!(ctx.project().await.unwrap().name, "Q1 Team");
    }

    #[tokio::test]
    async fn test_set_level_updates_rate() {
        let ctx = context().await;
        set_level(
            &ctx,
            SetLevelArgs {
                level: 1,
                min: None,
                max: None,
                rate: Some(Rate::from_bps(150)),
            },
        )
        .await
        .unwrap();

        let project = ctx.project().await.unwrap();
        assert_eq!(project.commission_levels[0].additional_rate, Rate::from_bps(150));
    }

    #[tokio::test]
    async fn test_set_level_rejects_overlap() {
        let ctx = context().await;
        let err = set_level(
            &ctx,
            SetLevelArgs {
                level: 1,
                min: None,
                max: Some(Money::from_dollars(300_000)),
                rate: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);

        let project = ctx.project().await.unwrap();
        assert_eq!(project.commission_levels[0].max_volume, Money::from_dollars(243_749));
    }

    #[tokio::test]
    async fn test_set_level_unknown_level() {
        let ctx = context().await;
        let err = set_level(
            &ctx,
            SetLevelArgs {
                level: 42,
                min: None,
                max: None,
                rate: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}

//! Version history commands.

use tracing::info;

use crate::cli::VersionCommand;
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output;

pub async fn run(ctx: &AppContext, command: VersionCommand) -> CliResult<String> {
    match command {
        VersionCommand::List => list(ctx).await,
        VersionCommand::Save => save(ctx).await,
        VersionCommand::Restore { version } => restore(ctx, version).await,
    }
}

async fn list(ctx: &AppContext) -> CliResult<String> {
    let project = ctx.project().await?;
    let versions = ctx.db.versions().list(&project.id).await?;
    Ok(output::versions_table(&versions))
}

async fn save(ctx: &AppContext) -> CliResult<String> {
    let project = ctx.project().await?;
    let snapshot = ctx
        .db
        .versions()
        .save_snapshot(&project.id, ctx.config.autosave.max_versions)
        .await?
        .ok_or_else(|| CliError::not_found("Project", &project.id))?;

    Ok(format!(
        "Saved version {} of {} ({} entries)",
        snapshot.version,
        project.name,
        snapshot.data.sales.len()
    ))
}

async fn restore(ctx: &AppContext, version: i64) -> CliResult<String> {
    let project = ctx.project().await?;
    let snapshot = ctx
        .db
        .versions()
        .get(&project.id, version)
        .await?
        .ok_or_else(|| CliError::not_found("Version", &version.to_string()))?;

    ctx.db.versions().restore(&snapshot).await?;

    info!(project_id = %project.id, version, "Version restored");
    Ok(format!(
        "Restored version {} of {} ({} entries)",
        snapshot.version,
        snapshot.data.project.name,
        snapshot.data.sales.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::context;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_save_list_restore() {
        let ctx = context().await;
        let project = ctx.project().await.unwrap();

        save(&ctx).await.unwrap();
        ctx.db.projects().rename(&project.id, "Renamed").await.unwrap();
        save(&ctx).await.unwrap();

        let text = list(&ctx).await.unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("v2"));

        restore(&ctx, 1).await.unwrap();
        assert_eq!(ctx.project().await.unwrap().name, project.name);
    }

    #[tokio::test]
    async fn test_restore_missing_version() {
        let ctx = context().await;
        let err = restore(&ctx, 7).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_retention_follows_config() {
        let mut ctx = context().await;
        ctx.config.autosave.max_versions = 2;

        for _ in 0..4 {
            save(&ctx).await.unwrap();
        }
        let text = list(&ctx).await.unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}

//! Clear command: wipes every project, entry and version.

use tracing::warn;

use crate::context::AppContext;
use crate::error::{CliError, CliResult};

pub async fn run(ctx: &AppContext, yes: bool) -> CliResult<String> {
    if !yes {
        return Err(CliError::validation(
            "This deletes all projects, entries and versions. Re-run with --yes to confirm.",
        ));
    }

    warn!("Clearing all data");
    let project = ctx.db.projects().clear_all().await?;
    Ok(format!("All data cleared. Current project: {} ({})", project.name, project.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::context;
    use crate::error::ErrorCode;
    use tally_db::LAST_SELECTED_PERIOD;

    #[tokio::test]
    async fn test_requires_confirmation() {
        let ctx = context().await;
        let err = run(&ctx, false).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn test_clear_keeps_project_id() {
        let ctx = context().await;
        let project = ctx.project().await.unwrap();
        ctx.db.projects().create("Second").await.unwrap();
        ctx.db.settings().set(LAST_SELECTED_PERIOD, "{}").await.unwrap();
        ctx.db
            .versions()
            .save_snapshot(&project.id, 4)
            .await
            .unwrap();

        run(&ctx, true).await.unwrap();

        let projects = ctx.db.projects().list().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, project.id);
        assert!(ctx.db.versions().list(&project.id).await.unwrap().is_empty());
        assert_eq!(ctx.db.settings().get(LAST_SELECTED_PERIOD).await.unwrap(), None);
    }
}

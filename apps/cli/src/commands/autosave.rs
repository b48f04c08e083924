//! Foreground auto-save: runs the service until Ctrl-C.

use std::future::Future;

use tracing::info;

use crate::context::AppContext;
use crate::error::{CliError, CliResult, ErrorCode};
use tally_backup::AutoSaveService;

pub async fn run(ctx: &AppContext) -> CliResult<String> {
    run_until(ctx, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    })
    .await
}

/// Runs auto-save until `stop` completes.
async fn run_until(ctx: &AppContext, stop: impl Future<Output = ()>) -> CliResult<String> {
    if !ctx.config.autosave.enabled {
        return Ok("Auto-save is disabled in the configuration".to_string());
    }

    ctx.project().await?;

    let (service, handle) = AutoSaveService::new(ctx.db.clone(), ctx.config.autosave.clone());
    let task = tokio::spawn(service.run());
    info!(
        interval_secs = ctx.config.autosave.interval_secs,
        "Auto-save running, press Ctrl-C to stop"
    );

    stop.await;

    handle.shutdown().await?;
    task.await
        .map_err(|e| CliError::new(ErrorCode::Internal, format!("Auto-save task failed: {}", e)))?;

    Ok("Auto-save stopped".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::context;
    use std::time::Duration;

    #[tokio::test]
    async fn test_runs_until_stopped() {
        let ctx = context().await;
        let text = run_until(&ctx, tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();
        assert_eq!(text, "Auto-save stopped");

        let project = ctx.project().await.unwrap();
        assert_eq!(ctx.db.versions().list(&project.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled() {
        let mut ctx = context().await;
        ctx.config.autosave.enabled = false;
        let text = run_until(&ctx, async {}).await.unwrap();
        assert!(text.contains("disabled"));
    }
}

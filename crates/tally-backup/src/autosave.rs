//! # Auto-save Service
//!
//! Periodically snapshots every project into version history.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  let (service, handle) = AutoSaveService::new(db, settings);            │
//! │  let task = tokio::spawn(service.run());                                │
//! │                                                                         │
//! │  loop {                                                                 │
//! │      select! {                                                          │
//! │          interval.tick()   ──► save_now()  (errors logged, loop goes on)│
//! │          shutdown_rx.recv() ──► break                                   │
//! │      }                                                                  │
//! │  }                                                                      │
//! │                                                                         │
//! │  handle.shutdown().await?;  task.await;                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first tick fires immediately, so a freshly started service saves once
//! right away.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::AutoSaveSettings;
use crate::error::{BackupError, BackupResult};
use tally_db::Database;

/// Outcome of one snapshot pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePass {
    pub at: DateTime<Utc>,
    /// Projects snapshotted.
    pub saved: usize,
    /// Projects that failed; the pass carries on past them.
    pub failed: usize,
}

/// Handle for stopping a running [`AutoSaveService`].
#[derive(Clone)]
pub struct AutoSaveHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl AutoSaveHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> BackupResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| BackupError::ChannelClosed("Auto-save already stopped".into()))
    }
}

pub struct AutoSaveService {
    db: Arc<Database>,
    settings: AutoSaveSettings,
    shutdown_rx: mpsc::Receiver<()>,
}

impl AutoSaveService {
    /// Creates the service and the handle that stops it.
    pub fn new(db: Arc<Database>, settings: AutoSaveSettings) -> (Self, AutoSaveHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let service = AutoSaveService {
            db,
            settings,
            shutdown_rx,
        };

        (service, AutoSaveHandle { shutdown_tx })
    }

    /// Runs the auto-save loop until shutdown.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        if !self.settings.enabled {
            info!("Auto-save disabled");
            return;
        }

        info!(
            interval_secs = self.settings.interval_secs,
            max_versions = self.settings.max_versions,
            "Auto-save starting"
        );

        let period = Duration::from_secs(self.settings.interval_secs.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.save_now().await {
                        error!(?e, "Auto-save pass failed");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Auto-save shutting down");
                    break;
                }
            }
        }

        info!("Auto-save stopped");
    }

    /// Snapshots every project once.
    pub async fn save_now(&self) -> BackupResult<SavePass> {
        let projects = self.db.projects().list().await?;
        let mut pass = SavePass {
            at: Utc::now(),
            saved: 0,
            failed: 0,
        };

        for project in &projects {
            match self
                .db
                .versions()
                .save_snapshot(&project.id, self.settings.max_versions)
                .await
            {
                Ok(Some(snapshot)) => {
                    debug!(project = %project.name, version = snapshot.version, "Project saved");
                    pass.saved += 1;
                }
                Ok(None) => {
                    debug!(project_id = %project.id, "Project vanished before save");
                }
                Err(e) => {
                    warn!(project_id = %project.id, error = %e, "Failed to save project");
                    pass.failed += 1;
                }
            }
        }

        Ok(pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_db::DbConfig;

    async fn db_with_projects(names: &[&str]) -> Arc<Database> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for name in names {
            db.projects().create(name).await.unwrap();
        }
        Arc::new(db)
    }

    #[tokio::test]
    async fn test_save_now_snapshots_every_project() {
        let db = db_with_projects(&["A", "B"]).await;
        let (service, _handle) = AutoSaveService::new(db.clone(), AutoSaveSettings::default());

        let pass = service.save_now().await.unwrap();
        assert_eq!(pass.saved, 2);
        assert_eq!(pass.failed, 0);

        for project in db.projects().list().await.unwrap() {
            assert_eq!(db.versions().list(&project.id).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_retention_applies() {
        let db = db_with_projects(&["A"]).await;
        let settings = AutoSaveSettings {
            max_versions: 2,
            ..AutoSaveSettings::default()
        };
        let (service, _handle) = AutoSaveService::new(db.clone(), settings);

        for _ in 0..5 {
            service.save_now().await.unwrap();
        }

        let project = db.projects().current().await.unwrap().unwrap();
        let versions: Vec<i64> = db
            .versions()
            .list(&project.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(versions, vec![5, 4]);
    }

    #[tokio::test]
    async fn test_run_saves_then_stops_on_shutdown() {
        let db = db_with_projects(&["A"]).await;
        let (service, handle) = AutoSaveService::new(db.clone(), AutoSaveSettings::default());

        let task = tokio::spawn(service.run());
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.shutdown().await.unwrap();
        task.await.unwrap();

        let project = db.projects().current().await.unwrap().unwrap();
        assert_eq!(db.versions().list(&project.id).await.unwrap().len(), 1);

        assert!(handle.shutdown().await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_returns_immediately() {
        let db = db_with_projects(&["A"]).await;
        let settings = AutoSaveSettings {
            enabled: false,
            ..AutoSaveSettings::default()
        };
        let (service, _handle) = AutoSaveService::new(db.clone(), settings);
        service.run().await;

        let project = db.projects().current().await.unwrap().unwrap();
        assert!(db.versions().list(&project.id).await.unwrap().is_empty());
    }
}

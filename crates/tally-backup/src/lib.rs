//! # tally-backup: Auto-save and Configuration
//!
//! Keeps rolling version history of every project and loads the
//! application configuration.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  apps/cli ──► TallyConfig::load_or_default()                            │
//! │     │                                                                   │
//! │     └──► AutoSaveService::new(db, config.autosave)                     │
//! │               │ every interval_secs                                     │
//! │               ▼                                                         │
//! │          tally-db VersionRepository::save_snapshot(project, max)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - TOML file, environment overrides, defaults
//! - [`autosave`] - Interval snapshot service and its shutdown handle
//! - [`error`] - Backup error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod autosave;
pub mod config;
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

pub use autosave::{AutoSaveHandle, AutoSaveService, SavePass};
pub use config::{AutoSaveSettings, TallyConfig};
pub use error::{BackupError, BackupResult};

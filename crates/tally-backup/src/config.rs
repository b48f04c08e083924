//! # Tally Configuration
//!
//! Settings for the database location, auto-save and exports.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_DB_PATH=/data/tally.db                                       │
//! │     TALLY_AUTOSAVE_INTERVAL_SECS=30                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tally/tally.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.tally.tally/tally.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     data-dir database, 60 s auto-save, 4 versions                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # tally.toml
//! [database]
//! path = "/home/me/tally.db"
//!
//! [autosave]
//! enabled = true
//! interval_secs = 60
//! max_versions = 4
//!
//! [export]
//! output_dir = "/home/me/reports"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{BackupError, BackupResult};

/// Database file name inside the platform data directory.
pub const DEFAULT_DB_FILE: &str = "tally.db";

/// Config file name inside the platform config directory.
pub const CONFIG_FILE: &str = "tally.toml";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Explicit database file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSaveSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between snapshot passes.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Versions kept per project; older ones are pruned.
    #[serde(default = "default_max_versions")]
    pub max_versions: u32,
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    60
}

fn default_max_versions() -> u32 {
    4
}

impl Default for AutoSaveSettings {
    fn default() -> Self {
        AutoSaveSettings {
            enabled: default_true(),
            interval_secs: default_interval(),
            max_versions: default_max_versions(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Where exported reports are written. Defaults to the working directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

// =============================================================================
// Tally Config
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub autosave: AutoSaveSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

impl TallyConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (tally.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> BackupResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> BackupResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| BackupError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> BackupResult<()> {
        if self.autosave.interval_secs == 0 {
            return Err(BackupError::InvalidConfig(
                "autosave.interval_secs must be greater than 0".into(),
            ));
        }

        if self.autosave.max_versions == 0 {
            return Err(BackupError::InvalidConfig(
                "autosave.max_versions must be greater than 0".into(),
            ));
        }

        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(BackupError::InvalidConfig("database.path is empty".into()));
            }
        }

        Ok(())
    }

    /// Applies `TALLY_*` overrides read through `var`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("TALLY_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(raw) = var("TALLY_AUTOSAVE_INTERVAL_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => self.autosave.interval_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring invalid TALLY_AUTOSAVE_INTERVAL_SECS"),
            }
        }

        if let Some(raw) = var("TALLY_MAX_VERSIONS") {
            match raw.parse::<u32>() {
                Ok(max) => self.autosave.max_versions = max,
                Err(_) => warn!(value = %raw, "Ignoring invalid TALLY_MAX_VERSIONS"),
            }
        }

        if let Some(raw) = var("TALLY_AUTOSAVE_ENABLED") {
            match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.autosave.enabled = true,
                "0" | "false" | "no" | "off" => self.autosave.enabled = false,
                _ => warn!(value = %raw, "Ignoring invalid TALLY_AUTOSAVE_ENABLED"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "tally")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Configured database file, else `<data dir>/tally.db`, else `./tally.db`.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database.path {
            return path.clone();
        }

        directories::ProjectDirs::from("com", "tally", "tally")
            .map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

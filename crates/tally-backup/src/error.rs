//! # Backup Error Types
//!
//! Errors from configuration loading and the auto-save service.

use thiserror::Error;

use tally_db::DbError;

/// Result type alias for backup operations.
pub type BackupResult<T> = Result<T, BackupError>;

#[derive(Debug, Error)]
pub enum BackupError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Service Errors
    // =========================================================================
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// The auto-save task has already stopped.
    #[error("Channel error: {0}")]
    ChannelClosed(String),
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        BackupError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for BackupError {
    fn from(err: toml::de::Error) -> Self {
        BackupError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for BackupError {
    fn from(err: toml::ser::Error) -> Self {
        BackupError::ConfigSaveFailed(err.to_string())
    }
}

impl BackupError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BackupError::InvalidConfig(_)
                | BackupError::ConfigLoadFailed(_)
                | BackupError::ConfigSaveFailed(_)
        )
    }
}

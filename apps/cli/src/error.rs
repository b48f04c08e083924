//! # CLI Error Type
//!
//! Unified error type for every command.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  command fn ── Result<String, CliError>                                 │
//! │       │                                                                 │
//! │       ├── DbError::NotFound        ──► NotFound        exit 3           │
//! │       ├── ValidationError          ──► Validation      exit 2           │
//! │       ├── DbError::QueryFailed     ──► Database        exit 4           │
//! │       ├── BackupError (config)     ──► Config          exit 5           │
//! │       ├── ExportError / io::Error  ──► Output          exit 6           │
//! │       └── anything else            ──► Internal        exit 1           │
//! │                                                                         │
//! │  main() prints "error: <message>" to stderr and exits with the code.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use tally_backup::BackupError;
use tally_core::{CoreError, ValidationError};
use tally_db::DbError;
use tally_export::ExportError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound,
    Validation,
    Database,
    Config,
    Output,
    Internal,
}

impl ErrorCode {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::Internal => 1,
            ErrorCode::Validation => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::Database => 4,
            ErrorCode::Config => 5,
            ErrorCode::Output => 6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        CliError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Validation, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CliError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => CliError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                CliError::validation("Invalid reference")
            }
            DbError::InvalidData(e) => {
                tracing::error!("Invalid stored data: {}", e);
                CliError::new(ErrorCode::Database, format!("Stored data is invalid: {}", e))
            }
            other => {
                tracing::error!("Database error: {}", other);
                CliError::new(ErrorCode::Database, other.to_string())
            }
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SaleNotFound(id) => CliError::not_found("Sale", &id),
            CoreError::ProjectNotFound(id) => CliError::not_found("Project", &id),
            CoreError::PeriodNotFound(title) => CliError::not_found("Report period", &title),
            CoreError::InvalidCommissionLevels { reason } => {
                CliError::validation(format!("Invalid commission levels: {}", reason))
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<BackupError> for CliError {
    fn from(err: BackupError) -> Self {
        match err {
            BackupError::Database(e) => e.into(),
            e if e.is_config_error() => CliError::new(ErrorCode::Config, e.to_string()),
            e => CliError::new(ErrorCode::Internal, e.to_string()),
        }
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnknownFormat(_) => CliError::validation(err.to_string()),
            other => CliError::new(ErrorCode::Output, other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::new(ErrorCode::Output, err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::new(ErrorCode::Internal, err.to_string())
    }
}

//! Error types for mkan
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown task, malformed stored data)
//! - 3: Blocked by policy (archiving a task that is not done)
//! - 4: Operation failed (storage IO, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the mkan CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const POLICY_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for mkan operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Unknown priority: {0} (expected normal, important, or urgent)")]
    UnknownPriority(String),

    #[error("Unknown status: {0} (expected todo, doing, or done)")]
    UnknownStatus(String),

    #[error("Malformed stored task {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("No user selected: pass --user, set MKAN_USER, or run `mkan user set`")]
    UserRequired,

    // Policy blocks (exit code 3)
    #[error("Task {0} is not done and cannot be archived")]
    ArchiveNotDone(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Structured payload for JSON error output, where one exists.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::MalformedRecord { id, reason } => Some(serde_json::json!({
                "id": id,
                "reason": reason,
            })),
            Error::TaskNotFound(id) | Error::ArchiveNotDone(id) => {
                Some(serde_json::json!({ "id": id }))
            }
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.display().to_string(),
            })),
            _ => None,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::TaskNotFound(_)
            | Error::UnknownPriority(_)
            | Error::UnknownStatus(_)
            | Error::MalformedRecord { .. }
            | Error::UserRequired => exit_codes::USER_ERROR,

            // Policy blocks
            Error::ArchiveNotDone(_) => exit_codes::POLICY_BLOCKED,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for mkan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}

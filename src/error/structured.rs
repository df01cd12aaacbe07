//! Structured error output for scripted consumers.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging
//!
//! A remote failure is always reported under a `REMOTE_*` code so that a
//! dashboard consumer can show "data unavailable" instead of empty charts.

use crate::error::DashError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Remote Errors (exit code 3) ===
    /// Remote returned a non-success status
    RemoteStatus,
    /// Remote did not answer in time
    RemoteTimeout,
    /// Network failure before any response
    RemoteTransport,
    /// Remote response could not be decoded
    RemotePayload,

    // === Database Errors (exit code 2) ===
    /// Database file not found
    DatabaseNotFound,
    /// Database operation failed
    DatabaseError,
    /// Workspace not initialized
    NotInitialized,
    /// Already initialized
    AlreadyInitialized,

    // === Validation Errors (exit code 4) ===
    /// Field validation failed
    ValidationFailed,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Remote
            Self::RemoteStatus => "REMOTE_STATUS",
            Self::RemoteTimeout => "REMOTE_TIMEOUT",
            Self::RemoteTransport => "REMOTE_TRANSPORT",
            Self::RemotePayload => "REMOTE_PAYLOAD",
            // Database
            Self::DatabaseNotFound => "DATABASE_NOT_FOUND",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            // Validation
            Self::ValidationFailed => "VALIDATION_FAILED",
            // Config
            Self::ConfigError => "CONFIG_ERROR",
            // I/O
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
        }
    }

    /// Whether this class of error is worth retrying unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteTimeout | Self::RemoteTransport)
    }

    /// Get the exit code for this error category.
    ///
    /// Exit codes are grouped by error category:
    /// - 2: Database errors
    /// - 3: Remote source errors (data unavailable)
    /// - 4: Validation errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DatabaseNotFound
            | Self::DatabaseError
            | Self::NotInitialized
            | Self::AlreadyInitialized => 2,
            Self::RemoteStatus
            | Self::RemoteTimeout
            | Self::RemoteTransport
            | Self::RemotePayload => 3,
            Self::ValidationFailed => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// True when the failure means "no data available" rather than a local fault
    pub data_unavailable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `DashError`.
    #[must_use]
    pub fn from_error(err: &DashError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);

        Self {
            code,
            message: err.to_string(),
            hint: err.suggestion().map(str::to_string),
            retryable: err.is_retryable(),
            data_unavailable: err.is_remote(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "data_unavailable": self.data_unavailable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        if self.data_unavailable {
            output.push_str("data unavailable: ");
        }
        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &DashError) -> (ErrorCode, Option<Value>) {
        match err {
            DashError::RemoteStatus { url, status, .. } => (
                ErrorCode::RemoteStatus,
                Some(json!({"url": url, "status": status})),
            ),
            DashError::RemoteTimeout { url, timeout_secs } => (
                ErrorCode::RemoteTimeout,
                Some(json!({"url": url, "timeout_secs": timeout_secs})),
            ),
            DashError::Transport(_) => (ErrorCode::RemoteTransport, None),
            DashError::Payload(_) => (ErrorCode::RemotePayload, None),
            DashError::DatabaseNotFound { path } => (
                ErrorCode::DatabaseNotFound,
                Some(json!({"path": path.display().to_string()})),
            ),
            DashError::Database(_) => (ErrorCode::DatabaseError, None),
            DashError::NotInitialized => (ErrorCode::NotInitialized, None),
            DashError::AlreadyInitialized { path } => (
                ErrorCode::AlreadyInitialized,
                Some(json!({"path": path.display().to_string()})),
            ),
            DashError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            DashError::Config(_) => (ErrorCode::ConfigError, None),
            DashError::Io(_) => (ErrorCode::IoError, None),
            DashError::Json(_) => (ErrorCode::JsonError, None),
            DashError::Yaml(_) => (ErrorCode::YamlError, None),
        }
    }
}

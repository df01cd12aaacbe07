//! Error types and handling for `tracker_dash`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Distinguishes "no data available" (any remote failure) from a
//!   successful fetch that matched zero issues
//! - Provides structured JSON output for scripted consumers

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `tracker_dash` operations.
#[derive(Error, Debug)]
pub enum DashError {
    // === Remote Source Errors ===
    /// The remote API answered with a non-success HTTP status.
    #[error("Remote request to '{url}' failed with HTTP {status}: {message}")]
    RemoteStatus {
        url: String,
        status: u16,
        message: String,
    },

    /// The remote API did not answer within the configured timeout.
    #[error("Remote request to '{url}' timed out after {timeout_secs}s")]
    RemoteTimeout { url: String, timeout_secs: u64 },

    /// Network-level failure (DNS, TLS, connection reset...).
    #[error("Remote transport error: {0}")]
    Transport(String),

    /// The remote answered with a body we could not decode at all.
    #[error("Unexpected remote payload: {0}")]
    Payload(String),

    // === Storage Errors ===
    /// Database file not found at the specified path.
    #[error("Database not found at '{path}'")]
    DatabaseNotFound { path: PathBuf },

    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    // === Configuration Errors ===
    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workspace not initialized.
    #[error("Workspace not initialized: run 'jd init' first")]
    NotInitialized,

    /// Already initialized.
    #[error("Already initialized at '{path}'")]
    AlreadyInitialized { path: PathBuf },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DashError {
    /// True for failures of the remote issue source. Callers treat these as
    /// "data unavailable", never as an empty result.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteStatus { .. }
                | Self::RemoteTimeout { .. }
                | Self::Transport(_)
                | Self::Payload(_)
        )
    }

    /// Can the same request succeed if simply retried later?
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RemoteTimeout { .. } | Self::Transport(_) => true,
            Self::RemoteStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run: jd init"),
            Self::DatabaseNotFound { .. } => Some("Check --db or run: jd init"),
            Self::AlreadyInitialized { .. } => Some("Use --force to reinitialize"),
            Self::RemoteStatus { status: 401, .. } => {
                Some("Check JIRA_EMAIL and JIRA_API_TOKEN")
            }
            Self::RemoteStatus { status: 403, .. } => {
                Some("The configured account cannot read this project")
            }
            Self::RemoteStatus { status: 400, .. } => {
                Some("Check filter values; the remote rejected the query")
            }
            Self::RemoteTimeout { .. } => Some("Retry, or raise timeout-secs in config"),
            Self::Config(_) => Some("Run: jd config to inspect resolved settings"),
            _ => None,
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        StructuredError::from_error(self).code.exit_code()
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `DashError`.
pub type Result<T> = std::result::Result<T, DashError>;

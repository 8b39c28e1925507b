//! Error types for dumpwatch.
//!
//! Errors carry a stable numeric code and a category so the CLI can map
//! them to exit codes and to machine-readable JSON:
//! ```json
//! {
//!   "code": 21,
//!   "category": "input",
//!   "message": "unsupported snapshot schema version: 2.0.0",
//!   "context": { "schema_version": "2.0.0" }
//! }
//! ```
//!
//! Absent threads, unresolved lock references and empty series are valid
//! data, not errors, and never surface here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for dumpwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration and argument errors.
    Config,
    /// Snapshot-series input errors.
    Input,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for dumpwatch.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),

    // Input errors (20-29)
    #[error("invalid snapshot series: {0}")]
    Input(String),

    #[error("unsupported snapshot schema version: {version}")]
    UnsupportedSchema { version: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig(_) => 11,
            Error::Input(_) => 20,
            Error::UnsupportedSchema { .. } => 21,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) => ErrorCategory::Config,
            Error::Input(_) | Error::UnsupportedSchema { .. } => ErrorCategory::Input,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidConfig(_) => "Invalid Analysis Configuration",
            Error::Input(_) => "Invalid Snapshot Series",
            Error::UnsupportedSchema { .. } => "Unsupported Snapshot Schema",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Serialization Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) => {
                "Run 'dw-core config validate' to check the analysis configuration."
            }
            Error::Input(_) => {
                "Check that the file is a snapshot series produced by the dump parser."
            }
            Error::UnsupportedSchema { .. } => {
                "Re-export the snapshot series with a parser matching this dumpwatch version."
            }
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Failed to write the report. Please report this as a bug.",
        }
    }

    /// Format for a terminal: headline, reason and fix on separate lines.
    pub fn format_human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Additional structured context (e.g., file path).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();
        if let Error::UnsupportedSchema { version } = err {
            context.insert("schema_version".to_string(), serde_json::json!(version));
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

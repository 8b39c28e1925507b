//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::analysis::AnalysisConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

impl From<ValidationError> for dw_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IoError(msg) => dw_common::Error::Config(msg),
            other => dw_common::Error::InvalidConfig(other.to_string()),
        }
    }
}

/// Validate an analysis configuration semantically.
pub fn validate_analysis(config: &AnalysisConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.cpu.limit == 0 {
        return Err(ValidationError::InvalidValue {
            field: "cpu.limit".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    if config.monitors.queue_stack_depth == 0 {
        return Err(ValidationError::InvalidValue {
            field: "monitors.queue_stack_depth".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    Ok(())
}

//! Configuration loading for dw-core.
//!
//! Resolves analysis.json through `dw_config::resolve`, parses it, runs
//! semantic validation, and records where the configuration came from.

pub use dw_config::{AnalysisConfig, ConfigSource, CpuSettings, MonitorSettings};
pub use dw_config::validate::ValidationError;

use dw_config::resolve::resolve_config;
use dw_config::validate::validate_analysis;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid config file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("Semantic validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl From<ConfigError> for dw_common::Error {
    fn from(err: ConfigError) -> Self {
        let message = err.to_string();
        match err {
            ConfigError::NotFound { .. } => dw_common::Error::Config(message),
            _ => dw_common::Error::InvalidConfig(message),
        }
    }
}

/// Loaded configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: AnalysisConfig,
    /// File the configuration was read from (None for built-in defaults).
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Resolve, load and validate the analysis configuration.
pub fn load_config(cli_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
    let paths = resolve_config(cli_path);

    let config = match &paths.analysis {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound { path: path.clone() });
            }
            AnalysisConfig::from_file(path).map_err(|source| ConfigError::Invalid {
                path: path.clone(),
                source,
            })?
        }
        None => AnalysisConfig::default(),
    };

    validate_analysis(&config)?;

    tracing::debug!(
        source = %paths.source,
        path = ?paths.analysis,
        mode = %config.cpu.mode,
        "analysis configuration loaded"
    );

    Ok(ResolvedConfig {
        config,
        path: paths.analysis,
        source: paths.source,
    })
}

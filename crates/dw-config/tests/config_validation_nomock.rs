//! No-mock configuration validation + resolution tests.
//!
//! Covers:
//! - Loading analysis.json from real files
//! - Resolution order (CLI > DW_CONFIG > DW_CONFIG_DIR)
//! - Semantic validation of loaded files

use dw_common::CpuMode;
use dw_config::resolve::{resolve_config, ConfigSource, ANALYSIS_FILENAME};
use dw_config::validate::{validate_analysis, ValidationError};
use dw_config::AnalysisConfig;
use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let saved = keys.iter().map(|k| env::var(k).ok()).collect();
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.keys.iter().zip(self.saved.iter()) {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

#[test]
fn loads_and_validates_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(ANALYSIS_FILENAME);
    fs::write(
        &path,
        r#"{
            "schema_version": "1.0.0",
            "cpu": { "mode": "median", "limit": 10 },
            "monitors": { "without_idle": false, "queue_stack_depth": 16 }
        }"#,
    )
    .unwrap();

    let config = AnalysisConfig::from_file(&path).expect("load config");
    validate_analysis(&config).expect("valid config");
    assert_eq!(config.cpu.mode, CpuMode::Median);
    assert_eq!(config.cpu.limit, 10);
    assert!(!config.monitors.without_idle);
    assert_eq!(config.monitors.queue_stack_depth, 16);
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = AnalysisConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ValidationError::IoError(_)));
}

#[test]
fn both_owner_toggles_are_accepted() {
    let config = AnalysisConfig::parse_json(
        r#"{"monitors": {"with_owner": true, "without_owner": true}}"#,
    )
    .unwrap();
    assert!(validate_analysis(&config).is_ok());
    assert!(config.monitors.with_owner && config.monitors.without_owner);
}

#[test]
fn mode_aliases_load_from_file() {
    let config = AnalysisConfig::parse_json(r#"{"cpu": {"mode": "average"}}"#).unwrap();
    assert_eq!(config.cpu.mode, CpuMode::Mean);
    let config = AnalysisConfig::parse_json(r#"{"cpu": {"mode": "maximum"}}"#).unwrap();
    assert_eq!(config.cpu.mode, CpuMode::Max);
    assert!(matches!(
        AnalysisConfig::parse_json(r#"{"cpu": {"mode": "p99"}}"#),
        Err(ValidationError::ParseError(_))
    ));
}

#[test]
fn env_path_beats_env_dir() {
    let _lock = lock_env();
    let _guard = EnvGuard::new(&["DW_CONFIG", "DW_CONFIG_DIR"]);

    let dir = TempDir::new().unwrap();
    let direct = dir.path().join("direct.json");
    fs::write(&direct, "{}").unwrap();
    let via_dir = dir.path().join(ANALYSIS_FILENAME);
    fs::write(&via_dir, "{}").unwrap();

    env::set_var("DW_CONFIG", &direct);
    env::set_var("DW_CONFIG_DIR", dir.path());
    let paths = resolve_config(None);
    assert_eq!(paths.source, ConfigSource::Environment);
    assert_eq!(paths.analysis.as_deref(), Some(direct.as_path()));

    env::remove_var("DW_CONFIG");
    let paths = resolve_config(None);
    assert_eq!(paths.source, ConfigSource::Environment);
    assert_eq!(paths.analysis.as_deref(), Some(via_dir.as_path()));
}

#[test]
fn cli_path_beats_environment() {
    let _lock = lock_env();
    let _guard = EnvGuard::new(&["DW_CONFIG"]);

    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join("env.json");
    fs::write(&env_file, "{}").unwrap();
    let cli_file = dir.path().join("cli.json");
    fs::write(&cli_file, "{}").unwrap();

    env::set_var("DW_CONFIG", &env_file);
    let paths = resolve_config(Some(&cli_file));
    assert_eq!(paths.source, ConfigSource::CliArgument);
    assert_eq!(paths.analysis.as_deref(), Some(cli_file.as_path()));
}

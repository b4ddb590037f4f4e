//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::MonitorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Credential for the streaming endpoint.
pub const ENV_API_KEY: &str = "PRIXE_API_KEY";
/// Override for the transient result slot path.
pub const ENV_RESULT_FILE: &str = "WEBSOCKET_RESULT_FILE";
/// Override for the first-run history snapshot directory.
pub const ENV_FIRST_RUN_DIR: &str = "HISTORY_FIRST_RUN_DIR";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => MonitorConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides through `lookup`. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut MonitorConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = value(ENV_API_KEY) {
        config.endpoint.api_key = key;
    }
    if let Some(path) = value(ENV_RESULT_FILE) {
        config.paths.result_file = PathBuf::from(path);
    }
    if let Some(path) = value(ENV_FIRST_RUN_DIR) {
        config.paths.first_run_dir = PathBuf::from(path);
    }
}

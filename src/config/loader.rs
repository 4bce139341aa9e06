//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::VitalsConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Delivery endpoint base URL for cross-origin delivery.
pub const ENV_PUBLIC_BASE_URL: &str = "VITALS_PUBLIC_BASE_URL";
/// Overrides `storage.dir`.
pub const ENV_STORE_DIR: &str = "VITALS_STORE_DIR";
/// Overrides `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "VITALS_BIND_ADDRESS";

const METRICS_PATH: &str = "/api/metrics";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, apply environment overrides and validate a TOML file.
pub fn load_config(path: &Path) -> Result<VitalsConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: VitalsConfig = toml::from_str(&content)?;
    finish(config)
}

/// Defaults plus environment overrides, validated.
pub fn default_config() -> Result<VitalsConfig, ConfigError> {
    finish(VitalsConfig::default())
}

/// `load_config` when a path is given, `default_config` otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<VitalsConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => default_config(),
    }
}

/// Point delivery at `<base>/api/metrics`.
pub fn set_public_base_url(config: &mut VitalsConfig, base: &str) {
    config.delivery.endpoint = format!("{}{}", base.trim_end_matches('/'), METRICS_PATH);
}

fn finish(mut config: VitalsConfig) -> Result<VitalsConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `VITALS_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut VitalsConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(base) = lookup(ENV_PUBLIC_BASE_URL) {
        set_public_base_url(config, &base);
        tracing::debug!(endpoint = %config.delivery.endpoint, "Delivery endpoint from environment");
    }
    if let Some(dir) = lookup(ENV_STORE_DIR) {
        config.storage.dir = dir;
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
}

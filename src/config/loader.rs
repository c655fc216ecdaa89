//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the environment, and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;

    finalize(config)
}

/// Build a config from defaults and the environment alone.
pub fn default_config() -> Result<GatewayConfig, ConfigError> {
    finalize(GatewayConfig::default())
}

fn finalize(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply deployment-environment overrides. The environment wins over the
/// file so one image can run against several backends.
fn apply_env_overrides(config: &mut GatewayConfig) {
    if let Ok(value) = std::env::var("GATEWAY_BIND") {
        config.listener.bind_address = value;
    }
    if let Ok(value) = std::env::var("BASE_API_URL") {
        config.upstream.base_url = value;
    }
    if let Ok(value) = std::env::var("TENANT_DOMAIN") {
        config.tenant.domain = value;
    }
    if let Ok(value) = std::env::var("SENTRY_DSN") {
        config.relays.sentry.dsn = value;
    }
}

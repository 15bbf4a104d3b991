//! Service settings loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum SettingsError {
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

/// Parse and validate settings from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, SettingsError> {
    let config: ServiceConfig = toml::from_str(content)?;

    validate_config(&config).map_err(SettingsError::Validation)?;

    Ok(config)
}

/// Load and validate settings from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, SettingsError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

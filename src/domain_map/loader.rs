//! Domain map loading.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::domain_map::model::{ConfigModel, ZoneConfig};
use crate::domain_map::validation::{validate_zones, ValidationError};

/// Error type for domain map loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

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

/// Deserialize and validate a raw domain map document.
///
/// The document is a JSON array of zone objects, exactly as the parameter
/// store hands it over.
pub fn load(raw: &[u8]) -> Result<ConfigModel, ConfigError> {
    let zones: Vec<ZoneConfig> = serde_json::from_slice(raw)?;

    validate_zones(&zones).map_err(ConfigError::Validation)?;

    Ok(ConfigModel::new(zones))
}

/// Read the domain map snapshot from disk and load it.
pub fn load_domain_map_file(path: &Path) -> Result<ConfigModel, ConfigError> {
    let raw = fs::read(path)?;
    let model = load(&raw)?;

    tracing::info!(
        path = %path.display(),
        zones = model.zones().len(),
        redirects = model.redirect_count(),
        aliases = model.alias_count(),
        "Domain map loaded"
    );
    Ok(model)
}

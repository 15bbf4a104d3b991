//! Recipient alias resolution.
//!
//! The `To` header of an inbound message is free-form: display names, several
//! comma-joined addresses, stray `@` signs. Only the last `local@domain`
//! substring is considered, so a display name that itself contains an `@`
//! cannot hijack routing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::domain_map::{ConfigModel, EmailAlias};

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_]+)[A-Za-z0-9_.+\-]*@([A-Za-z0-9\-]+\.[A-Za-z0-9.\-]+)")
        .expect("address pattern is valid")
});

/// Canonical `local@domain` extracted from a header.
///
/// The local part keeps only its leading word characters, so sub-address
/// tags (`support+news`) and dotted suffixes are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAddress {
    pub local: String,
    pub domain: String,
}

impl fmt::Display for MailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

/// No alias is configured for the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoRouteError {
    #[error("no address found in '{header}'")]
    NoAddress { header: String },

    #[error("no zone configured for {address}")]
    UnknownZone { address: String },

    #[error("no alias for {address} in zone {zone}")]
    UnknownAlias { address: String, zone: String },
}

/// Extract the last `local@domain` in `header`.
pub fn extract_address(header: &str) -> Option<MailAddress> {
    ADDRESS_PATTERN
        .captures_iter(header)
        .last()
        .map(|caps| MailAddress {
            local: caps[1].to_string(),
            domain: caps[2].to_string(),
        })
}

/// Resolve a raw recipient header to its configured alias.
///
/// The domain selects the zone ignoring case; the alias must then equal the
/// reconstructed `local@domain` exactly.
pub fn resolve<'a>(header: &str, config: &'a ConfigModel) -> Result<&'a EmailAlias, NoRouteError> {
    let address = extract_address(header).ok_or_else(|| NoRouteError::NoAddress {
        header: header.to_string(),
    })?;
    let canonical = address.to_string();

    let zone = config
        .zone(&address.domain)
        .ok_or_else(|| NoRouteError::UnknownZone {
            address: canonical.clone(),
        })?;

    let alias = zone
        .emails
        .iter()
        .find(|email| email.alias == canonical)
        .ok_or_else(|| NoRouteError::UnknownAlias {
            address: canonical.clone(),
            zone: zone.host_zone_name.clone(),
        })?;

    tracing::info!(
        to = %header,
        alias = %alias.alias,
        recipients = %alias.recipient_list(),
        "Mapped recipient to alias"
    );
    Ok(alias)
}

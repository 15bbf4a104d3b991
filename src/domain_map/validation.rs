//! Domain map validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic and missing fields)
//! - Zone names unique across the document
//! - Aliases unique within a zone and belonging to it
//! - Every alias has at least one well-formed recipient
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: &[ZoneConfig] → Result<(), Vec<ValidationError>>
//! - Consumers never re-check what is validated here

use std::collections::HashSet;

use lettre::message::Mailbox;
use thiserror::Error;
use url::Url;

use crate::domain_map::model::ZoneConfig;

/// A single semantic problem found in the domain map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("zone #{index} has an empty hostZoneName")]
    EmptyZoneName { index: usize },

    #[error("zone {zone} is declared more than once")]
    DuplicateZone { zone: String },

    #[error("redirect for subDomain '{sub_domain}' in zone {zone} has an empty targetDomain")]
    EmptyTarget { zone: String, sub_domain: String },

    #[error("targetDomain '{target}' in zone {zone} is not a valid host")]
    InvalidTarget { zone: String, target: String },

    #[error("alias {alias} in zone {zone} has no recipients")]
    NoRecipients { zone: String, alias: String },

    #[error("alias {alias} is declared more than once in zone {zone}")]
    DuplicateAlias { zone: String, alias: String },

    #[error("alias {alias} does not belong to zone {zone}")]
    ForeignAlias { zone: String, alias: String },

    #[error("alias {alias} in zone {zone} has a local part other than letters, digits and '_' and can never be matched")]
    UnreachableAlias { zone: String, alias: String },

    #[error("{field} '{value}' of alias {alias} is not a valid mailbox")]
    InvalidMailbox {
        alias: String,
        field: &'static str,
        value: String,
    },
}

/// Check the invariants the resolvers rely on.
pub fn validate_zones(zones: &[ZoneConfig]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen_zones = HashSet::new();

    for (index, zone) in zones.iter().enumerate() {
        let name = zone.host_zone_name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyZoneName { index });
            continue;
        }
        if !seen_zones.insert(name.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateZone { zone: name.to_string() });
        }

        for rule in &zone.redirects {
            if rule.target_domain.trim().is_empty() {
                errors.push(ValidationError::EmptyTarget {
                    zone: name.to_string(),
                    sub_domain: rule.sub_domain.clone(),
                });
            } else if !is_valid_target(&rule.target_domain) {
                errors.push(ValidationError::InvalidTarget {
                    zone: name.to_string(),
                    target: rule.target_domain.clone(),
                });
            }
        }

        let mut seen_aliases = HashSet::new();
        for email in &zone.emails {
            if !seen_aliases.insert(email.alias.as_str()) {
                errors.push(ValidationError::DuplicateAlias {
                    zone: name.to_string(),
                    alias: email.alias.clone(),
                });
            }

            let parts = email.alias.rsplit_once('@');
            let in_zone = parts.is_some_and(|(_, domain)| domain.eq_ignore_ascii_case(name));
            if !in_zone {
                errors.push(ValidationError::ForeignAlias {
                    zone: name.to_string(),
                    alias: email.alias.clone(),
                });
            } else if !parts.is_some_and(|(local, _)| is_matchable_local(local)) {
                errors.push(ValidationError::UnreachableAlias {
                    zone: name.to_string(),
                    alias: email.alias.clone(),
                });
            }

            if email.recipients.is_empty() {
                errors.push(ValidationError::NoRecipients {
                    zone: name.to_string(),
                    alias: email.alias.clone(),
                });
            }

            let mailboxes = std::iter::once(("fromSender", &email.from_sender))
                .chain(email.recipients.iter().map(|r| ("recipients", r)));
            for (field, value) in mailboxes {
                if value.parse::<Mailbox>().is_err() {
                    errors.push(ValidationError::InvalidMailbox {
                        alias: email.alias.clone(),
                        field,
                        value: value.clone(),
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Recipient extraction keeps only the leading word characters of the local
/// part, so an alias is only reachable when that is all it has.
fn is_matchable_local(local: &str) -> bool {
    !local.is_empty() && local.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A target must form an absolute https URL with a host once a scheme is applied.
fn is_valid_target(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    let bare = ["https://", "http://"]
        .iter()
        .find(|scheme| lower.starts_with(*scheme))
        .map_or(target, |scheme| &target[scheme.len()..]);

    Url::parse(&format!("https://{bare}"))
        .is_ok_and(|url| url.host_str().is_some_and(|host| !host.is_empty()))
}

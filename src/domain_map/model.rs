//! Domain map schema definitions.
//!
//! This module defines the routing configuration shared by the email and the
//! redirect paths. All types derive Serde traits so the document delivered by
//! the external parameter store deserializes straight into them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The complete, validated routing configuration.
///
/// Built once per process by [`crate::domain_map::loader::load`] and shared
/// read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigModel {
    zones: Vec<ZoneConfig>,
}

impl ConfigModel {
    pub(crate) fn new(zones: Vec<ZoneConfig>) -> Self {
        Self { zones }
    }

    /// Zones in document order.
    pub fn zones(&self) -> &[ZoneConfig] {
        &self.zones
    }

    /// First zone whose name equals `domain`, ignoring ASCII case.
    pub fn zone(&self, domain: &str) -> Option<&ZoneConfig> {
        self.zones
            .iter()
            .find(|zone| zone.host_zone_name.eq_ignore_ascii_case(domain))
    }

    /// Total number of email aliases across all zones.
    pub fn alias_count(&self) -> usize {
        self.zones.iter().map(|z| z.emails.len()).sum()
    }

    /// Total number of redirect rules across all zones.
    pub fn redirect_count(&self) -> usize {
        self.zones.iter().map(|z| z.redirects.len()).sum()
    }
}

/// One managed domain.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneConfig {
    /// Canonical domain, matched case-insensitively.
    #[serde(alias = "hostedZoneName")]
    pub host_zone_name: String,

    /// DNS zone identifier. Carried through, never interpreted.
    #[serde(default)]
    pub hosted_zone_id: String,

    /// Redirect rules, in priority order.
    #[serde(default)]
    pub redirects: Vec<RedirectRule>,

    /// Fallback address for bounces. Stored only.
    #[serde(default)]
    pub bounce_email: Option<String>,

    /// Email aliases, in match order.
    #[serde(default)]
    pub emails: Vec<EmailAlias>,
}

/// Redirects a subtree of subdomains to a target host.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRule {
    /// Subdomain suffix this rule applies to. Empty or `"."` covers the whole
    /// zone, `"@"` only the apex.
    #[serde(default)]
    pub sub_domain: String,

    /// Destination host with an optional path prefix, e.g. `medium.com/@me`.
    pub target_domain: String,

    /// Source path to replacement path. Accepted but not applied.
    #[serde(default)]
    pub uri_map: BTreeMap<String, String>,
}

/// Forwards mail sent to `alias` on to `recipients`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmailAlias {
    /// Mailbox used as the From header and envelope sender of forwarded mail.
    pub from_sender: String,

    /// `local@domain` matched against the original recipient.
    pub alias: String,

    /// Destination mailboxes. Never empty once loaded.
    pub recipients: Vec<String>,

    /// Prepended to the original subject.
    #[serde(default)]
    pub subject_prefix: String,
}

impl EmailAlias {
    /// Recipients formatted for a `To` header.
    pub fn recipient_list(&self) -> String {
        self.recipients.join(", ")
    }
}

//! Host parsing and subdomain matching.
//!
//! # Responsibilities
//! - Split a Host header into subdomain and base domain
//! - Match a parsed subdomain against a rule's subdomain suffix
//!
//! # Design Decisions
//! - One anchored pattern; port and trailing root dot are ignored
//! - Matching is case-insensitive, as host names are
//! - Missing subdomain becomes the apex sentinel so apex-only rules are expressible

use std::sync::LazyLock;

use regex::Regex;

/// Subdomain value used when the host is the zone apex.
pub const APEX: &str = "@";

static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<sub>(?:[A-Za-z0-9-]+\.)+)?(?P<domain>[A-Za-z0-9-]+\.[A-Za-z0-9-]+)\.?(?::\d+)?$",
    )
    .expect("host pattern is valid")
});

/// A Host header split into the parts redirect rules are matched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostParts {
    /// Subdomain without trailing dot, or [`APEX`].
    pub subdomain: String,
    /// Base domain (`label.tld`).
    pub domain: String,
}

impl HostParts {
    /// Parse a Host header value. Returns `None` when it is not a domain name.
    pub fn parse(host: &str) -> Option<Self> {
        let caps = HOST_PATTERN.captures(host.trim())?;

        let subdomain = caps
            .name("sub")
            .map(|m| m.as_str().trim_end_matches('.'))
            .filter(|s| !s.is_empty())
            .unwrap_or(APEX)
            .to_string();

        Some(Self {
            subdomain,
            domain: caps["domain"].to_string(),
        })
    }

    pub fn is_apex(&self) -> bool {
        self.subdomain == APEX
    }
}

/// Matches a parsed subdomain by suffix.
#[derive(Debug, Clone)]
pub struct SubdomainMatcher {
    suffix: String,
}

impl SubdomainMatcher {
    /// Create a matcher for a rule's `subDomain`.
    /// The suffix is normalized to lowercase; `"."` covers the whole zone like `""`.
    pub fn new(sub_domain: &str) -> Self {
        let suffix = match sub_domain.trim() {
            "." => String::new(),
            other => other.to_ascii_lowercase(),
        };
        Self { suffix }
    }

    /// Returns true if `subdomain` ends with this matcher's suffix.
    pub fn matches(&self, subdomain: &str) -> bool {
        subdomain.to_ascii_lowercase().ends_with(&self.suffix)
    }
}

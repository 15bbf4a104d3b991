//! Redirect lookup.
//!
//! # Responsibilities
//! - Hold the immutable domain map and redirect policy
//! - Find the zone for a Host header and the first matching rule
//! - Compose an absolute https Location, falling back to the default target
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Rules evaluated in configuration order; first match wins, no reordering
//! - Never fails: an unmapped host degrades to the default target

use std::sync::Arc;

use crate::config::{RedirectConfig, RedirectStatus};
use crate::domain_map::{ConfigModel, RedirectRule};
use crate::routing::matcher::{HostParts, SubdomainMatcher};

const HTTPS: &str = "https://";
const HTTP: &str = "http://";

/// Outcome of resolving one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResult {
    pub status: RedirectStatus,
    pub location: String,
    /// Zone that matched, if any.
    pub zone: Option<String>,
    /// Whether a configured rule (rather than the default target) was used.
    pub matched: bool,
}

/// Resolves Host headers to redirect targets.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    model: Arc<ConfigModel>,
    status: RedirectStatus,
    default_target: String,
}

impl RedirectResolver {
    pub fn new(model: Arc<ConfigModel>, policy: &RedirectConfig) -> Self {
        Self {
            model,
            status: policy.status,
            default_target: policy.default_target.clone(),
        }
    }

    /// Resolve a Host header and request path to a redirect.
    pub fn resolve(&self, host: &str, path: &str) -> RedirectResult {
        let Some(parts) = HostParts::parse(host) else {
            tracing::debug!(host = %host, "Host is not a domain name, using default target");
            return self.fallback(path, None);
        };

        let Some(zone) = self.model.zone(&parts.domain) else {
            tracing::debug!(host = %host, domain = %parts.domain, "No zone for host");
            return self.fallback(path, None);
        };

        match first_matching_rule(&zone.redirects, &parts.subdomain) {
            Some(rule) => {
                tracing::debug!(
                    host = %host,
                    zone = %zone.host_zone_name,
                    sub_domain = %rule.sub_domain,
                    target = %rule.target_domain,
                    "Redirect rule matched"
                );
                RedirectResult {
                    status: self.status,
                    location: compose_location(&rule.target_domain, path),
                    zone: Some(zone.host_zone_name.clone()),
                    matched: true,
                }
            }
            None => {
                tracing::debug!(
                    host = %host,
                    zone = %zone.host_zone_name,
                    subdomain = %parts.subdomain,
                    "No rule in zone matched"
                );
                self.fallback(path, Some(zone.host_zone_name.clone()))
            }
        }
    }

    fn fallback(&self, path: &str, zone: Option<String>) -> RedirectResult {
        RedirectResult {
            status: self.status,
            location: compose_location(&self.default_target, path),
            zone,
            matched: false,
        }
    }
}

fn first_matching_rule<'a>(rules: &'a [RedirectRule], subdomain: &str) -> Option<&'a RedirectRule> {
    rules
        .iter()
        .find(|rule| SubdomainMatcher::new(&rule.sub_domain).matches(subdomain))
}

/// Append the request path to the target and force an https scheme.
pub fn compose_location(target: &str, path: &str) -> String {
    format!("{HTTPS}{}{path}", strip_scheme(target))
}

/// Drop a leading `https://` or `http://`, whatever its case.
fn strip_scheme(target: &str) -> &str {
    [HTTPS, HTTP]
        .into_iter()
        .find(|scheme| {
            target
                .get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
        .map_or(target, |scheme| &target[scheme.len()..])
}

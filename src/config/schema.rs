//! Service settings schema definitions.
//!
//! This module defines the process-level settings for the redirect edge and
//! the email forwarder. All types derive Serde traits for deserialization from
//! a TOML file, and every field has a default so a minimal file is valid.

use serde::{Deserialize, Serialize};

/// Root settings for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration for the redirect edge.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Redirect policy.
    pub redirect: RedirectConfig,

    /// Where the domain map and inbound messages are read from.
    pub store: StoreConfig,

    /// Outbound relay for forwarded mail.
    pub delivery: DeliveryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout for the redirect edge in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// HTTP status used for every redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RedirectStatus {
    /// 301 Moved Permanently.
    MovedPermanently,
    /// 302 Found.
    #[default]
    Found,
}

impl RedirectStatus {
    pub fn code(self) -> u16 {
        match self {
            RedirectStatus::MovedPermanently => 301,
            RedirectStatus::Found => 302,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RedirectStatus::MovedPermanently => "Moved Permanently",
            RedirectStatus::Found => "Found",
        }
    }
}

impl TryFrom<u16> for RedirectStatus {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            301 => Ok(RedirectStatus::MovedPermanently),
            302 => Ok(RedirectStatus::Found),
            other => Err(format!("unsupported redirect status {other}, expected 301 or 302")),
        }
    }
}

impl From<RedirectStatus> for u16 {
    fn from(status: RedirectStatus) -> Self {
        status.code()
    }
}

/// Redirect policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Status code for all redirects (301 or 302).
    pub status: RedirectStatus,

    /// Host (and optional path) used when no zone or rule matches.
    pub default_target: String,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            status: RedirectStatus::Found,
            default_target: "github.com/weirdion".to_string(),
        }
    }
}

/// Storage locations read by the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Snapshot of the domain map document (JSON).
    pub domain_map_path: String,

    /// Directory holding raw inbound messages, one file per message id.
    pub message_dir: String,

    /// Optional key prefix inside `message_dir`.
    pub message_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            domain_map_path: "domain-map.json".to_string(),
            message_dir: "inbound".to_string(),
            message_prefix: String::new(),
        }
    }
}

/// SMTP relay used to submit forwarded mail.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Relay host name.
    pub smtp_host: String,

    /// Relay port.
    pub smtp_port: u16,

    /// Require STARTTLS towards the relay.
    pub tls: bool,

    /// Relay credentials; both or neither.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 25,
            tls: false,
            username: None,
            password: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

//! Event-shaped redirect requests and responses.
//!
//! The CDN-style viewer-request event carries headers as lists of
//! `{key, value}` entries keyed by lowercase name. The response mirrors that
//! shape with a single `location` entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::{RedirectResolver, RedirectResult};

/// One header entry as carried by edge events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

/// Incoming redirect event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgeRequest {
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<HeaderEntry>>,
    #[serde(default)]
    pub uri: String,
}

impl EdgeRequest {
    pub fn new(host: &str, uri: &str) -> Self {
        let entry = HeaderEntry {
            key: "Host".to_string(),
            value: host.to_string(),
        };
        Self {
            headers: BTreeMap::from([("host".to_string(), vec![entry])]),
            uri: uri.to_string(),
        }
    }

    /// Value of the entry keyed `Host`, or empty when absent.
    pub fn host(&self) -> &str {
        self.headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("host"))
            .flat_map(|(_, entries)| entries)
            .find(|entry| entry.key.eq_ignore_ascii_case("host"))
            .map(|entry| entry.value.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeResponseHeaders {
    pub location: Vec<HeaderEntry>,
}

/// Redirect returned to the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    pub status: String,
    pub status_description: String,
    pub headers: EdgeResponseHeaders,
}

impl From<&RedirectResult> for EdgeResponse {
    fn from(result: &RedirectResult) -> Self {
        Self {
            status: result.status.code().to_string(),
            status_description: result.status.description().to_string(),
            headers: EdgeResponseHeaders {
                location: vec![HeaderEntry {
                    key: "Location".to_string(),
                    value: result.location.clone(),
                }],
            },
        }
    }
}

/// Answer one redirect event.
pub fn handle_edge_event(request: &EdgeRequest, resolver: &RedirectResolver) -> EdgeResponse {
    let host = request.host();
    let result = resolver.resolve(host, &request.uri);

    tracing::info!(
        host = %host,
        uri = %request.uri,
        status = result.status.code(),
        location = %result.location,
        "Redirect"
    );
    EdgeResponse::from(&result)
}

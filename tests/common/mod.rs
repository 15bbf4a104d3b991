//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use domain_companion::config::ServiceConfig;
use domain_companion::domain_map::{load, ConfigModel};
use domain_companion::http::HttpServer;
use domain_companion::lifecycle::Shutdown;
use domain_companion::mail::{Delivery, DeliveryError, MessageStore, OutboundMessage, StoreError};

/// Domain map used across the integration tests.
pub const DOMAIN_MAP: &str = r#"[
    {
        "hostZoneName": "example.com",
        "hostedZoneId": "Z0EXAMPLE",
        "redirects": [
            { "subDomain": "blog", "targetDomain": "medium.com/@me" },
            { "subDomain": "@", "targetDomain": "https://github.com/me" }
        ],
        "emails": [
            {
                "fromSender": "Forwarder <no-reply@example.com>",
                "alias": "support@example.com",
                "recipients": ["a@x.com", "b@x.com"],
                "subjectPrefix": "FW: "
            }
        ]
    },
    {
        "hostedZoneName": "example.org",
        "redirects": [
            { "subDomain": ".", "targetDomain": "example.com/org" }
        ]
    }
]"#;

pub fn domain_map() -> Arc<ConfigModel> {
    Arc::new(load(DOMAIN_MAP.as_bytes()).unwrap())
}

/// Start the edge server on `addr`; trigger the returned handle to stop it.
pub async fn start_server(addr: SocketAddr, mut config: ServiceConfig) -> Shutdown {
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, domain_map());
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let stopped = shutdown.signalled();

    tokio::spawn(async move {
        let _ = server.run(listener, stopped).await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    shutdown
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// In-memory message store.
pub struct MemoryStore(pub HashMap<String, Vec<u8>>);

impl MemoryStore {
    pub fn with(message_id: &str, raw: &str) -> Self {
        Self(HashMap::from([(message_id.to_string(), raw.as_bytes().to_vec())]))
    }
}

impl MessageStore for MemoryStore {
    fn fetch(&self, message_id: &str) -> Result<Vec<u8>, StoreError> {
        self.0
            .get(message_id)
            .cloned()
            .ok_or_else(|| StoreError::InvalidId(message_id.to_string()))
    }
}

/// Delivery provider that records what it was asked to send.
#[derive(Default)]
pub struct CapturingDelivery {
    pub sent: Mutex<Vec<OutboundMessage>>,
}

impl Delivery for CapturingDelivery {
    fn deliver(&self, message: &OutboundMessage) -> Result<String, DeliveryError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(format!("Email sent! Message ID: {}", sent.len()))
    }
}

/// Delivery provider that always fails.
pub struct RejectingDelivery;

impl Delivery for RejectingDelivery {
    fn deliver(&self, _message: &OutboundMessage) -> Result<String, DeliveryError> {
        Err(DeliveryError::Provider("Email address is not verified".into()))
    }
}

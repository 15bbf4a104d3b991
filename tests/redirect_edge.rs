//! End-to-end redirect tests against a running edge server.

use std::net::SocketAddr;

use domain_companion::config::{RedirectStatus, ServiceConfig};
use domain_companion::http::{handle_edge_event, EdgeRequest};
use domain_companion::routing::RedirectResolver;
use reqwest::header::{HOST, LOCATION};

mod common;

async fn redirect(addr: SocketAddr, host: &str, path: &str) -> (u16, String) {
    let res = common::client()
        .get(format!("http://{addr}{path}"))
        .header(HOST, host)
        .send()
        .await
        .expect("Edge server unreachable");

    let location = res
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    (res.status().as_u16(), location)
}

#[tokio::test]
async fn test_served_redirects() {
    let addr: SocketAddr = "127.0.0.1:28281".parse().unwrap();
    let shutdown = common::start_server(addr, ServiceConfig::default()).await;

    assert_eq!(
        redirect(addr, "blog.example.com", "/post1").await,
        (302, "https://medium.com/@me/post1".to_string())
    );
    assert_eq!(
        redirect(addr, "www.Blog.Example.com", "/").await,
        (302, "https://medium.com/@me/".to_string())
    );
    assert_eq!(
        redirect(addr, "example.com", "/repos?tab=1").await,
        (302, "https://github.com/me/repos?tab=1".to_string())
    );
    assert_eq!(
        redirect(addr, "shop.example.org", "/cart").await,
        (302, "https://example.com/org/cart".to_string())
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_unmapped_hosts_use_default_target() {
    let addr: SocketAddr = "127.0.0.1:28282".parse().unwrap();
    let shutdown = common::start_server(addr, ServiceConfig::default()).await;

    assert_eq!(
        redirect(addr, "unknown.net", "/").await,
        (302, "https://github.com/weirdion/".to_string())
    );
    assert_eq!(
        redirect(addr, "shop.example.com", "/x").await,
        (302, "https://github.com/weirdion/x".to_string())
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_permanent_redirects_when_configured() {
    let addr: SocketAddr = "127.0.0.1:28283".parse().unwrap();
    let mut config = ServiceConfig::default();
    config.redirect.status = RedirectStatus::MovedPermanently;
    config.redirect.default_target = "example.net/home".into();
    let shutdown = common::start_server(addr, config).await;

    assert_eq!(
        redirect(addr, "blog.example.com", "/").await,
        (301, "https://medium.com/@me/".to_string())
    );
    assert_eq!(
        redirect(addr, "nowhere.io", "/a").await,
        (301, "https://example.net/home/a".to_string())
    );

    shutdown.trigger();
}

#[test]
fn test_edge_event_response_shape() {
    let resolver = RedirectResolver::new(common::domain_map(), &ServiceConfig::default().redirect);
    let request: EdgeRequest = serde_json::from_str(
        r#"{"headers": {"host": [{"key": "Host", "value": "blog.example.com"}]}, "uri": "/post1"}"#,
    )
    .unwrap();

    let response = serde_json::to_value(handle_edge_event(&request, &resolver)).unwrap();
    assert_eq!(
        response,
        serde_json::json!({
            "status": "302",
            "statusDescription": "Found",
            "headers": { "location": [{ "key": "Location", "value": "https://medium.com/@me/post1" }] }
        })
    );
}

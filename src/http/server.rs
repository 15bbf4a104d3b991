//! HTTP edge server.
//!
//! # Responsibilities
//! - Create the Axum Router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Answer every request with the redirect for its Host header
//! - Record redirect metrics
//!
//! # Design Decisions
//! - Method and body are ignored; only Host and path matter
//! - HTTP/2 requests carry the host in the URI authority instead of a header

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{RedirectStatus, ServiceConfig};
use crate::domain_map::ConfigModel;
use crate::observability::metrics;
use crate::routing::RedirectResolver;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RedirectResolver>,
}

/// HTTP server answering redirects.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    pub fn new(config: ServiceConfig, model: Arc<ConfigModel>) -> Self {
        let state = AppState {
            resolver: Arc::new(RedirectResolver::new(model, &config.redirect)),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(redirect_handler))
            .route("/{*path}", any(redirect_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The configured router, for serving on a custom listener or in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            status = self.config.redirect.status.code(),
            default_target = %self.config.redirect.default_target,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

fn status_code(status: RedirectStatus) -> StatusCode {
    match status {
        RedirectStatus::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
        RedirectStatus::Found => StatusCode::FOUND,
    }
}

/// Host header, falling back to the URI authority.
fn request_host(request: &Request<Body>) -> &str {
    request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default()
}

async fn redirect_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let host = request_host(&request);
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let result = state.resolver.resolve(host, path);
    metrics::record_redirect(result.status.code(), result.matched);

    let location = match HeaderValue::from_str(&result.location) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(host = %host, location = %result.location, error = %e, "Unusable redirect location");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect location").into_response();
        }
    };

    tracing::info!(
        host = %host,
        path = %path,
        zone = result.zone.as_deref().unwrap_or("-"),
        matched = result.matched,
        location = %result.location,
        "Redirect"
    );
    (status_code(result.status), [(header::LOCATION, location)]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_map::load;
    use tower::ServiceExt;

    fn server(config: ServiceConfig) -> HttpServer {
        let model = load(
            br#"[{"hostZoneName": "example.com", "redirects": [
                {"subDomain": "blog", "targetDomain": "medium.com/@me"},
                {"subDomain": "@", "targetDomain": "github.com/me"}
            ]}]"#,
        )
        .unwrap();
        HttpServer::new(config, Arc::new(model))
    }

    fn get(host: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_matched_host_redirects() {
        let response = server(ServiceConfig::default())
            .router()
            .oneshot(get("blog.example.com", "/post/1?ref=x"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "https://medium.com/@me/post/1?ref=x");
    }

    #[tokio::test]
    async fn test_apex_and_unknown_hosts() {
        let router = server(ServiceConfig::default()).router();

        let apex = router.clone().oneshot(get("example.com", "/")).await.unwrap();
        assert_eq!(location(&apex), "https://github.com/me/");

        let unknown = router.oneshot(get("shop.other.net", "/x")).await.unwrap();
        assert_eq!(location(&unknown), "https://github.com/weirdion/x");
    }

    #[tokio::test]
    async fn test_configured_permanent_status() {
        let mut config = ServiceConfig::default();
        config.redirect.status = RedirectStatus::MovedPermanently;

        let response = server(config)
            .router()
            .oneshot(get("blog.example.com", "/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[tokio::test]
    async fn test_request_id_is_set_and_propagated() {
        let router = server(ServiceConfig::default()).router();

        let generated = router.clone().oneshot(get("example.com", "/")).await.unwrap();
        assert!(generated.headers().contains_key(X_REQUEST_ID));

        let mut request = get("example.com", "/");
        request
            .headers_mut()
            .insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        let echoed = router.oneshot(request).await.unwrap();
        assert_eq!(echoed.headers()[X_REQUEST_ID], "abc-123");
    }

    #[tokio::test]
    async fn test_missing_host_uses_default_target() {
        let request = Request::builder().uri("/about").body(Body::empty()).unwrap();
        let response = server(ServiceConfig::default())
            .router()
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(location(&response), "https://github.com/weirdion/about");
    }
}

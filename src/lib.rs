//! Domain companion library.
//!
//! Host redirects and alias email forwarding driven by a single domain map.

pub mod config;
pub mod domain_map;
pub mod http;
pub mod lifecycle;
pub mod mail;
pub mod observability;
pub mod routing;

pub use config::ServiceConfig;
pub use domain_map::ConfigModel;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use mail::EmailForwarder;
pub use routing::RedirectResolver;

//! HTTP redirect subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request (Host + path)          Edge event (JSON)
//!     → server.rs (Axum, middleware)     → edge.rs (event shape)
//!                 ↘                     ↙
//!           routing::RedirectResolver
//!                 ↙                     ↘
//!     301/302 + Location                 EdgeResponse (JSON)
//! ```

pub mod edge;
pub mod server;

pub use edge::{handle_edge_event, EdgeRequest, EdgeResponse, HeaderEntry};
pub use server::{HttpServer, X_REQUEST_ID};

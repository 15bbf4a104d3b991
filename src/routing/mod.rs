//! Redirect routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (Host, path)
//!     → matcher.rs (split host, subdomain suffix match)
//!     → router.rs (zone lookup, first matching rule)
//!     → Return: RedirectResult (rule target or default target)
//! ```
//!
//! # Design Decisions
//! - Domain map loaded at startup, immutable at runtime
//! - Deterministic: same input always matches same rule
//! - First match wins, in configuration order
//! - `uriMap` is carried by the model but not consulted

pub mod matcher;
pub mod router;

pub use matcher::{HostParts, SubdomainMatcher, APEX};
pub use router::{compose_location, RedirectResolver, RedirectResult};

//! Routing configuration shared by the email and redirect paths.
//!
//! # Data Flow
//! ```text
//! parameter store snapshot (JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ConfigModel (validated, immutable)
//!     → shared via Arc with the resolvers
//! ```
//!
//! # Design Decisions
//! - Built once per process; a cold start is the only way to pick up changes
//! - Required fields enforced by serde, invariants by validation.rs
//! - Consumers trust the model and never re-validate

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load, load_domain_map_file, ConfigError};
pub use model::{ConfigModel, EmailAlias, RedirectRule, ZoneConfig};
pub use validation::ValidationError;

//! Service settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to the edge server, forwarder and observability at startup
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks
//! - The routing document itself lives in `domain_map`, not here

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, SettingsError};
pub use schema::{
    DeliveryConfig, ListenerConfig, ObservabilityConfig, RedirectConfig, RedirectStatus,
    ServiceConfig, StoreConfig, TimeoutConfig,
};

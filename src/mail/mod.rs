//! Email forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! EmailEvent (message id)
//!     → store.rs (fetch raw bytes)
//!     → address.rs (original To → configured alias)
//!     → reconstruct.rs (walk MIME tree, rewrite headers)
//!     → outbound.rs (envelope + serialized message)
//!     → delivery.rs (submit to relay)
//! ```
//!
//! forward.rs drives the steps for one event.

pub mod address;
pub mod delivery;
pub mod event;
pub mod forward;
pub mod outbound;
pub mod reconstruct;
pub mod store;

pub use address::{extract_address, resolve, MailAddress, NoRouteError};
pub use delivery::{Delivery, DeliveryError, SmtpRelay};
pub use event::EmailEvent;
pub use forward::{EmailForwarder, ForwardError};
pub use outbound::{EnvelopeError, OutboundMessage};
pub use reconstruct::{reconstruct, MessageFormatError, PartKind};
pub use store::{DirectoryStore, MessageStore, StoreError};

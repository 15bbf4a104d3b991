//! Per-event email forwarding.
//!
//! # Responsibilities
//! - Fetch the raw message named by the event
//! - Resolve the original `To` header to an alias
//! - Rebuild the message and hand it to the delivery provider
//!
//! # Design Decisions
//! - One attempt per event; failures are returned, never retried here
//! - Nothing is delivered unless an alias matched
//! - Blocking: async callers run it on the blocking pool

use std::sync::Arc;

use mailparse::MailHeaderMap;
use thiserror::Error;

use crate::domain_map::ConfigModel;
use crate::mail::address::{self, NoRouteError};
use crate::mail::delivery::{Delivery, DeliveryError};
use crate::mail::event::EmailEvent;
use crate::mail::reconstruct::{reconstruct, MessageFormatError};
use crate::mail::store::{MessageStore, StoreError};
use crate::observability::metrics;

/// Any failure along the forwarding path.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("event carries no message id")]
    EmptyEvent,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    NoRoute(#[from] NoRouteError),

    #[error(transparent)]
    Format(#[from] MessageFormatError),

    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl ForwardError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::EmptyEvent => "empty_event",
            ForwardError::Store(_) => "store",
            ForwardError::NoRoute(_) => "no_route",
            ForwardError::Format(_) => "format",
            ForwardError::Delivery(_) => "delivery",
        }
    }
}

/// Forwards inbound messages according to the domain map.
#[derive(Clone)]
pub struct EmailForwarder {
    model: Arc<ConfigModel>,
    store: Arc<dyn MessageStore>,
    delivery: Arc<dyn Delivery>,
}

impl EmailForwarder {
    pub fn new(
        model: Arc<ConfigModel>,
        store: Arc<dyn MessageStore>,
        delivery: Arc<dyn Delivery>,
    ) -> Self {
        Self {
            model,
            store,
            delivery,
        }
    }

    /// Handle an email-trigger event.
    pub fn handle_event(&self, event: &EmailEvent) -> Result<String, ForwardError> {
        let message_id = event.message_id().ok_or(ForwardError::EmptyEvent)?;
        self.forward(message_id)
    }

    /// Forward the stored message `message_id`, returning the provider receipt.
    pub fn forward(&self, message_id: &str) -> Result<String, ForwardError> {
        tracing::info!(message_id = %message_id, "Received message");

        let result = self.try_forward(message_id);
        match &result {
            Ok(receipt) => {
                metrics::record_forward("sent");
                tracing::info!(message_id = %message_id, result = %receipt, "Forwarded message");
            }
            Err(e) => {
                metrics::record_forward(e.kind());
                tracing::error!(message_id = %message_id, error = %e, "Forwarding failed");
            }
        }
        result
    }

    fn try_forward(&self, message_id: &str) -> Result<String, ForwardError> {
        let raw = self.store.fetch(message_id)?;

        let (headers, _) = mailparse::parse_headers(&raw).map_err(MessageFormatError::from)?;
        let to = headers.get_first_value("To").unwrap_or_default();

        let alias = address::resolve(&to, &self.model)?;
        let outbound = reconstruct(&raw, alias)?;

        Ok(self.delivery.deliver(&outbound)?)
    }
}

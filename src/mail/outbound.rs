//! The forwarded message as handed to the delivery provider.

use lettre::address::{AddressError, Envelope};
use lettre::message::Mailbox;
use serde::Serialize;
use thiserror::Error;

/// Source or destinations cannot form an SMTP envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid address: {0}")]
    Address(#[from] AddressError),

    #[error(transparent)]
    Incomplete(#[from] lettre::error::Error),
}

/// A fully composed message plus its provider-facing envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Envelope sender, the alias' `fromSender`.
    pub source: String,
    /// Envelope recipients, the alias' `recipients`.
    pub destinations: Vec<String>,
    /// Serialized MIME message.
    #[serde(rename = "rawMessageData")]
    pub serialized_data: String,
}

impl OutboundMessage {
    /// SMTP envelope built from the bare addresses of source and destinations.
    pub fn envelope(&self) -> Result<Envelope, EnvelopeError> {
        let from = self.source.parse::<Mailbox>()?.email;
        let to = self
            .destinations
            .iter()
            .map(|d| d.parse::<Mailbox>().map(|m| m.email))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Envelope::new(Some(from), to)?)
    }
}

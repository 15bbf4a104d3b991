//! Submission of forwarded mail to the outbound provider.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use thiserror::Error;

use crate::config::DeliveryConfig;
use crate::mail::outbound::{EnvelopeError, OutboundMessage};

/// The provider refused or could not be reached.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid envelope: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("{0}")]
    Provider(String),
}

/// Accepts a composed message for delivery and returns the provider's
/// human-readable receipt.
pub trait Delivery: Send + Sync {
    fn deliver(&self, message: &OutboundMessage) -> Result<String, DeliveryError>;
}

/// Relays through an SMTP server.
pub struct SmtpRelay {
    transport: SmtpTransport,
    host: String,
}

impl SmtpRelay {
    pub fn from_config(config: &DeliveryConfig) -> Result<Self, DeliveryError> {
        let builder = if config.tls {
            SmtpTransport::starttls_relay(&config.smtp_host)
                .map_err(|e| DeliveryError::Provider(format!("SMTP relay error: {e}")))?
        } else {
            SmtpTransport::builder_dangerous(&config.smtp_host)
        };

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.port(config.smtp_port).build(),
            host: config.smtp_host.clone(),
        })
    }
}

impl Delivery for SmtpRelay {
    fn deliver(&self, message: &OutboundMessage) -> Result<String, DeliveryError> {
        let envelope = message.envelope()?;

        let response = self
            .transport
            .send_raw(&envelope, message.serialized_data.as_bytes())
            .map_err(|e| DeliveryError::Provider(e.to_string()))?;

        tracing::info!(
            relay = %self.host,
            code = %response.code(),
            destinations = message.destinations.len(),
            "Message accepted by relay"
        );
        Ok(format!("Email sent! Relay response: {}", response.code()))
    }
}

//! Email-trigger event as delivered by the inbound mail provider.

use serde::Deserialize;

/// `{ "Records": [ { "ses": { "mail": { "messageId": "..." } } } ] }`
#[derive(Debug, Clone, Deserialize)]
pub struct EmailEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EmailRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailRecord {
    pub ses: SesPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SesPayload {
    pub mail: MailMetadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMetadata {
    pub message_id: String,
}

impl EmailEvent {
    /// Message id of the first record; the provider sends one per event.
    pub fn message_id(&self) -> Option<&str> {
        self.records.first().map(|r| r.ses.mail.message_id.as_str())
    }
}

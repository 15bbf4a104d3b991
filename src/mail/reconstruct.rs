//! Rebuilds an inbound message for forwarding.
//!
//! # Responsibilities
//! - Parse the raw MIME stream and walk its part tree
//! - Keep text bodies and image/application attachments, drop the rest
//! - Rewrite Subject, From, To and Reply-To for the matched alias
//!
//! # Design Decisions
//! - Parts are classified into a closed [`PartKind`] set, no dynamic dispatch
//! - Attachment Content-Type and Content-Disposition are copied verbatim
//! - HTML is always re-encoded as quoted-printable
//! - The original raw message is not attached to the forward
//! - Unsupported parts (calendar invites, nested messages, ...) are dropped

use lettre::address::AddressError;
use lettre::message::header::{
    ContentTransferEncoding, ContentType, Header, HeaderName, HeaderValue,
};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::{Address, Message};
use mailparse::{DispositionType, MailAddr, MailHeaderMap, ParsedMail};
use thiserror::Error;

use crate::domain_map::EmailAlias;
use crate::mail::outbound::OutboundMessage;

/// The raw bytes could not be turned into a forwardable message.
#[derive(Debug, Error)]
pub enum MessageFormatError {
    #[error("malformed message: {0}")]
    Malformed(#[from] mailparse::MailParseError),

    #[error("invalid mailbox '{value}': {source}")]
    Mailbox {
        value: String,
        #[source]
        source: AddressError,
    },

    #[error("failed to compose message: {0}")]
    Compose(#[from] lettre::error::Error),
}

/// How a MIME part is carried into the forwarded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Plain,
    Html,
    Image,
    Application,
    Dropped,
}

impl PartKind {
    /// Classify a part by content type and disposition.
    pub fn classify(part: &ParsedMail<'_>) -> Self {
        let mimetype = part.ctype.mimetype.as_str();
        let attachment = part.get_content_disposition().disposition == DispositionType::Attachment;

        match (mimetype, attachment) {
            ("text/plain", false) => PartKind::Plain,
            ("text/html", false) => PartKind::Html,
            (t, true) if t.starts_with("image/") => PartKind::Image,
            (t, true) if t.starts_with("application/") => PartKind::Application,
            _ => PartKind::Dropped,
        }
    }
}

macro_rules! verbatim_header {
    ($(#[$meta:meta])* $name:ident, $header:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        struct $name(String);

        impl Header for $name {
            fn name() -> HeaderName {
                HeaderName::new_from_ascii_str($header)
            }

            fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
                Ok(Self(s.to_owned()))
            }

            fn display(&self) -> HeaderValue {
                HeaderValue::new(Self::name(), self.0.clone())
            }
        }
    };
}

verbatim_header!(
    /// Content-Type copied unchanged from the original part.
    OriginalContentType,
    "Content-Type"
);
verbatim_header!(
    /// Content-Disposition copied unchanged from the original part.
    OriginalDisposition,
    "Content-Disposition"
);

/// Parse `raw` and rebuild it addressed for `alias`.
pub fn reconstruct(raw: &[u8], alias: &EmailAlias) -> Result<OutboundMessage, MessageFormatError> {
    let mail = mailparse::parse_mail(raw)?;

    let original_from = mail.headers.get_first_value("From");
    let original_subject = mail.headers.get_first_value("Subject").unwrap_or_default();

    tracing::info!(
        subject = %original_subject,
        from = original_from.as_deref().unwrap_or_default(),
        reply_to = mail.headers.get_first_value("Reply-To").as_deref().unwrap_or_default(),
        return_path = mail.headers.get_first_value("Return-Path").as_deref().unwrap_or_default(),
        sending_to = %alias.recipient_list(),
        "Summary of email"
    );

    let parts = if mail.ctype.mimetype.starts_with("multipart/") {
        let mut parts = Vec::new();
        for part in walk(&mail) {
            let kind = PartKind::classify(part);
            tracing::debug!(content_type = %part.ctype.mimetype, kind = ?kind, "Classified part");
            if let Some(single) = forward_part(kind, part)? {
                parts.push(single);
            }
        }
        parts
    } else {
        vec![whole_body(&mail)?]
    };

    let body = into_multipart(parts);

    let mut builder = Message::builder()
        .from(mailbox(&alias.from_sender)?)
        .subject(format!("{}{}", alias.subject_prefix, original_subject));
    for recipient in &alias.recipients {
        builder = builder.to(mailbox(recipient)?);
    }
    for reply_to in reply_to_mailboxes(&mail) {
        builder = builder.reply_to(reply_to);
    }
    let message = builder.multipart(body)?;

    Ok(OutboundMessage {
        source: alias.from_sender.clone(),
        destinations: alias.recipients.clone(),
        serialized_data: String::from_utf8_lossy(&message.formatted()).into_owned(),
    })
}

/// Depth-first, document-order traversal including the root.
fn walk<'m, 'a>(mail: &'m ParsedMail<'a>) -> Vec<&'m ParsedMail<'a>> {
    let mut out = vec![mail];
    for sub in &mail.subparts {
        out.extend(walk(sub));
    }
    out
}

fn forward_part(kind: PartKind, part: &ParsedMail<'_>) -> Result<Option<SinglePart>, MessageFormatError> {
    let single = match kind {
        PartKind::Plain => {
            let content_type = text_content_type("text/plain", &part.ctype.charset)
                .unwrap_or(ContentType::TEXT_PLAIN);
            SinglePart::builder()
                .header(content_type)
                .body(part.get_body_raw()?)
        }
        PartKind::Html => {
            let content_type = text_content_type("text/html", &part.ctype.charset)
                .unwrap_or(ContentType::TEXT_HTML);
            SinglePart::builder()
                .header(content_type)
                .header(ContentTransferEncoding::QuotedPrintable)
                .body(part.get_body_raw()?)
        }
        PartKind::Image | PartKind::Application => {
            let disposition = part
                .headers
                .get_first_value("Content-Disposition")
                .unwrap_or_else(|| "attachment".to_string());
            SinglePart::builder()
                .header(OriginalContentType(original_content_type(part)))
                .header(OriginalDisposition(disposition))
                .header(ContentTransferEncoding::Base64)
                .body(part.get_body_raw()?)
        }
        PartKind::Dropped => return Ok(None),
    };
    Ok(Some(single))
}

fn whole_body(mail: &ParsedMail<'_>) -> Result<SinglePart, MessageFormatError> {
    Ok(SinglePart::builder()
        .header(OriginalContentType(original_content_type(mail)))
        .body(mail.get_body_raw()?))
}

fn into_multipart(parts: Vec<SinglePart>) -> MultiPart {
    let mut parts = parts.into_iter();
    let first = parts.next().unwrap_or_else(|| SinglePart::plain(String::new()));
    parts.fold(MultiPart::alternative().singlepart(first), |multipart, part| {
        multipart.singlepart(part)
    })
}

fn text_content_type(mimetype: &str, charset: &str) -> Option<ContentType> {
    ContentType::parse(&format!("{mimetype}; charset={charset}")).ok()
}

fn original_content_type(part: &ParsedMail<'_>) -> String {
    part.headers
        .get_first_value("Content-Type")
        .unwrap_or_else(|| format!("{}; charset={}", part.ctype.mimetype, part.ctype.charset))
}

fn mailbox(value: &str) -> Result<Mailbox, MessageFormatError> {
    value.parse().map_err(|source| MessageFormatError::Mailbox {
        value: value.to_string(),
        source,
    })
}

/// Original Reply-To when present and non-empty, otherwise the original From.
fn reply_to_mailboxes(mail: &ParsedMail<'_>) -> Vec<Mailbox> {
    let Some(header) = ["Reply-To", "From"].iter().find_map(|name| {
        mail.headers
            .get_first_header(name)
            .filter(|h| !h.get_value().trim().is_empty())
    }) else {
        return Vec::new();
    };

    let addresses = match mailparse::addrparse_header(header) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(header = %header.get_value(), error = %e, "Unparseable reply address");
            return Vec::new();
        }
    };

    let singles = addresses.iter().flat_map(|addr| match addr {
        MailAddr::Single(single) => vec![single.clone()],
        MailAddr::Group(group) => group.addrs.clone(),
    });

    singles
        .filter_map(|single| match single.addr.parse::<Address>() {
            Ok(email) => Some(Mailbox::new(single.display_name, email)),
            Err(e) => {
                tracing::warn!(address = %single.addr, error = %e, "Skipping reply address");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias() -> EmailAlias {
        EmailAlias {
            from_sender: "Forwarder <no-reply@example.com>".into(),
            alias: "support@example.com".into(),
            recipients: vec!["a@x.com".into(), "b@x.com".into()],
            subject_prefix: "FW: ".into(),
        }
    }

    fn reparse(message: &OutboundMessage) -> ParsedMail<'_> {
        mailparse::parse_mail(message.serialized_data.as_bytes()).unwrap()
    }

    const PLAIN: &str = "From: Jane Doe <jane@home.net>\r\n\
        To: Support Team <support@example.com>\r\n\
        Subject: Printer on fire\r\n\
        Content-Type: text/plain; charset=us-ascii\r\n\
        \r\n\
        Hello,\r\nthe printer is on fire again.\r\n";

    #[test]
    fn test_plain_message_headers_rewritten() {
        let out = reconstruct(PLAIN.as_bytes(), &alias()).unwrap();
        assert_eq!(out.source, "Forwarder <no-reply@example.com>");
        assert_eq!(out.destinations, vec!["a@x.com", "b@x.com"]);

        let mail = reparse(&out);
        assert_eq!(mail.headers.get_first_value("Subject").unwrap(), "FW: Printer on fire");
        assert!(mail.headers.get_first_value("From").unwrap().contains("no-reply@example.com"));
        assert_eq!(mail.headers.get_first_value("To").unwrap(), "a@x.com, b@x.com");
        let reply_to = mail.headers.get_first_value("Reply-To").unwrap();
        assert!(reply_to.contains("jane@home.net"), "{reply_to}");
    }

    #[test]
    fn test_plain_body_preserved() {
        let out = reconstruct(PLAIN.as_bytes(), &alias()).unwrap();
        let mail = reparse(&out);

        assert_eq!(mail.ctype.mimetype, "multipart/alternative");
        assert_eq!(mail.subparts.len(), 1);
        assert_eq!(
            mail.subparts[0].get_body_raw().unwrap(),
            b"Hello,\r\nthe printer is on fire again.\r\n"
        );
    }

    #[test]
    fn test_reply_to_preferred_over_from() {
        let raw = "From: jane@home.net\r\nReply-To: Help Desk <desk@home.net>\r\n\
            To: support@example.com\r\nSubject: x\r\n\r\nbody\r\n";
        let out = reconstruct(raw.as_bytes(), &alias()).unwrap();
        let reply_to = reparse(&out).headers.get_first_value("Reply-To").unwrap();
        assert!(reply_to.contains("desk@home.net"));
        assert!(!reply_to.contains("jane@home.net"));
    }

    #[test]
    fn test_empty_reply_to_falls_back_to_from() {
        let raw = "From: jane@home.net\r\nReply-To: \r\nTo: support@example.com\r\n\r\nbody\r\n";
        let out = reconstruct(raw.as_bytes(), &alias()).unwrap();
        let reply_to = reparse(&out).headers.get_first_value("Reply-To").unwrap();
        assert!(reply_to.contains("jane@home.net"));
    }

    #[test]
    fn test_missing_subject_gets_prefix_only() {
        let raw = "From: jane@home.net\r\nTo: support@example.com\r\n\r\nbody\r\n";
        let out = reconstruct(raw.as_bytes(), &alias()).unwrap();
        let subject = reparse(&out).headers.get_first_value("Subject").unwrap();
        assert_eq!(subject.trim(), "FW:");
    }

    const MIXED: &str = "From: jane@home.net\r\n\
        To: support@example.com\r\n\
        Subject: Invoice\r\n\
        MIME-Version: 1.0\r\n\
        Content-Type: multipart/mixed; boundary=\"outer\"\r\n\
        \r\n\
        --outer\r\n\
        Content-Type: multipart/alternative; boundary=\"inner\"\r\n\
        \r\n\
        --inner\r\n\
        Content-Type: text/plain; charset=utf-8\r\n\
        \r\n\
        See attached.\r\n\
        --inner\r\n\
        Content-Type: text/html; charset=utf-8\r\n\
        Content-Transfer-Encoding: 7bit\r\n\
        \r\n\
        <p>See attached.</p>\r\n\
        --inner--\r\n\
        --outer\r\n\
        Content-Type: application/pdf; name=\"invoice.pdf\"\r\n\
        Content-Disposition: attachment; filename=\"invoice.pdf\"\r\n\
        Content-Transfer-Encoding: base64\r\n\
        \r\n\
        JVBERi0xLjQKJcfs\r\n\
        --outer\r\n\
        Content-Type: image/png\r\n\
        Content-Disposition: attachment; filename=\"logo.png\"\r\n\
        Content-Transfer-Encoding: base64\r\n\
        \r\n\
        iVBORw0KGgo=\r\n\
        --outer\r\n\
        Content-Type: text/calendar; method=REQUEST\r\n\
        \r\n\
        BEGIN:VCALENDAR\r\n\
        --outer--\r\n";

    #[test]
    fn test_classification_in_document_order() {
        let mail = mailparse::parse_mail(MIXED.as_bytes()).unwrap();
        let kinds: Vec<PartKind> = walk(&mail).into_iter().map(PartKind::classify).collect();
        assert_eq!(
            kinds,
            vec![
                PartKind::Dropped,
                PartKind::Dropped,
                PartKind::Plain,
                PartKind::Html,
                PartKind::Application,
                PartKind::Image,
                PartKind::Dropped,
            ]
        );
    }

    #[test]
    fn test_multipart_parts_forwarded() {
        let out = reconstruct(MIXED.as_bytes(), &alias()).unwrap();
        let mail = reparse(&out);
        let parts = &mail.subparts;
        assert_eq!(parts.len(), 4);

        assert_eq!(parts[0].ctype.mimetype, "text/plain");
        assert_eq!(parts[0].get_body_raw().unwrap(), b"See attached.");

        assert_eq!(parts[1].ctype.mimetype, "text/html");
        assert_eq!(
            parts[1].headers.get_first_value("Content-Transfer-Encoding").unwrap(),
            "quoted-printable"
        );

        assert_eq!(
            parts[2].headers.get_first_value("Content-Type").unwrap(),
            "application/pdf; name=\"invoice.pdf\""
        );
        assert_eq!(
            parts[2].headers.get_first_value("Content-Disposition").unwrap(),
            "attachment; filename=\"invoice.pdf\""
        );
        assert_eq!(parts[2].get_body_raw().unwrap(), b"%PDF-1.4\n%\xc7\xec");

        assert_eq!(parts[3].ctype.mimetype, "image/png");
        assert_eq!(
            parts[3].headers.get_first_value("Content-Disposition").unwrap(),
            "attachment; filename=\"logo.png\""
        );
    }

    #[test]
    fn test_all_parts_dropped_leaves_empty_text() {
        let raw = "From: jane@home.net\r\nTo: support@example.com\r\n\
            Content-Type: multipart/mixed; boundary=\"b\"\r\n\r\n\
            --b\r\nContent-Type: text/calendar\r\n\r\nBEGIN:VCALENDAR\r\n--b--\r\n";
        let out = reconstruct(raw.as_bytes(), &alias()).unwrap();
        let mail = reparse(&out);
        assert_eq!(mail.subparts.len(), 1);
        assert_eq!(mail.subparts[0].ctype.mimetype, "text/plain");
        assert!(mail.subparts[0].get_body_raw().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_headers_rejected() {
        let err = reconstruct(b" continuation: without header\r\n\r\nbody", &alias()).unwrap_err();
        assert!(matches!(err, MessageFormatError::Malformed(_)));
    }

    #[test]
    fn test_invalid_sender_reported() {
        let mut alias = alias();
        alias.from_sender = "not a mailbox".into();
        let err = reconstruct(PLAIN.as_bytes(), &alias).unwrap_err();
        assert!(matches!(err, MessageFormatError::Mailbox { .. }));
    }
}

//! A fetched mailbox message as an explicit value object.
//!
//! The raw RFC822 bytes are decoded exactly once at fetch time; everything
//! downstream works on named fields instead of re-parsing MIME.

use chrono::{DateTime, Utc};
use mail_parser::{MessageParser, MimeHeaders, PartType};

/// One top-level MIME part of a fetched message.
///
/// Only the top level is captured — nested multiparts are not descended
/// into, matching the one-level attachment scan of the extractor.
#[derive(Debug, Clone)]
pub struct MessagePart {
    /// Content-Disposition type (lowercased), e.g. `"attachment"`, `"inline"`.
    pub disposition: Option<String>,

    /// MIME content type (e.g. `"application/zip"`, `"text/plain"`).
    pub content_type: String,

    /// Filename declared by the sender. Untrusted.
    pub filename: Option<String>,

    /// Decoded part content (transfer encoding already resolved).
    pub data: Vec<u8>,
}

/// A message fetched from the mailbox, scoped to one extraction pass.
///
/// For a non-multipart message, `parts` holds exactly one entry describing
/// the whole message body.
#[derive(Debug, Clone)]
pub struct MailMessage {
    /// Mailbox identifier (IMAP UID).
    pub uid: u32,

    /// Receipt timestamp, used for the date partition of stored reports.
    pub received: DateTime<Utc>,

    /// Decoded subject line, kept for diagnostics only.
    pub subject: String,

    /// Whether the message body is a multipart container.
    pub multipart: bool,

    /// Ordered top-level parts (or the single whole-body pseudo-part).
    pub parts: Vec<MessagePart>,
}

impl MailMessage {
    /// Decode raw RFC822 bytes into a `MailMessage`.
    ///
    /// A message that `mail-parser` cannot make sense of is returned with
    /// no parts; the extractor will skip it with a diagnostic.
    pub fn from_raw(uid: u32, received: DateTime<Utc>, raw: &[u8]) -> Self {
        let parser = MessageParser::default();
        match parser.parse(raw) {
            Some(msg) => {
                let subject = msg.subject().unwrap_or_default().to_string();
                let root = &msg.parts[0];
                let (multipart, parts) = match &root.body {
                    PartType::Multipart(ids) => {
                        let parts = ids
                            .iter()
                            .filter_map(|id| msg.part(*id))
                            .map(part_fields)
                            .collect();
                        (true, parts)
                    }
                    _ => (false, vec![part_fields(root)]),
                };
                Self {
                    uid,
                    received,
                    subject,
                    multipart,
                    parts,
                }
            }
            None => Self {
                uid,
                received,
                subject: String::new(),
                multipart: false,
                parts: Vec::new(),
            },
        }
    }
}

/// Copy the fields the pipeline needs out of a parsed MIME part.
fn part_fields(part: &mail_parser::MessagePart<'_>) -> MessagePart {
    let disposition = part
        .content_disposition()
        .map(|cd| cd.ctype().to_ascii_lowercase());

    let content_type = part
        .content_type()
        .map(|ct| match ct.subtype() {
            Some(sub) => format!("{}/{}", ct.ctype(), sub),
            None => ct.ctype().to_string(),
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let filename = part.attachment_name().map(String::from);

    MessagePart {
        disposition,
        content_type,
        filename,
        data: part.contents().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-01-01T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_from_raw_multipart() {
        let raw = b"From: noreply@google.com\r\n\
To: dmarc@example.com\r\n\
Subject: Report Domain: example.com\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
\r\n\
--b1\r\n\
Content-Type: text/plain\r\n\
\r\n\
See attached report.\r\n\
--b1\r\n\
Content-Type: application/xml\r\n\
Content-Disposition: attachment; filename=\"example.com!google.com!1609459200!1609545600.xml\"\r\n\
\r\n\
<feedback/>\r\n\
--b1--\r\n";

        let msg = MailMessage::from_raw(7, received(), raw);
        assert!(msg.multipart);
        assert_eq!(msg.subject, "Report Domain: example.com");
        assert_eq!(msg.parts.len(), 2);

        let att = &msg.parts[1];
        assert_eq!(att.disposition.as_deref(), Some("attachment"));
        assert_eq!(
            att.filename.as_deref(),
            Some("example.com!google.com!1609459200!1609545600.xml")
        );
        assert!(String::from_utf8_lossy(&att.data).contains("<feedback/>"));
    }

    #[test]
    fn test_from_raw_simple_text() {
        let raw = b"From: someone@example.com\r\n\
Subject: Hello\r\n\
\r\n\
Just a plain message.\r\n";

        let msg = MailMessage::from_raw(1, received(), raw);
        assert!(!msg.multipart);
        assert_eq!(msg.parts.len(), 1);
        assert_ne!(msg.parts[0].disposition.as_deref(), Some("attachment"));
    }

    #[test]
    fn test_from_raw_garbage() {
        let msg = MailMessage::from_raw(2, received(), &[0xff, 0xfe, 0x00]);
        // Unparseable input degrades to an empty, skippable message
        assert!(!msg.multipart);
    }
}

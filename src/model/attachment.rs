//! Attachment records produced by the extractor.

use chrono::{DateTime, Utc};

use super::message::{MailMessage, MessagePart};

/// One attachment lifted out of a fetched message.
///
/// Carries enough of the owning message (uid, receipt date, subject) for
/// date attribution and diagnostics; discarded after decoding.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Filename as declared by the sender. Untrusted; empty if missing.
    pub filename: String,

    /// Raw decoded payload bytes.
    pub data: Vec<u8>,

    /// UID of the owning message.
    pub uid: u32,

    /// Receipt timestamp of the owning message.
    pub received: DateTime<Utc>,

    /// Subject of the owning message, for diagnostics.
    pub subject: String,
}

impl Attachment {
    /// Build an attachment from a qualifying part of `message`.
    pub fn from_part(message: &MailMessage, part: &MessagePart) -> Self {
        Self {
            filename: part.filename.clone().unwrap_or_default(),
            data: part.data.clone(),
            uid: message.uid,
            received: message.received,
            subject: message.subject.clone(),
        }
    }
}

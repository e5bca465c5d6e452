//! Attachment extraction: a one-level scan over a fetched message.

use crate::model::attachment::Attachment;
use crate::model::message::MailMessage;

/// The attachments lifted out of one message, plus whether the message
/// counts toward the "valid messages" total.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Qualifying attachments, in part order.
    pub attachments: Vec<Attachment>,

    /// A multipart message always counts as valid, even when no part
    /// qualified; a non-multipart message counts only when it is itself
    /// an attachment. This mirrors the historical counter semantics.
    pub counted_valid: bool,
}

/// Scan the top-level parts of `message` for `Content-Disposition: attachment`.
///
/// Nested multiparts are not descended into. No filename validation happens
/// here — that is the decoder's job.
pub fn extract_attachments(message: &MailMessage) -> Extraction {
    let mut extraction = Extraction::default();

    if message.multipart {
        for part in &message.parts {
            if part.disposition.as_deref() == Some("attachment") {
                tracing::debug!(
                    uid = message.uid,
                    content_type = %part.content_type,
                    filename = part.filename.as_deref().unwrap_or(""),
                    "Found attachment part"
                );
                extraction
                    .attachments
                    .push(Attachment::from_part(message, part));
            }
        }
        extraction.counted_valid = true;
    } else if let Some(part) = message
        .parts
        .first()
        .filter(|p| p.disposition.as_deref() == Some("attachment"))
    {
        tracing::debug!(
            uid = message.uid,
            content_type = %part.content_type,
            filename = part.filename.as_deref().unwrap_or(""),
            "Message is a single attachment"
        );
        extraction
            .attachments
            .push(Attachment::from_part(message, part));
        extraction.counted_valid = true;
    } else {
        tracing::warn!(
            uid = message.uid,
            received = %message.received,
            subject = %message.subject,
            "Skipping message without report attachment"
        );
    }

    extraction
}

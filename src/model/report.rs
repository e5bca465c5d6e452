//! Decoded report documents, transient between decode and write.

use chrono::{DateTime, Utc};

/// A single DMARC aggregate report document ready for storage.
#[derive(Debug, Clone)]
pub struct DecodedReport {
    /// Report filename with the extension normalized to `.xml`.
    pub filename: String,

    /// Whitespace-trimmed report document text.
    pub xml: String,

    /// UID of the originating message.
    pub uid: u32,

    /// Receipt timestamp of the originating message; selects the date
    /// partition the report is stored under.
    pub received: DateTime<Utc>,

    /// Subject of the originating message, for diagnostics.
    pub subject: String,
}

//! The extraction pipeline: messages → attachments → reports → files.
//!
//! Each stage consumes an immutable input sequence and produces a new one;
//! per-item failures are logged inside the stage that hit them and never
//! escape it.

use std::path::Path;

use crate::decode;
use crate::error::Result;
use crate::extract;
use crate::mailbox::MailSource;
use crate::store::writer;

/// End-of-run counters surfaced to the user as a single summary line.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    /// Total decoded reports (written + duplicates).
    pub reports: usize,

    /// Messages counted as valid/processed.
    pub valid_messages: usize,

    /// Reports whose file already existed.
    pub duplicates: usize,
}

/// Run one extraction pass: fetch unseen messages from `source` and store
/// their reports under `root`.
///
/// The output root is validated before anything touches the mailbox, so a
/// misconfigured run aborts without side effects.
pub fn run(source: &mut dyn MailSource, folder: &str, root: &Path) -> Result<RunSummary> {
    writer::ensure_root(root)?;

    let total = source.select_folder(folder)?;
    tracing::info!("{total} messages in {folder}");

    let uids = source.search_unseen()?;
    tracing::info!("{} unseen messages to process", uids.len());

    let messages = source.fetch_messages(&uids)?;

    let mut valid_messages = 0usize;
    let mut attachments = Vec::new();
    for message in &messages {
        tracing::debug!(
            uid = message.uid,
            subject = %message.subject,
            received = %message.received,
            multipart = message.multipart,
            "Processing message"
        );
        let extraction = extract::extract_attachments(message);
        if extraction.counted_valid {
            valid_messages += 1;
        }
        attachments.extend(extraction.attachments);
    }

    let reports: Vec<_> = attachments
        .iter()
        .flat_map(decode::decode_attachment)
        .collect();

    let written = writer::write_reports(&reports, root)?;

    tracing::info!(
        "{} reports processed in {} messages - {} reports already exist",
        reports.len(),
        valid_messages,
        written.duplicates
    );

    Ok(RunSummary {
        reports: reports.len(),
        valid_messages,
        duplicates: written.duplicates,
    })
}

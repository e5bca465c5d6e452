//! Report materialization: date-partitioned, never-overwrite writes.

use std::path::Path;

use crate::error::{FetchError, Result};
use crate::model::report::DecodedReport;

/// Counters for one write pass. `written + duplicates` always equals the
/// number of reports handed in.
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteSummary {
    /// Files newly created.
    pub written: usize,

    /// Reports whose target file already existed and were left untouched.
    pub duplicates: usize,
}

/// Verify the output root exists. This is a fatal configuration error and
/// is checked before any mailbox work.
pub fn ensure_root(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(FetchError::OutputRootMissing(root.to_path_buf()))
    }
}

/// Compute the storage path for a report: `<root>/<YYYY-MM-DD>/<filename>`,
/// dated by the owning message's receipt date.
pub fn report_path(report: &DecodedReport, root: &Path) -> std::path::PathBuf {
    let day = report.received.format("%Y-%m-%d").to_string();
    root.join(day).join(&report.filename)
}

/// Write each report under its date partition, creating partition
/// directories as needed and skipping files that already exist.
///
/// Existing files are never overwritten or compared, so interrupted runs
/// are safely resumable. A filesystem error here aborts the run.
pub fn write_reports(reports: &[DecodedReport], root: &Path) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();

    for report in reports {
        let path = report_path(report, root);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| FetchError::io(dir, e))?;
        }

        if path.exists() {
            tracing::debug!(path = %path.display(), "File already present");
            summary.duplicates += 1;
            continue;
        }

        tracing::debug!(path = %path.display(), "Creating report file");
        std::fs::write(&path, &report.xml).map_err(|e| FetchError::io(&path, e))?;
        summary.written += 1;
    }

    Ok(summary)
}

//! Centralized error types for dmarcfetch.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the dmarcfetch library.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The report output root does not exist. Checked before any mailbox work.
    #[error("Report directory does not exist: {0}")]
    OutputRootMissing(PathBuf),

    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A mailbox session failure (connect, login, select, search, fetch).
    #[error("IMAP error: {0}")]
    Imap(#[from] imap::error::Error),

    /// A name-valid `.xml.gz` attachment whose payload could not be
    /// decompressed or decoded as text.
    #[error("Failed to decompress '{filename}': {source}")]
    Gzip {
        filename: String,
        source: std::io::Error,
    },

    /// An attachment that is not a structurally valid zip archive.
    #[error("Invalid zip archive '{filename}': {source}")]
    Zip {
        filename: String,
        source: zip::result::ZipError,
    },

    /// A report payload that is not valid UTF-8 text.
    #[error("Report '{filename}' is not valid UTF-8 text")]
    NotText { filename: String },
}

/// Convenience alias for `Result<T, FetchError>`.
pub type Result<T> = std::result::Result<T, FetchError>;

impl FetchError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

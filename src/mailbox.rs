//! Mailbox access behind a `MailSource` seam.
//!
//! The pipeline only needs three operations from the mailbox, so they are
//! a trait; the IMAP implementation lives here and the tests use an
//! in-memory source instead of a server.

use chrono::Utc;

use crate::error::Result;
use crate::model::message::MailMessage;

/// The capability the pipeline consumes: select a folder, find unseen
/// messages, fetch them. Messages are never marked seen or deleted.
pub trait MailSource {
    /// Select the working folder; returns the total message count in it.
    fn select_folder(&mut self, folder: &str) -> Result<u32>;

    /// UIDs of unseen messages in the selected folder, in ascending order.
    fn search_unseen(&mut self) -> Result<Vec<u32>>;

    /// Fetch and decode the given messages.
    fn fetch_messages(&mut self, uids: &[u32]) -> Result<Vec<MailMessage>>;
}

/// Connection settings for the IMAP server.
#[derive(Clone)]
pub struct MailboxConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for MailboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// IMAP-backed `MailSource`.
pub struct ImapMailbox {
    session: imap::Session<Box<dyn imap::ImapConnection>>,
}

impl ImapMailbox {
    /// Connect and authenticate. Failures here are fatal for the run.
    pub fn connect(config: &MailboxConfig) -> Result<Self> {
        tracing::debug!(host = %config.host, port = config.port, "Connecting to IMAP server");
        let client = imap::ClientBuilder::new(&config.host, config.port).connect()?;
        let session = client
            .login(&config.username, &config.password)
            .map_err(|(e, _)| e)?;
        tracing::debug!(user = %config.username, "Logged in");
        Ok(Self { session })
    }

    /// Close the session. Errors on logout are ignored.
    pub fn logout(mut self) {
        let _ = self.session.logout();
    }
}

impl MailSource for ImapMailbox {
    fn select_folder(&mut self, folder: &str) -> Result<u32> {
        let mailbox = self.session.select(folder)?;
        Ok(mailbox.exists)
    }

    fn search_unseen(&mut self) -> Result<Vec<u32>> {
        let mut uids: Vec<u32> = self.session.uid_search("UNSEEN")?.into_iter().collect();
        uids.sort_unstable();
        Ok(uids)
    }

    fn fetch_messages(&mut self, uids: &[u32]) -> Result<Vec<MailMessage>> {
        if uids.is_empty() {
            return Ok(Vec::new());
        }

        let uid_set = uids
            .iter()
            .map(|uid| uid.to_string())
            .collect::<Vec<_>>()
            .join(",");

        // BODY.PEEK keeps the \Seen flag untouched
        let fetches = self
            .session
            .uid_fetch(&uid_set, "(INTERNALDATE BODY.PEEK[])")?;

        let mut messages = Vec::new();
        for fetch in fetches.iter() {
            let Some(uid) = fetch.uid else {
                tracing::warn!("Fetch response without UID, skipping");
                continue;
            };
            let Some(raw) = fetch.body() else {
                tracing::warn!(uid, "Fetch response without body, skipping");
                continue;
            };
            let received = fetch
                .internal_date()
                .map_or_else(Utc::now, |d| d.with_timezone(&Utc));
            messages.push(MailMessage::from_raw(uid, received, raw));
        }
        Ok(messages)
    }
}

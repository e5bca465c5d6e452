//! `dmarcfetch` — download DMARC aggregate reports from an IMAP mailbox.
//!
//! This crate provides the core library for extracting report attachments
//! from unseen messages, validating their names, unpacking compressed
//! payloads, and storing the XML documents under a date-partitioned tree.

pub mod config;
pub mod decode;
pub mod error;
pub mod extract;
pub mod mailbox;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod store;

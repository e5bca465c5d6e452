//! Data model: fetched messages, attachments, decoded reports.

pub mod attachment;
pub mod message;
pub mod report;

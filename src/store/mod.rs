//! Report persistence.

pub mod writer;

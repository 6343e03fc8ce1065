//! Core use-case services.
//!
//! # Responsibility
//! - Own the entry collection and its write-through persistence.
//! - Keep presentation layers decoupled from storage details.

pub mod entry_store;

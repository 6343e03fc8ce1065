//! Domain model for writing notes.
//!
//! # Responsibility
//! - Define the entry record, its five categories and their variant fields.
//! - Keep the wire shape of the durable mirror in one place.
//!
//! # Invariants
//! - Every entry is identified by a stable `EntryId`.
//! - Deletion is a hard removal; there are no tombstones.

pub mod details;
pub mod entry;
pub mod entry_type;

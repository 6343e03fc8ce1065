//! Form-draft state for creating and editing entries.
//!
//! # Responsibility
//! - Own the name-required rule; the store does not repeat it.

pub mod entry_form;

//! Search entry points.
//!
//! # Responsibility
//! - Expose query helpers over the in-memory entry collection.
//! - Keep matching rules inside core so every surface agrees on them.

pub mod substring;

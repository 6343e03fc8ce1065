//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable slot contract the entry store writes through.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories store opaque strings; they never parse entry payloads.

pub mod slot_repo;

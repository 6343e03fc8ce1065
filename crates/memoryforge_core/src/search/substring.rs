//! Case-insensitive substring search over entries.
//!
//! # Responsibility
//! - Match a query against entry name, description and tags.
//!
//! # Invariants
//! - Matching is literal: an empty query matches every entry. Callers that
//!   treat a blank query as "no search" must check before calling.
//! - Results keep collection order.

use crate::model::entry::Entry;

/// Returns whether `entry` matches `query` on name, description or any tag.
pub fn matches(entry: &Entry, query: &str) -> bool {
    let needle = query.to_lowercase();
    matches_lowercase(entry, &needle)
}

/// Filters `entries` down to those matching `query`, in input order.
pub fn search_entries<'a, I>(entries: I, query: &str) -> Vec<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let needle = query.to_lowercase();
    entries
        .into_iter()
        .filter(|entry| matches_lowercase(entry, &needle))
        .collect()
}

fn matches_lowercase(entry: &Entry, needle: &str) -> bool {
    entry.name.to_lowercase().contains(needle)
        || entry.description.to_lowercase().contains(needle)
        || entry
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

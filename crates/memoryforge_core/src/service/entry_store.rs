//! Entry store: the single owner of the entry collection.
//!
//! # Responsibility
//! - Hold the canonical in-memory list of entries.
//! - Mirror the full list into one durable slot after every mutation.
//! - Answer category and substring queries over the list.
//!
//! # Invariants
//! - Collection order is insertion order; `update` edits in place.
//! - Every successful `add`, every matching `update` and every matching
//!   `remove` rewrites the whole mirror. Nothing is batched.
//! - Storage failures never escape: reads fail open to an empty collection
//!   and failed writes leave memory ahead of a stale mirror.
//! - The store does not validate names; the form layer does.

use crate::model::entry::{Entry, EntryDraft, EntryId, EntryPatch, PatchOutcome};
use crate::model::entry_type::EntryType;
use crate::repo::slot_repo::SlotRepository;
use crate::search::substring::search_entries;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::time::Instant;

/// Slot name of the durable mirror.
pub const DEFAULT_STORAGE_KEY: &str = "writing-assistant-entries";

/// Source of "now" for timestamps.
pub type Clock = fn() -> DateTime<Utc>;

/// Per-category entry counts for dashboard rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryCounts {
    counts: [usize; EntryType::ALL.len()],
}

impl EntryCounts {
    pub fn get(&self, entry_type: EntryType) -> usize {
        self.counts[type_index(entry_type)]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Owned store over a slot repository.
pub struct EntryStore<R: SlotRepository> {
    repo: R,
    key: String,
    entries: Vec<Entry>,
    loaded: bool,
    mirror_stale: bool,
    clock: Clock,
}

impl<R: SlotRepository> EntryStore<R> {
    /// Creates an unloaded, empty store. Call [`EntryStore::load`] before use,
    /// or use [`EntryStore::open`].
    pub fn new(repo: R, key: impl Into<String>) -> Self {
        Self {
            repo,
            key: key.into(),
            entries: Vec::new(),
            loaded: false,
            mirror_stale: false,
            clock: Utc::now,
        }
    }

    /// Creates a store and loads the mirror in one step.
    pub fn open(repo: R, key: impl Into<String>) -> Self {
        let mut store = Self::new(repo, key);
        store.load();
        store
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Reads the durable mirror into memory.
    ///
    /// A missing slot yields an empty collection. A slot that is not a JSON
    /// array yields an empty collection. Array items that do not decode as
    /// entries are skipped. Every path ends with `is_loaded() == true`.
    pub fn load(&mut self) {
        let started_at = Instant::now();
        self.entries = match self.repo.get_item(&self.key) {
            Ok(Some(raw)) => decode_mirror(&raw),
            Ok(None) => {
                info!("event=entries_load module=store status=skip reason=empty_slot");
                Vec::new()
            }
            Err(err) => {
                error!(
                    "event=entries_load module=store status=error error_code=mirror_read_failed error={}",
                    err
                );
                Vec::new()
            }
        };
        self.loaded = true;
        self.mirror_stale = false;
        info!(
            "event=entries_load module=store status=ok count={} duration_ms={}",
            self.entries.len(),
            started_at.elapsed().as_millis()
        );
    }

    /// Whether the initial load has resolved.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the last mirror write failed.
    pub fn is_mirror_stale(&self) -> bool {
        self.mirror_stale
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Materializes and appends a draft, then rewrites the mirror.
    ///
    /// Names are not deduplicated.
    pub fn add(&mut self, draft: EntryDraft) -> Entry {
        let entry = Entry::from_draft(draft, (self.clock)());
        self.entries.push(entry.clone());
        info!(
            "event=entry_add module=store status=ok entry_id={} type={}",
            entry.id,
            entry.entry_type()
        );
        self.persist();
        entry
    }

    /// Merges `patch` into the entry with `id` and rewrites the mirror.
    ///
    /// Returns `false` without touching memory or the mirror when no entry
    /// has that id.
    pub fn update(&mut self, id: EntryId, patch: &EntryPatch) -> bool {
        let now = (self.clock)();
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            debug!("event=entry_update module=store status=skip reason=not_found entry_id={id}");
            return false;
        };

        if let PatchOutcome::DetailsIgnored { patch_type } = entry.apply_patch(patch, now) {
            warn!(
                "event=entry_update module=store status=partial reason=type_immutable entry_id={} type={} patch_type={}",
                id,
                entry.entry_type(),
                patch_type
            );
        }
        info!("event=entry_update module=store status=ok entry_id={id}");
        self.persist();
        true
    }

    /// Removes the entry with `id` and rewrites the mirror.
    ///
    /// Returns `false` without writing when no entry has that id.
    pub fn remove(&mut self, id: EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() == before {
            debug!("event=entry_remove module=store status=skip reason=not_found entry_id={id}");
            return false;
        }

        info!("event=entry_remove module=store status=ok entry_id={id}");
        self.persist();
        true
    }

    /// Entries of one category, in collection order.
    pub fn by_type(&self, entry_type: EntryType) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|entry| entry.entry_type() == entry_type)
            .collect()
    }

    /// Case-insensitive substring search on name, description and tags.
    ///
    /// Applied literally: an empty query returns every entry.
    pub fn search(&self, query: &str) -> Vec<&Entry> {
        search_entries(&self.entries, query)
    }

    pub fn counts(&self) -> EntryCounts {
        let mut counts = EntryCounts::default();
        for entry in &self.entries {
            counts.counts[type_index(entry.entry_type())] += 1;
        }
        counts
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    fn persist(&mut self) {
        let started_at = Instant::now();
        let payload = match serde_json::to_string(&self.entries) {
            Ok(payload) => payload,
            Err(err) => {
                self.mirror_stale = true;
                error!(
                    "event=entries_persist module=store status=error error_code=mirror_encode_failed error={}",
                    err
                );
                return;
            }
        };

        match self.repo.set_item(&self.key, &payload) {
            Ok(()) => {
                self.mirror_stale = false;
                debug!(
                    "event=entries_persist module=store status=ok count={} bytes={} duration_ms={}",
                    self.entries.len(),
                    payload.len(),
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => {
                self.mirror_stale = true;
                error!(
                    "event=entries_persist module=store status=error error_code=mirror_write_failed count={} error={}",
                    self.entries.len(),
                    err
                );
            }
        }
    }
}

fn decode_mirror(raw: &str) -> Vec<Entry> {
    let items = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(items) => items,
        Err(err) => {
            warn!(
                "event=entries_load module=store status=error error_code=mirror_parse_failed error={}",
                err
            );
            return Vec::new();
        }
    };

    let total = items.len();
    let entries = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Entry>(item) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(
                    "event=entries_load module=store status=partial error_code=entry_decode_failed index={} error={}",
                    index, err
                );
                None
            }
        })
        .collect::<Vec<_>>();

    if entries.len() != total {
        warn!(
            "event=entries_load module=store status=partial skipped={}",
            total - entries.len()
        );
    }
    entries
}

fn type_index(entry_type: EntryType) -> usize {
    match entry_type {
        EntryType::Character => 0,
        EntryType::Place => 1,
        EntryType::PlotPoint => 2,
        EntryType::Goal => 3,
        EntryType::Ability => 4,
    }
}

use chrono::{DateTime, TimeZone, Utc};
use memoryforge_core::{
    Entry, EntryDetails, EntryDraft, EntryField, EntryPatch, EntryStore, EntryType,
    MemorySlotRepository, SlotError, SlotRepository, SlotResult, DEFAULT_STORAGE_KEY,
};
use rusqlite::ffi;
use std::cell::Cell;
use std::sync::atomic::{AtomicI64, Ordering};

static TICKS: AtomicI64 = AtomicI64::new(0);

fn ticking_clock() -> DateTime<Utc> {
    let tick = TICKS.fetch_add(1, Ordering::SeqCst);
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(tick)
}

fn open_store(repo: &mut MemorySlotRepository) -> EntryStore<&mut MemorySlotRepository> {
    EntryStore::open(repo, DEFAULT_STORAGE_KEY).with_clock(ticking_clock)
}

fn sqlite_failure(code: i32, message: &str) -> SlotError {
    SlotError::from(rusqlite::Error::SqliteFailure(
        ffi::Error::new(code),
        Some(message.to_string()),
    ))
}

/// In-memory slots whose writes fail while `failing` is set.
struct FlakySlots {
    inner: MemorySlotRepository,
    failing: Cell<bool>,
}

impl FlakySlots {
    fn failing() -> Self {
        Self {
            inner: MemorySlotRepository::new(),
            failing: Cell::new(true),
        }
    }

    fn working() -> Self {
        Self {
            inner: MemorySlotRepository::new(),
            failing: Cell::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    fn mirror(&self) -> Option<String> {
        self.inner.get_item(DEFAULT_STORAGE_KEY).unwrap()
    }
}

impl SlotRepository for FlakySlots {
    fn get_item(&self, key: &str) -> SlotResult<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> SlotResult<()> {
        if self.failing.get() {
            return Err(sqlite_failure(ffi::SQLITE_FULL, "database or disk is full"));
        }
        self.inner.set_item(key, value)
    }
}

/// Fails every read.
struct BrokenSlots;

impl SlotRepository for BrokenSlots {
    fn get_item(&self, _key: &str) -> SlotResult<Option<String>> {
        Err(sqlite_failure(ffi::SQLITE_IOERR, "disk I/O error"))
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> SlotResult<()> {
        Ok(())
    }
}

#[test]
fn add_appends_one_entry_with_generated_id() {
    let mut repo = MemorySlotRepository::new();
    let mut store = open_store(&mut repo);
    let before = store.by_type(EntryType::Place).len();

    let mut details = EntryDetails::empty(EntryType::Place);
    details.set(EntryField::Culture, Some("seafaring")).unwrap();
    let entry = store.add(
        EntryDraft::new(EntryType::Place, "Saltmarch")
            .with_description("a tidal town")
            .with_tags(["coast"])
            .with_details(details.clone()),
    );

    let places = store.by_type(EntryType::Place);
    assert_eq!(places.len(), before + 1);
    assert!(!entry.id.is_nil());
    assert_eq!(places[0], &entry);
    assert_eq!(entry.name, "Saltmarch");
    assert_eq!(entry.description, "a tidal town");
    assert_eq!(entry.tags, vec!["coast".to_string()]);
    assert_eq!(entry.details, details);
    assert_eq!(entry.created_at, entry.updated_at);
}

#[test]
fn add_does_not_deduplicate_names_and_ids_stay_unique() {
    let mut repo = MemorySlotRepository::new();
    let mut store = open_store(&mut repo);

    let first = store.add(EntryDraft::new(EntryType::Character, "Twin"));
    let second = store.add(EntryDraft::new(EntryType::Character, "Twin"));

    assert_eq!(store.by_type(EntryType::Character).len(), 2);
    assert_ne!(first.id, second.id);
}

#[test]
fn update_changes_only_name_and_updated_at() {
    let mut repo = MemorySlotRepository::new();
    let mut store = open_store(&mut repo);
    let original = store.add(
        EntryDraft::new(EntryType::Goal, "Outline")
            .with_description("three acts")
            .with_tags(["planning"]),
    );

    assert!(store.update(original.id, &EntryPatch::rename("X")));

    let updated = store.get(original.id).unwrap();
    assert_eq!(updated.name, "X");
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.description, original.description);
    assert_eq!(updated.tags, original.tags);
    assert_eq!(updated.details, original.details);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at > original.updated_at);
}

#[test]
fn update_unknown_id_leaves_collection_and_mirror_unchanged() {
    let mut repo = MemorySlotRepository::new();
    let (snapshot, mirror_before) = {
        let mut store = open_store(&mut repo);
        store.add(EntryDraft::new(EntryType::Ability, "Shadowstep"));
        let snapshot = store.entries().to_vec();
        let mirror = store.repo().get_item(DEFAULT_STORAGE_KEY).unwrap();

        assert!(!store.update(uuid::Uuid::new_v4(), &EntryPatch::rename("ghost")));
        assert_eq!(store.entries(), snapshot.as_slice());
        (snapshot, mirror)
    };

    assert_eq!(repo.get_item(DEFAULT_STORAGE_KEY).unwrap(), mirror_before);
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn remove_drops_entry_and_unknown_id_is_a_no_op() {
    let mut repo = MemorySlotRepository::new();
    let mut store = open_store(&mut repo);
    let keep = store.add(EntryDraft::new(EntryType::PlotPoint, "Inciting incident"));
    let gone = store.add(EntryDraft::new(EntryType::PlotPoint, "Red herring"));

    assert!(store.remove(gone.id));
    let remaining = store.by_type(EntryType::PlotPoint);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);

    let before = store.entries().to_vec();
    let mirror_before = store.repo().get_item(DEFAULT_STORAGE_KEY).unwrap();
    assert!(!store.remove(gone.id));
    assert_eq!(store.entries(), before.as_slice());
    assert_eq!(
        store.repo().get_item(DEFAULT_STORAGE_KEY).unwrap(),
        mirror_before
    );
}

#[test]
fn by_type_keeps_insertion_order() {
    let mut repo = MemorySlotRepository::new();
    let mut store = open_store(&mut repo);
    store.add(EntryDraft::new(EntryType::Goal, "first"));
    store.add(EntryDraft::new(EntryType::Place, "elsewhere"));
    store.add(EntryDraft::new(EntryType::Goal, "second"));

    let names = store
        .by_type(EntryType::Goal)
        .iter()
        .map(|entry| entry.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn search_matches_name_description_and_tags_case_insensitively() {
    let mut repo = MemorySlotRepository::new();
    let mut store = open_store(&mut repo);
    let by_tag = store.add(EntryDraft::new(EntryType::Character, "Smaug").with_tags(["Dragon"]));
    let by_description = store.add(
        EntryDraft::new(EntryType::Place, "Erebor").with_description("home of a DRAGON"),
    );
    store.add(EntryDraft::new(EntryType::Goal, "Finish draft"));

    assert_eq!(store.search("").len(), 3);

    let hits = store
        .search("dragon")
        .into_iter()
        .map(|entry| entry.id)
        .collect::<Vec<_>>();
    assert_eq!(hits, vec![by_tag.id, by_description.id]);

    assert_eq!(store.search("FINISH").len(), 1);
    assert!(store.search("unicorn").is_empty());
}

#[test]
fn mutations_write_through_and_survive_reload() {
    let mut repo = MemorySlotRepository::new();
    let (kept_id, entries) = {
        let mut store = open_store(&mut repo);
        let kept = store.add(EntryDraft::new(EntryType::Character, "Aria"));
        let dropped = store.add(EntryDraft::new(EntryType::Character, "Bren"));
        store.update(kept.id, &EntryPatch::rename("Aria Vale"));
        store.remove(dropped.id);
        (kept.id, store.entries().to_vec())
    };

    let reloaded = EntryStore::open(&mut repo, DEFAULT_STORAGE_KEY);
    assert_eq!(reloaded.entries(), entries.as_slice());
    assert_eq!(reloaded.get(kept_id).unwrap().name, "Aria Vale");
}

#[test]
fn missing_or_corrupt_mirror_loads_empty() {
    let empty = EntryStore::open(MemorySlotRepository::new(), DEFAULT_STORAGE_KEY);
    assert!(empty.is_loaded());
    assert!(empty.is_empty());

    let corrupt = MemorySlotRepository::new().with_item(DEFAULT_STORAGE_KEY, "{not json");
    let store = EntryStore::open(corrupt, DEFAULT_STORAGE_KEY);
    assert!(store.is_loaded());
    assert!(store.is_empty());

    let wrong_shape = MemorySlotRepository::new().with_item(DEFAULT_STORAGE_KEY, r#"{"a":1}"#);
    assert!(EntryStore::open(wrong_shape, DEFAULT_STORAGE_KEY).is_empty());
}

#[test]
fn read_failure_fails_open_to_empty_collection() {
    let mut store = EntryStore::open(BrokenSlots, DEFAULT_STORAGE_KEY);
    assert!(store.is_loaded());
    assert!(store.is_empty());

    store.add(EntryDraft::new(EntryType::Place, "Still works"));
    assert_eq!(store.len(), 1);
}

#[test]
fn write_failure_keeps_memory_and_marks_mirror_stale() {
    let mut store = EntryStore::open(FlakySlots::failing(), DEFAULT_STORAGE_KEY);

    let entry = store.add(EntryDraft::new(EntryType::Ability, "Firebrand"));

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(entry.id).unwrap().name, "Firebrand");
    assert!(store.is_mirror_stale());
    assert_eq!(store.repo().mirror(), None, "mirror must remain untouched");
}

#[test]
fn failed_update_and_remove_stay_stale_until_a_write_succeeds() {
    let mut store =
        EntryStore::open(FlakySlots::working(), DEFAULT_STORAGE_KEY).with_clock(ticking_clock);
    let kept = store.add(EntryDraft::new(EntryType::Character, "A"));
    let dropped = store.add(EntryDraft::new(EntryType::Character, "Gone"));
    assert!(!store.is_mirror_stale());
    let saved = store.repo().mirror();

    store.repo().set_failing(true);
    assert!(store.update(kept.id, &EntryPatch::rename("B")));
    assert_eq!(store.get(kept.id).unwrap().name, "B");
    assert!(store.is_mirror_stale());

    assert!(store.remove(dropped.id));
    assert!(store.get(dropped.id).is_none());
    assert!(store.is_mirror_stale());
    assert_eq!(store.repo().mirror(), saved);

    store.repo().set_failing(false);
    store.add(EntryDraft::new(EntryType::Goal, "Recover"));
    assert!(!store.is_mirror_stale());

    let mirror: Vec<Entry> = serde_json::from_str(&store.repo().mirror().unwrap()).unwrap();
    assert_eq!(mirror, store.entries());
    assert_eq!(mirror[0].name, "B");
    assert_eq!(mirror.len(), 2);
}

#[test]
fn aria_lifecycle_scenario() {
    let mut repo = MemorySlotRepository::new();
    let mut store = open_store(&mut repo);

    let aria = store.add(EntryDraft::new(EntryType::Character, "Aria").with_tags(["protagonist"]));
    assert_eq!(store.by_type(EntryType::Character).len(), 1);

    let hits = store.search("prot");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, aria.id);

    assert!(store.remove(aria.id));
    assert_eq!(store.by_type(EntryType::Character).len(), 0);
}

#[test]
fn update_with_never_added_id_creates_nothing() {
    let mut repo = MemorySlotRepository::new();
    let mut store = open_store(&mut repo);
    store.add(EntryDraft::new(EntryType::Goal, "Revise"));
    let before = store.entries().to_vec();

    store.update(uuid::Uuid::new_v4(), &EntryPatch::rename("Phantom"));

    assert_eq!(store.entries(), before.as_slice());
    assert!(store.search("Phantom").is_empty());
}

//! Core domain logic for Memory Forge, a local notebook for fiction writers.
//! This crate is the single source of truth for entry invariants.

pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod view;

pub use form::entry_form::{EntryForm, FormError, FormSubmission};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::details::{
    AbilityDetails, CharacterDetails, DetailsError, EntryDetails, GoalDetails, GoalStatus, Level,
    PlaceDetails, PlotPointDetails,
};
pub use model::entry::{
    Entry, EntryDraft, EntryId, EntryPatch, EntryValidationError, PatchOutcome,
};
pub use model::entry_type::{EntryField, EntryType, ParseEnumError};
pub use repo::slot_repo::{
    MemorySlotRepository, SlotError, SlotRepository, SlotResult, SqliteSlotRepository,
};
pub use search::substring::{matches, search_entries};
pub use service::entry_store::{Clock, EntryCounts, EntryStore, DEFAULT_STORAGE_KEY};
pub use view::controller::{Notice, Overlay, SaveOutcome, Screen, ViewController, ViewMode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

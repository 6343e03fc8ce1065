//! View-state machine over the entry store.
//!
//! # Responsibility
//! - Track which screen is shown (dashboard, one category, search results).
//! - Track the create/edit overlay independently of the screen beneath it.
//! - Route user intents to the store and pick what to render next.
//!
//! # Invariants
//! - A blank search query always returns to the dashboard.
//! - Deleting the last entry of a category stays on that category.
//! - Closing the overlay never changes `mode`.
//! - All mutations go through `EntryStore`; the controller holds no entries.

use crate::form::entry_form::{EntryForm, FormSubmission};
use crate::model::entry::{Entry, EntryId};
use crate::model::entry_type::EntryType;
use crate::repo::slot_repo::SlotRepository;
use crate::service::entry_store::{EntryCounts, EntryStore};
use log::debug;

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Dashboard,
    Category,
    Search,
}

impl ViewMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Category => "category",
            Self::Search => "search",
        }
    }
}

/// Create/edit overlay layered over any `ViewMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Closed,
    Open {
        entry_type: EntryType,
        /// `Some` when editing an existing entry.
        target: Option<EntryId>,
    },
}

/// Transient confirmation shown once after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created,
    Updated,
    Deleted,
}

impl Notice {
    pub fn title(self) -> &'static str {
        match self {
            Self::Created => "Entry created",
            Self::Updated => "Entry updated",
            Self::Deleted => "Entry deleted",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Created => "Your new entry has been successfully created.",
            Self::Updated => "Your entry has been successfully updated.",
            Self::Deleted => "Your entry has been successfully deleted.",
        }
    }
}

/// What `save` did with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Entry),
    Updated(EntryId),
    /// The edited entry no longer exists; nothing changed.
    Missing(EntryId),
}

/// Render model derived from controller state plus a store snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen<'a> {
    Loading,
    Dashboard {
        counts: EntryCounts,
    },
    /// `entries` may be empty; render the empty-state prompt then.
    Category {
        entry_type: EntryType,
        entries: Vec<&'a Entry>,
    },
    Search {
        query: &'a str,
        results: Vec<&'a Entry>,
    },
}

/// UI-only state plus intent routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewController {
    mode: ViewMode,
    selected_type: EntryType,
    search_query: String,
    overlay: Overlay,
    notice: Option<Notice>,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        Self {
            mode: ViewMode::Dashboard,
            selected_type: EntryType::Character,
            search_query: String::new(),
            overlay: Overlay::Closed,
            notice: None,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn selected_type(&self) -> EntryType {
        self.selected_type
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    /// Opens one category's list.
    pub fn select_category(&mut self, entry_type: EntryType) {
        self.selected_type = entry_type;
        self.transition(ViewMode::Category);
    }

    /// Opens the overlay for a new entry; the screen beneath is unchanged.
    pub fn open_create(&mut self, entry_type: EntryType) -> EntryForm {
        self.overlay = Overlay::Open {
            entry_type,
            target: None,
        };
        debug!("event=overlay_open module=view mode=create type={entry_type}");
        EntryForm::create(entry_type)
    }

    /// Opens the overlay prefilled with `entry`.
    pub fn open_edit(&mut self, entry: &Entry) -> EntryForm {
        self.overlay = Overlay::Open {
            entry_type: entry.entry_type(),
            target: Some(entry.id),
        };
        debug!(
            "event=overlay_open module=view mode=edit type={} entry_id={}",
            entry.entry_type(),
            entry.id
        );
        EntryForm::edit(entry)
    }

    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::Closed;
    }

    /// Applies a search box submission.
    ///
    /// Non-blank text switches to search from any screen; blank text returns
    /// to the dashboard from any screen.
    pub fn submit_search(&mut self, query: &str) {
        self.search_query = query.to_string();
        if query.trim().is_empty() {
            self.transition(ViewMode::Dashboard);
        } else {
            self.transition(ViewMode::Search);
        }
    }

    /// Explicit back action.
    pub fn go_back(&mut self) {
        self.transition(ViewMode::Dashboard);
    }

    /// Routes a validated form to `add` or `update` and closes the overlay.
    pub fn save<R: SlotRepository>(
        &mut self,
        store: &mut EntryStore<R>,
        submission: FormSubmission,
    ) -> SaveOutcome {
        let outcome = match submission.target {
            Some(id) => {
                if store.update(id, &submission.to_patch()) {
                    self.notice = Some(Notice::Updated);
                    SaveOutcome::Updated(id)
                } else {
                    SaveOutcome::Missing(id)
                }
            }
            None => {
                let entry = store.add(submission.draft);
                self.notice = Some(Notice::Created);
                SaveOutcome::Created(entry)
            }
        };
        self.close_overlay();
        outcome
    }

    /// Deletes an entry. The current screen is kept even if it becomes empty.
    pub fn delete<R: SlotRepository>(&mut self, store: &mut EntryStore<R>, id: EntryId) -> bool {
        if !store.remove(id) {
            return false;
        }
        if matches!(self.overlay, Overlay::Open { target: Some(target), .. } if target == id) {
            self.close_overlay();
        }
        self.notice = Some(Notice::Deleted);
        true
    }

    /// Returns and clears the pending confirmation.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Derives the screen to render. Search results are recomputed from the
    /// current collection on every call.
    pub fn screen<'a, R: SlotRepository>(&'a self, store: &'a EntryStore<R>) -> Screen<'a> {
        if !store.is_loaded() {
            return Screen::Loading;
        }

        match self.mode {
            ViewMode::Dashboard => Screen::Dashboard {
                counts: store.counts(),
            },
            ViewMode::Category => Screen::Category {
                entry_type: self.selected_type,
                entries: store.by_type(self.selected_type),
            },
            ViewMode::Search => Screen::Search {
                query: &self.search_query,
                results: store.search(&self.search_query),
            },
        }
    }

    fn transition(&mut self, next: ViewMode) {
        if self.mode != next {
            debug!(
                "event=view_transition module=view from={} to={}",
                self.mode.as_str(),
                next.as_str()
            );
        }
        self.mode = next;
    }
}

//! Entry domain model.
//!
//! # Responsibility
//! - Define the canonical record for every category of writing note.
//! - Define the draft (create) and patch (update) inputs of the store.
//!
//! # Invariants
//! - `id` is stable, never nil and never reused for another entry.
//! - `entry_type()` is derived from `details` and cannot change on update.
//! - `created_at` is set once; `updated_at` moves on every mutation.
//! - Name non-emptiness is checked by `validate()`, which the form layer
//!   calls. The store accepts whatever it is given.

use crate::model::details::EntryDetails;
use crate::model::entry_type::{EntryField, EntryType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of an entry.
pub type EntryId = Uuid;

/// One user-authored record.
///
/// Serialized as a flat camelCase JSON object with a `type` discriminant
/// next to the variant fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Order carries no meaning; kept as written for stable rendering.
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: EntryDetails,
}

/// Entry data as authored, before the store assigns identity and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub details: EntryDetails,
}

/// Partial change set for `EntryStore::update`.
///
/// `None` leaves the field untouched. `details` merges field by field, see
/// [`EntryDetails::merge_from`]; `clear` then unsets the listed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub details: Option<EntryDetails>,
    pub clear: Vec<EntryField>,
}

/// Validation failures for authored entry data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyName,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "entry name must not be empty"),
        }
    }
}

impl Error for EntryValidationError {}

impl Entry {
    /// Materializes a draft with a fresh v4 id, both timestamps set to `now`.
    pub fn from_draft(draft: EntryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
            details: draft.details,
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.details.entry_type()
    }

    /// Applies a patch and stamps `updated_at`.
    ///
    /// A details patch of another category is dropped; the return value
    /// reports whether that happened so callers can log it.
    pub fn apply_patch(&mut self, patch: &EntryPatch, now: DateTime<Utc>) -> PatchOutcome {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }

        let outcome = match &patch.details {
            Some(details) if !self.details.merge_from(details) => PatchOutcome::DetailsIgnored {
                patch_type: details.entry_type(),
            },
            _ => PatchOutcome::Applied,
        };
        let own_type = self.entry_type();
        for field in patch.clear.iter().filter(|field| field.entry_type() == own_type) {
            // Clearing a field of our own category cannot fail.
            let _ = self.details.set(*field, None);
        }

        self.updated_at = now;
        outcome
    }
}

/// Result of [`Entry::apply_patch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    DetailsIgnored { patch_type: EntryType },
}

impl EntryDraft {
    /// Draft with empty text fields and no variant data.
    pub fn new(entry_type: EntryType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            details: EntryDetails::empty(entry_type),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.details.entry_type()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_details(mut self, details: EntryDetails) -> Self {
        self.details = details;
        self
    }

    pub fn validate(&self) -> Result<(), EntryValidationError> {
        validate_name(&self.name)
    }
}

impl EntryPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

fn validate_name(name: &str) -> Result<(), EntryValidationError> {
    if name.trim().is_empty() {
        return Err(EntryValidationError::EmptyName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Entry, EntryDraft, EntryPatch, EntryValidationError, PatchOutcome};
    use crate::model::details::EntryDetails;
    use crate::model::entry_type::{EntryField, EntryType};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn from_draft_sets_identity_and_matching_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let entry = Entry::from_draft(EntryDraft::new(EntryType::Place, "Harbor"), now);

        assert!(!entry.id.is_nil());
        assert_eq!(entry.created_at, now);
        assert_eq!(entry.updated_at, now);
        assert_eq!(entry.entry_type(), EntryType::Place);
    }

    #[test]
    fn apply_patch_touches_only_named_fields() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut entry = Entry::from_draft(
            EntryDraft::new(EntryType::Character, "Aria")
                .with_description("a bard")
                .with_tags(["protagonist"]),
            created,
        );
        let later = created + Duration::minutes(5);

        let outcome = entry.apply_patch(&EntryPatch::rename("Arya"), later);

        assert_eq!(outcome, PatchOutcome::Applied);
        assert_eq!(entry.name, "Arya");
        assert_eq!(entry.description, "a bard");
        assert_eq!(entry.tags, vec!["protagonist".to_string()]);
        assert_eq!(entry.created_at, created);
        assert_eq!(entry.updated_at, later);
    }

    #[test]
    fn apply_patch_with_foreign_details_keeps_type() {
        let now = Utc::now();
        let mut entry = Entry::from_draft(EntryDraft::new(EntryType::Goal, "Finish act one"), now);
        let mut foreign = EntryDetails::empty(EntryType::Ability);
        foreign.set(EntryField::Power, Some("flight")).unwrap();

        let outcome = entry.apply_patch(
            &EntryPatch {
                details: Some(foreign),
                ..EntryPatch::default()
            },
            now,
        );

        assert_eq!(
            outcome,
            PatchOutcome::DetailsIgnored {
                patch_type: EntryType::Ability
            }
        );
        assert_eq!(entry.entry_type(), EntryType::Goal);
    }

    #[test]
    fn apply_patch_clears_listed_fields() {
        let now = Utc::now();
        let mut details = EntryDetails::empty(EntryType::PlotPoint);
        details.set(EntryField::Chapter, Some("7")).unwrap();
        details.set(EntryField::Importance, Some("high")).unwrap();
        let mut entry = Entry::from_draft(
            EntryDraft::new(EntryType::PlotPoint, "Betrayal").with_details(details),
            now,
        );

        entry.apply_patch(
            &EntryPatch {
                clear: vec![EntryField::Importance, EntryField::Power],
                ..EntryPatch::default()
            },
            now,
        );

        assert_eq!(entry.details.get(EntryField::Importance), None);
        assert_eq!(entry.details.get(EntryField::Chapter).as_deref(), Some("7"));
    }

    #[test]
    fn draft_validate_rejects_blank_name() {
        let draft = EntryDraft::new(EntryType::Place, "  \t ");
        assert_eq!(draft.validate(), Err(EntryValidationError::EmptyName));
        assert!(EntryDraft::new(EntryType::Place, " Keep ").validate().is_ok());
    }
}

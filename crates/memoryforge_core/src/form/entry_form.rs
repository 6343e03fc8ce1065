//! Create/edit form draft for one entry.
//!
//! # Responsibility
//! - Hold the editable text of an entry while the overlay is open.
//! - Enforce authored-data rules before anything reaches the store.
//!
//! # Invariants
//! - The form's category is fixed at construction.
//! - Tags in the draft are trimmed, non-empty and unique.
//! - `submit` never produces a draft whose trimmed name is empty.

use crate::model::details::{DetailsError, EntryDetails};
use crate::model::entry::{Entry, EntryDraft, EntryId, EntryPatch, EntryValidationError};
use crate::model::entry_type::{EntryField, EntryType};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reasons a form cannot be submitted or edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    EmptyName,
    FieldNotApplicable {
        field: EntryField,
        entry_type: EntryType,
    },
    InvalidChoice {
        field: EntryField,
        value: String,
    },
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name is required"),
            Self::FieldNotApplicable { field, entry_type } => {
                write!(f, "field `{field}` does not apply to {entry_type} entries")
            }
            Self::InvalidChoice { field, value } => {
                write!(f, "`{value}` is not a valid value for `{field}`")
            }
        }
    }
}

impl Error for FormError {}

impl From<DetailsError> for FormError {
    fn from(value: DetailsError) -> Self {
        match value {
            DetailsError::FieldNotApplicable { field, entry_type } => {
                Self::FieldNotApplicable { field, entry_type }
            }
            DetailsError::InvalidChoice { field, value } => Self::InvalidChoice { field, value },
        }
    }
}

impl From<EntryValidationError> for FormError {
    fn from(_: EntryValidationError) -> Self {
        Self::EmptyName
    }
}

/// Validated form output, ready to route to `add` or `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    /// `Some` when editing an existing entry.
    pub target: Option<EntryId>,
    pub draft: EntryDraft,
    /// Variant fields left blank; an edit unsets them.
    pub blank_fields: Vec<EntryField>,
}

impl FormSubmission {
    /// Converts the submission into a full-replacement patch for an edit.
    pub fn to_patch(&self) -> EntryPatch {
        EntryPatch {
            name: Some(self.draft.name.clone()),
            description: Some(self.draft.description.clone()),
            tags: Some(self.draft.tags.clone()),
            details: Some(self.draft.details.clone()),
            clear: self.blank_fields.clone(),
        }
    }
}

/// Editable draft state behind the create/edit overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    entry_type: EntryType,
    target: Option<EntryId>,
    name: String,
    description: String,
    tags: Vec<String>,
    fields: BTreeMap<EntryField, String>,
}

impl EntryForm {
    /// Blank form for a new entry of `entry_type`.
    pub fn create(entry_type: EntryType) -> Self {
        Self {
            entry_type,
            target: None,
            name: String::new(),
            description: String::new(),
            tags: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Form prefilled from an existing entry.
    pub fn edit(entry: &Entry) -> Self {
        Self {
            entry_type: entry.entry_type(),
            target: Some(entry.id),
            name: entry.name.clone(),
            description: entry.description.clone(),
            tags: entry.tags.clone(),
            fields: entry.details.filled_fields().into_iter().collect(),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn target(&self) -> Option<EntryId> {
        self.target
    }

    pub fn is_edit(&self) -> bool {
        self.target.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Current text of a variant field, empty when unset.
    pub fn field(&self, field: EntryField) -> &str {
        self.fields.get(&field).map_or("", String::as_str)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Adds a trimmed tag. Returns `false` for blank or duplicate input.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let tag = raw.trim();
        if tag.is_empty() || self.tags.iter().any(|existing| existing == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag);
        self.tags.len() != before
    }

    /// Sets the text of a variant field of this form's category.
    ///
    /// Choice fields are checked at submit time so partially typed input
    /// does not error.
    pub fn set_field(&mut self, field: EntryField, value: impl Into<String>) -> Result<(), FormError> {
        if field.entry_type() != self.entry_type {
            return Err(FormError::FieldNotApplicable {
                field,
                entry_type: self.entry_type,
            });
        }
        self.fields.insert(field, value.into());
        Ok(())
    }

    /// Validates the draft and produces a submission.
    ///
    /// # Errors
    /// - `EmptyName` when the trimmed name is empty.
    /// - `InvalidChoice` when a choice field holds unknown text.
    pub fn submit(&self) -> Result<FormSubmission, FormError> {
        let mut details = EntryDetails::empty(self.entry_type);
        let mut blank_fields = Vec::new();
        for field in self.entry_type.fields() {
            let text = self.field(*field).trim();
            if text.is_empty() {
                blank_fields.push(*field);
                continue;
            }
            details.set(*field, Some(text))?;
        }

        let draft = EntryDraft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            tags: self.tags.clone(),
            details,
        };
        draft.validate()?;

        Ok(FormSubmission {
            target: self.target,
            draft,
            blank_fields,
        })
    }
}

//! Variant-specific entry payloads.
//!
//! # Responsibility
//! - Carry the optional per-category fields of an entry.
//! - Provide field-keyed read/write access so forms and patches do not need
//!   to match on every variant.
//!
//! # Invariants
//! - The serde tag (`type`) is derived from the variant, so the discriminant
//!   can never disagree with the fields carried.
//! - Choice fields stored as `""` read back as unset.

use crate::model::entry_type::{EntryField, EntryType, ParseEnumError};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Three-step scale used by plot point importance and goal priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Level {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError::new("level", value)),
        }
    }
}

/// Goal progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for GoalStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value
            .trim()
            .to_ascii_lowercase()
            .replace(['-', ' '], "_")
            .as_str()
        {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError::new("goal status", value)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geography: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significance: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotPointDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequence: Option<String>,
    /// Free text; not a reference to character entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_choice_as_none"
    )]
    pub importance: Option<Level>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_choice_as_none"
    )]
    pub priority: Option<Level>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_choice_as_none"
    )]
    pub status: Option<GoalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limitations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<String>,
}

/// Tagged union of per-category payloads, flattened into `Entry` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryDetails {
    Character(CharacterDetails),
    Place(PlaceDetails),
    PlotPoint(PlotPointDetails),
    Goal(GoalDetails),
    Ability(AbilityDetails),
}

/// Error for field-keyed writes into `EntryDetails`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailsError {
    /// The field belongs to another category.
    FieldNotApplicable {
        field: EntryField,
        entry_type: EntryType,
    },
    /// Choice field received text outside its allowed values.
    InvalidChoice { field: EntryField, value: String },
}

impl Display for DetailsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldNotApplicable { field, entry_type } => {
                write!(f, "field `{field}` does not apply to {entry_type} entries")
            }
            Self::InvalidChoice { field, value } => {
                write!(f, "`{value}` is not a valid value for `{field}`")
            }
        }
    }
}

impl Error for DetailsError {}

enum Slot<'a> {
    Text(&'a mut Option<String>),
    Level(&'a mut Option<Level>),
    Status(&'a mut Option<GoalStatus>),
}

/// Read-only view of one field.
enum SlotRef<'a> {
    Text(&'a Option<String>),
    Level(Option<Level>),
    Status(Option<GoalStatus>),
}

impl SlotRef<'_> {
    fn to_text(&self) -> Option<String> {
        match self {
            Self::Text(value) => (*value).clone(),
            Self::Level(value) => value.map(|level| level.as_str().to_string()),
            Self::Status(value) => value.map(|status| status.as_str().to_string()),
        }
    }
}

impl EntryDetails {
    /// Payload with every variant field unset.
    pub fn empty(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Character => Self::Character(CharacterDetails::default()),
            EntryType::Place => Self::Place(PlaceDetails::default()),
            EntryType::PlotPoint => Self::PlotPoint(PlotPointDetails::default()),
            EntryType::Goal => Self::Goal(GoalDetails::default()),
            EntryType::Ability => Self::Ability(AbilityDetails::default()),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::Character(_) => EntryType::Character,
            Self::Place(_) => EntryType::Place,
            Self::PlotPoint(_) => EntryType::PlotPoint,
            Self::Goal(_) => EntryType::Goal,
            Self::Ability(_) => EntryType::Ability,
        }
    }

    /// Returns the text form of one field, or `None` when unset or when the
    /// field belongs to another category.
    pub fn get(&self, field: EntryField) -> Option<String> {
        self.slot_ref(field)?.to_text()
    }

    /// Writes one field from text. `None` or blank text clears it.
    ///
    /// # Errors
    /// - `FieldNotApplicable` when `field` belongs to another category.
    /// - `InvalidChoice` when a choice field receives unknown text.
    pub fn set(&mut self, field: EntryField, value: Option<&str>) -> Result<(), DetailsError> {
        let entry_type = self.entry_type();
        let slot = self
            .slot(field)
            .ok_or(DetailsError::FieldNotApplicable { field, entry_type })?;
        let value = value.filter(|text| !text.trim().is_empty());

        match slot {
            Slot::Text(target) => *target = value.map(str::to_string),
            Slot::Level(target) => *target = parse_choice(field, value)?,
            Slot::Status(target) => *target = parse_choice(field, value)?,
        }
        Ok(())
    }

    /// Iterates set fields in display order as `(field, text)`.
    pub fn filled_fields(&self) -> Vec<(EntryField, String)> {
        self.entry_type()
            .fields()
            .iter()
            .filter_map(|field| self.get(*field).map(|value| (*field, value)))
            .collect()
    }

    /// Merges a partial payload into this one.
    ///
    /// Fields set in `patch` replace ours; blank text clears; unset fields
    /// keep the current value. Returns `false` and changes nothing when
    /// `patch` is of another category.
    pub fn merge_from(&mut self, patch: &EntryDetails) -> bool {
        if patch.entry_type() != self.entry_type() {
            return false;
        }

        for field in self.entry_type().fields() {
            if let Some(text) = patch.get(*field) {
                // Values came from a typed payload of the same category.
                let _ = self.set(*field, Some(text.as_str()));
            }
        }
        true
    }

    /// Clears blank text fields so drafts do not persist empty strings.
    pub fn normalized(mut self) -> Self {
        for field in self.entry_type().fields() {
            if let Some(Slot::Text(value)) = self.slot(*field) {
                if value.as_deref().is_some_and(|text| text.trim().is_empty()) {
                    *value = None;
                }
            }
        }
        self
    }

    fn slot_ref(&self, field: EntryField) -> Option<SlotRef<'_>> {
        let slot = match (self, field) {
            (Self::Character(d), EntryField::Appearance) => SlotRef::Text(&d.appearance),
            (Self::Character(d), EntryField::Personality) => SlotRef::Text(&d.personality),
            (Self::Character(d), EntryField::Background) => SlotRef::Text(&d.background),
            (Self::Character(d), EntryField::Relationships) => SlotRef::Text(&d.relationships),
            (Self::Place(d), EntryField::Geography) => SlotRef::Text(&d.geography),
            (Self::Place(d), EntryField::Culture) => SlotRef::Text(&d.culture),
            (Self::Place(d), EntryField::History) => SlotRef::Text(&d.history),
            (Self::Place(d), EntryField::Significance) => SlotRef::Text(&d.significance),
            (Self::PlotPoint(d), EntryField::Chapter) => SlotRef::Text(&d.chapter),
            (Self::PlotPoint(d), EntryField::Consequence) => SlotRef::Text(&d.consequence),
            (Self::PlotPoint(d), EntryField::Characters) => SlotRef::Text(&d.characters),
            (Self::PlotPoint(d), EntryField::Importance) => SlotRef::Level(d.importance),
            (Self::Goal(d), EntryField::Deadline) => SlotRef::Text(&d.deadline),
            (Self::Goal(d), EntryField::Priority) => SlotRef::Level(d.priority),
            (Self::Goal(d), EntryField::Status) => SlotRef::Status(d.status),
            (Self::Goal(d), EntryField::Steps) => SlotRef::Text(&d.steps),
            (Self::Ability(d), EntryField::Power) => SlotRef::Text(&d.power),
            (Self::Ability(d), EntryField::Limitations) => SlotRef::Text(&d.limitations),
            (Self::Ability(d), EntryField::Cost) => SlotRef::Text(&d.cost),
            (Self::Ability(d), EntryField::Users) => SlotRef::Text(&d.users),
            _ => return None,
        };
        Some(slot)
    }

    fn slot(&mut self, field: EntryField) -> Option<Slot<'_>> {
        let slot = match (self, field) {
            (Self::Character(d), EntryField::Appearance) => Slot::Text(&mut d.appearance),
            (Self::Character(d), EntryField::Personality) => Slot::Text(&mut d.personality),
            (Self::Character(d), EntryField::Background) => Slot::Text(&mut d.background),
            (Self::Character(d), EntryField::Relationships) => Slot::Text(&mut d.relationships),
            (Self::Place(d), EntryField::Geography) => Slot::Text(&mut d.geography),
            (Self::Place(d), EntryField::Culture) => Slot::Text(&mut d.culture),
            (Self::Place(d), EntryField::History) => Slot::Text(&mut d.history),
            (Self::Place(d), EntryField::Significance) => Slot::Text(&mut d.significance),
            (Self::PlotPoint(d), EntryField::Chapter) => Slot::Text(&mut d.chapter),
            (Self::PlotPoint(d), EntryField::Consequence) => Slot::Text(&mut d.consequence),
            (Self::PlotPoint(d), EntryField::Characters) => Slot::Text(&mut d.characters),
            (Self::PlotPoint(d), EntryField::Importance) => Slot::Level(&mut d.importance),
            (Self::Goal(d), EntryField::Deadline) => Slot::Text(&mut d.deadline),
            (Self::Goal(d), EntryField::Priority) => Slot::Level(&mut d.priority),
            (Self::Goal(d), EntryField::Status) => Slot::Status(&mut d.status),
            (Self::Goal(d), EntryField::Steps) => Slot::Text(&mut d.steps),
            (Self::Ability(d), EntryField::Power) => Slot::Text(&mut d.power),
            (Self::Ability(d), EntryField::Limitations) => Slot::Text(&mut d.limitations),
            (Self::Ability(d), EntryField::Cost) => Slot::Text(&mut d.cost),
            (Self::Ability(d), EntryField::Users) => Slot::Text(&mut d.users),
            _ => return None,
        };
        Some(slot)
    }
}

fn parse_choice<T: FromStr>(
    field: EntryField,
    value: Option<&str>,
) -> Result<Option<T>, DetailsError> {
    value
        .map(|text| {
            text.parse::<T>().map_err(|_| DetailsError::InvalidChoice {
                field,
                value: text.to_string(),
            })
        })
        .transpose()
}

fn blank_choice_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

//! Entry categories and their per-type field layout.
//!
//! # Responsibility
//! - Name the five entry categories and their stable wire strings.
//! - Describe which variant fields each category carries, in display order.
//!
//! # Invariants
//! - `EntryType::ALL` is the dashboard order and never changes at runtime.
//! - Every `EntryField` belongs to exactly one `EntryType`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Discriminant of an entry. Serialized as the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Character,
    Place,
    PlotPoint,
    Goal,
    Ability,
}

impl EntryType {
    /// All categories in dashboard order.
    pub const ALL: [EntryType; 5] = [
        Self::Character,
        Self::Place,
        Self::PlotPoint,
        Self::Goal,
        Self::Ability,
    ];

    /// Stable wire string used in the durable mirror.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Place => "place",
            Self::PlotPoint => "plotpoint",
            Self::Goal => "goal",
            Self::Ability => "ability",
        }
    }

    /// Plural category label, e.g. `Plot Points`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Character => "Characters",
            Self::Place => "Places",
            Self::PlotPoint => "Plot Points",
            Self::Goal => "Goals",
            Self::Ability => "Abilities",
        }
    }

    /// Singular label, e.g. `Plot Point`.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Character => "Character",
            Self::Place => "Place",
            Self::PlotPoint => "Plot Point",
            Self::Goal => "Goal",
            Self::Ability => "Ability",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Character => "👤",
            Self::Place => "🏛️",
            Self::PlotPoint => "📚",
            Self::Goal => "🎯",
            Self::Ability => "⚡",
        }
    }

    /// Variant fields carried by this category, in form/display order.
    pub fn fields(self) -> &'static [EntryField] {
        match self {
            Self::Character => &[
                EntryField::Appearance,
                EntryField::Personality,
                EntryField::Background,
                EntryField::Relationships,
            ],
            Self::Place => &[
                EntryField::Geography,
                EntryField::Culture,
                EntryField::History,
                EntryField::Significance,
            ],
            Self::PlotPoint => &[
                EntryField::Chapter,
                EntryField::Consequence,
                EntryField::Characters,
                EntryField::Importance,
            ],
            Self::Goal => &[
                EntryField::Deadline,
                EntryField::Priority,
                EntryField::Status,
                EntryField::Steps,
            ],
            Self::Ability => &[
                EntryField::Power,
                EntryField::Limitations,
                EntryField::Cost,
                EntryField::Users,
            ],
        }
    }
}

impl Display for EntryType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = ParseEnumError;

    /// Accepts the wire string, case-insensitively, plus the common plural
    /// spellings a user is likely to type (`characters`, `plot-points`, ...).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .to_ascii_lowercase()
            .replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "character" | "characters" => Ok(Self::Character),
            "place" | "places" => Ok(Self::Place),
            "plotpoint" | "plotpoints" => Ok(Self::PlotPoint),
            "goal" | "goals" => Ok(Self::Goal),
            "ability" | "abilities" => Ok(Self::Ability),
            _ => Err(ParseEnumError::new("entry type", value)),
        }
    }
}

/// Variant-specific field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryField {
    Appearance,
    Personality,
    Background,
    Relationships,
    Geography,
    Culture,
    History,
    Significance,
    Chapter,
    Consequence,
    Characters,
    Importance,
    Deadline,
    Priority,
    Status,
    Steps,
    Power,
    Limitations,
    Cost,
    Users,
}

impl EntryField {
    /// Wire key of this field in the durable mirror.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Appearance => "appearance",
            Self::Personality => "personality",
            Self::Background => "background",
            Self::Relationships => "relationships",
            Self::Geography => "geography",
            Self::Culture => "culture",
            Self::History => "history",
            Self::Significance => "significance",
            Self::Chapter => "chapter",
            Self::Consequence => "consequence",
            Self::Characters => "characters",
            Self::Importance => "importance",
            Self::Deadline => "deadline",
            Self::Priority => "priority",
            Self::Status => "status",
            Self::Steps => "steps",
            Self::Power => "power",
            Self::Limitations => "limitations",
            Self::Cost => "cost",
            Self::Users => "users",
        }
    }

    /// Capitalized label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Appearance => "Appearance",
            Self::Personality => "Personality",
            Self::Background => "Background",
            Self::Relationships => "Relationships",
            Self::Geography => "Geography",
            Self::Culture => "Culture",
            Self::History => "History",
            Self::Significance => "Significance",
            Self::Chapter => "Chapter",
            Self::Consequence => "Consequence",
            Self::Characters => "Characters",
            Self::Importance => "Importance",
            Self::Deadline => "Deadline",
            Self::Priority => "Priority",
            Self::Status => "Status",
            Self::Steps => "Steps",
            Self::Power => "Power",
            Self::Limitations => "Limitations",
            Self::Cost => "Cost",
            Self::Users => "Users",
        }
    }

    /// Category this field belongs to.
    pub fn entry_type(self) -> EntryType {
        match self {
            Self::Appearance | Self::Personality | Self::Background | Self::Relationships => {
                EntryType::Character
            }
            Self::Geography | Self::Culture | Self::History | Self::Significance => {
                EntryType::Place
            }
            Self::Chapter | Self::Consequence | Self::Characters | Self::Importance => {
                EntryType::PlotPoint
            }
            Self::Deadline | Self::Priority | Self::Status | Self::Steps => EntryType::Goal,
            Self::Power | Self::Limitations | Self::Cost | Self::Users => EntryType::Ability,
        }
    }

    /// Whether the field holds a fixed choice rather than free text.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Importance | Self::Priority | Self::Status)
    }
}

impl Display for EntryField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryField {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        EntryType::ALL
            .iter()
            .flat_map(|kind| kind.fields().iter().copied())
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| ParseEnumError::new("entry field", value))
    }
}

/// Parse failure for any of the model's string-backed enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    what: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

impl Display for ParseEnumError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {}: `{}`", self.what, self.value)
    }
}

impl Error for ParseEnumError {}

#[cfg(test)]
mod tests {
    use super::{EntryField, EntryType};

    #[test]
    fn every_field_maps_back_to_its_owning_type() {
        for kind in EntryType::ALL {
            for field in kind.fields() {
                assert_eq!(field.entry_type(), kind, "field {field}");
            }
        }
    }

    #[test]
    fn entry_type_parses_wire_and_plural_forms() {
        assert_eq!("plotpoint".parse::<EntryType>().unwrap(), EntryType::PlotPoint);
        assert_eq!("Plot-Points".parse::<EntryType>().unwrap(), EntryType::PlotPoint);
        assert_eq!("abilities".parse::<EntryType>().unwrap(), EntryType::Ability);
        assert!("spaceship".parse::<EntryType>().is_err());
    }

    #[test]
    fn entry_field_parses_wire_key() {
        assert_eq!("Importance".parse::<EntryField>().unwrap(), EntryField::Importance);
        assert!("colour".parse::<EntryField>().is_err());
    }
}

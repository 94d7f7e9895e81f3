// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Note record and session metadata

use serde::{Deserialize, Serialize};

/// Longest body the editor accepts, in characters. Files read from disk are not
/// truncated.
pub const MAX_BODY_CHARS: usize = 200_000;

/// One of the session metadata fields stored in a note header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Group,
    WhereTheyMeet,
    DayTheyMet,
    Relationship,
}

/// Header key to field. First entry per field is the key the encoder writes.
const FIELD_TABLE: &[(&str, Field)] = &[
    ("Name", Field::Name),
    ("Group", Field::Group),
    ("WhereTheyMeet", Field::WhereTheyMeet),
    ("DayTheyMet", Field::DayTheyMet),
    ("Relationship", Field::Relationship),
    ("WhereWeMeet", Field::WhereTheyMeet),
    ("DayWeMet", Field::DayTheyMet),
];

impl Field {
    /// Header order.
    pub fn all() -> &'static [Field] {
        &[
            Field::Name,
            Field::Group,
            Field::WhereTheyMeet,
            Field::DayTheyMet,
            Field::Relationship,
        ]
    }

    /// Key written by the encoder.
    pub fn key(&self) -> &'static str {
        FIELD_TABLE
            .iter()
            .find(|(_, f)| f == self)
            .map(|(k, _)| *k)
            .unwrap_or_default()
    }

    /// Resolve a header key, accepting legacy synonyms.
    pub fn from_key(key: &str) -> Option<Field> {
        FIELD_TABLE
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, f)| *f)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Group => "Group",
            Field::WhereTheyMeet => "Where They Meet",
            Field::DayTheyMet => "Day They Met",
            Field::Relationship => "Relationship",
        }
    }
}

/// Session metadata attached to a note. Each value is one header line, so it
/// must not contain `\r` or `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub name: String,
    pub group: String,
    pub where_they_meet: String,
    pub day_they_met: String,
    pub relationship: String,
}

impl Metadata {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Group => &self.group,
            Field::WhereTheyMeet => &self.where_they_meet,
            Field::DayTheyMet => &self.day_they_met,
            Field::Relationship => &self.relationship,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Group => &mut self.group,
            Field::WhereTheyMeet => &mut self.where_they_meet,
            Field::DayTheyMet => &mut self.day_they_met,
            Field::Relationship => &mut self.relationship,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }
}

/// A note as held in memory: file name, header metadata and free-form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteRecord {
    pub file_name: String,
    pub metadata: Metadata,
    pub body: String,
}

impl NoteRecord {
    pub fn new(file_name: impl Into<String>, metadata: Metadata, body: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            metadata,
            body: body.into(),
        }
    }
}

/// Cut `body` to at most `MAX_BODY_CHARS` characters. Returns true if it was cut.
pub fn clamp_body(body: &mut String) -> bool {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => {
            body.truncate(idx);
            true
        }
        None => false,
    }
}

use crate::models::{BookFile, SortDisplay};
use std::collections::BTreeMap;
use time::Date;

/// The canonical form of one field's value.
///
/// Every JSON shape that denotes the same logical value normalizes to the same
/// `FieldValue`; see [`FieldType`](crate::FieldType).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Date(Option<Date>),
    /// Non-empty, sorted by name, names unique.
    Files(Vec<BookFile>),
    /// Sorted by key. Empty is the canonical null.
    KeyValues(BTreeMap<String, String>),
    /// Input order preserved, no exact repeats. Empty is the canonical null.
    SortDisplays(Vec<SortDisplay>),
    String(Option<String>),
    Title(SortDisplay),
}
impl FieldValue {
    /// Returns `true` if the value is the field kind's null.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Date(date) => date.is_none(),
            Self::Files(files) => files.is_empty(),
            Self::KeyValues(map) => map.is_empty(),
            Self::SortDisplays(entities) => entities.is_empty(),
            Self::String(text) => text.is_none(),
            Self::Title(_) => false,
        }
    }

    pub fn as_sortdisplays(&self) -> Option<&[SortDisplay]> {
        match self {
            Self::SortDisplays(entities) => Some(entities),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[BookFile]> {
        match self {
            Self::Files(files) => Some(files),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => text.as_deref(),
            _ => None,
        }
    }
}

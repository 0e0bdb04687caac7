//! Stable keys for books and cross-referenced entities, for writers that need
//! relational identifiers.

use crate::collection::Library;
use shelf_metadata::models::{Book, SortDisplay};
use std::collections::BTreeMap;
use uuid::Uuid;

/// How keys are assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum KeyType {
    /// Sequential integers from 1, in title order (books) or sorted order
    /// (entities). Deterministic between runs.
    #[default]
    Int,
    /// No keys.
    None,
    /// A random v4 UUID per book and per entity.
    Uuid,
}

/// Keys assigned to one library's books and entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keys {
    books: BTreeMap<SortDisplay, String>,
    entities: BTreeMap<String, BTreeMap<SortDisplay, String>>,
}
impl Keys {
    /// The key of a book, looked up by its (unique) title.
    pub fn book(&self, book: &Book) -> Option<&str> {
        self.books.get(book.title()).map(String::as_str)
    }

    /// The key of an entity within a `sortdisplay` field.
    pub fn entity(&self, field: &str, entity: &SortDisplay) -> Option<&str> {
        self.entities.get(field)?.get(entity).map(String::as_str)
    }
}

impl Library {
    /// Assigns keys to every book and to every distinct entity of every
    /// `sortdisplay` field.
    pub fn keys(&self, key_type: KeyType) -> Keys {
        let next = |i: usize| match key_type {
            KeyType::Int => Some((i + 1).to_string()),
            KeyType::None => None,
            KeyType::Uuid => Some(Uuid::new_v4().to_string()),
        };
        if key_type == KeyType::None {
            return Keys::default();
        }
        let books = self.iter().enumerate().filter_map(|(i, book)| Some((book.title().clone(), next(i)?))).collect();
        let references = self.cross_references();
        let entities = references
            .fields()
            .map(|field| {
                let keys = references
                    .entities(field)
                    .enumerate()
                    .filter_map(|(i, (entity, _))| Some((entity.clone(), next(i)?)))
                    .collect();
                (field.to_string(), keys)
            })
            .collect();
        tracing::debug!(?key_type, books = self.len(), "Assigned keys");
        Keys { books, entities }
    }
}

use crate::consts::title_prefix;
use crate::models::{BookFile, FieldValue, SortDisplay};
use crate::registry::FieldType;
use serde_json::{Map, Value};
use shelf_schema::Schema;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// One book's canonical record.
///
/// Holds a value for every field its schema declares, in declaration order.
/// Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    location: PathBuf,
    title: SortDisplay,
    values: Vec<(String, FieldValue)>,
    dir_vars: BTreeSet<String>,
}
impl Book {
    pub(crate) fn new(location: PathBuf, title: SortDisplay, values: Vec<(String, FieldValue)>) -> Self {
        let dir_vars = values
            .iter()
            .filter_map(|(_, value)| value.as_files())
            .flatten()
            .flat_map(|file| file.directory.vars().map(str::to_string))
            .collect();
        Self { location, title, values, dir_vars }
    }

    /// The book directory this record was parsed from.
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn title(&self) -> &SortDisplay {
        &self.title
    }

    /// The book's files, sorted by name.
    pub fn files(&self) -> &[BookFile] {
        self.values.iter().find_map(|(_, value)| value.as_files()).unwrap_or_default()
    }

    /// Names of every dir var referenced by the book's file directories.
    pub fn dir_vars(&self) -> &BTreeSet<String> {
        &self.dir_vars
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(name, _)| name == field).map(|(_, value)| value)
    }

    /// Iterates over `(field, value)` pairs in schema order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterates over every entity of every `sortdisplay` field, with the field
    /// it appears in.
    pub fn sortdisplays(&self) -> impl Iterator<Item = (&str, &SortDisplay)> {
        self.values.iter().flat_map(|(name, value)| {
            value.as_sortdisplays().unwrap_or_default().iter().map(move |entity| (name.as_str(), entity))
        })
    }

    /// The raw metadata form of one field, if it is stored in the metadata.
    pub fn serialize(&self, field: &str, schema: &Schema) -> Option<Value> {
        schema.get(field)?.kind.serialize(self.value(field)?)
    }

    /// The book's normalized metadata object, with keys sorted.
    pub fn to_metadata(&self, schema: &Schema) -> Map<String, Value> {
        schema
            .iter()
            .filter_map(|decl| Some((decl.name.clone(), self.serialize(&decl.name, schema)?)))
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .collect()
    }

    /// Contents of the book's non-inline string text files, keyed by field
    /// name, each starting with the title prefix. Null values have no file.
    pub fn text_files(&self, schema: &Schema) -> Vec<(String, String)> {
        let prefix = title_prefix(&self.title.display);
        schema
            .iter()
            .filter(|decl| decl.is_text_file())
            .filter_map(|decl| Some((decl.name.clone(), format!("{prefix}{}", self.value(&decl.name)?.as_str()?))))
            .collect()
    }
}

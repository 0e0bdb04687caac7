//! Builds one [`Book`] from one book's raw metadata.

use crate::consts::title_prefix;
use crate::error::{ErrorKind, Result};
use crate::models::{Book, FieldValue, SortDisplay};
use crate::registry::{self, FieldType};
use crate::violation::{FieldError, Violation, Violations};
use serde_json::{Map, Value};
use shelf_schema::{FieldDeclaration, FieldKind, Schema};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::instrument;

/// Supplies the content of non-inline string fields, which live in text files
/// next to the metadata rather than in it.
///
/// Returning `None` means the text file doesn't exist.
pub trait TextResolver {
    fn resolve(&self, field: &str) -> Option<String>;
}
impl TextResolver for () {
    fn resolve(&self, _field: &str) -> Option<String> {
        None
    }
}
impl TextResolver for BTreeMap<String, String> {
    fn resolve(&self, field: &str) -> Option<String> {
        self.get(field).cloned()
    }
}
impl TextResolver for HashMap<String, String> {
    fn resolve(&self, field: &str) -> Option<String> {
        self.get(field).cloned()
    }
}
impl<R: TextResolver + ?Sized> TextResolver for &R {
    fn resolve(&self, field: &str) -> Option<String> {
        (**self).resolve(field)
    }
}
impl<R: TextResolver + ?Sized> TextResolver for Box<R> {
    fn resolve(&self, field: &str) -> Option<String> {
        (**self).resolve(field)
    }
}

/// A [`TextResolver`] backed by a closure; see [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FromFn<F>(F);
impl<F: Fn(&str) -> Option<String>> TextResolver for FromFn<F> {
    fn resolve(&self, field: &str) -> Option<String> {
        (self.0)(field)
    }
}

/// Creates a [`TextResolver`] from a closure.
///
/// ```
/// use shelf_metadata::{TextResolver, from_fn};
///
/// let resolver = from_fn(|field| (field == "description").then(|| "A desert planet.".to_string()));
/// assert_eq!(resolver.resolve("description").as_deref(), Some("A desert planet."));
/// assert_eq!(resolver.resolve("notes"), None);
/// ```
pub fn from_fn<F: Fn(&str) -> Option<String>>(f: F) -> FromFn<F> {
    FromFn(f)
}

/// Parses and normalizes one book's metadata against `schema`.
///
/// Every field is checked before returning, so [`ErrorKind::Invalid`] lists
/// all of the book's problems at once. Metadata that is not an object, or
/// that has keys the schema doesn't declare, fails immediately.
#[instrument(level = "debug", skip_all, fields(location = %location.display()))]
pub fn parse_book(location: &Path, metadata: &Value, schema: &Schema, resolver: &impl TextResolver) -> Result<Book> {
    let Value::Object(metadata) = metadata else {
        exn::bail!(ErrorKind::NotAnObject(location.to_path_buf()));
    };
    if let Some(field) = metadata.keys().find(|key| schema.get(key).is_none()) {
        exn::bail!(ErrorKind::UnknownField { location: location.to_path_buf(), field: field.clone() });
    }

    let mut violations = Violations::new();
    // Parsed first: the text file prefix depends on the title's display.
    let title_field = schema.title();
    let title = registry::title(metadata.get(&title_field.name).unwrap_or(&Value::Null))
        .map_err(|e| match metadata.contains_key(&title_field.name) {
            true => e,
            false => FieldError::missing(),
        })
        .inspect_err(|e| violations.push(Violation::from_field(location, &title_field.name, e.clone())))
        .ok();

    let mut values = Vec::with_capacity(schema.len());
    for field in schema {
        let value = match (&field.kind, &title) {
            (FieldKind::Title, Some(title)) => Ok(FieldValue::Title(title.clone())),
            (FieldKind::Title, None) => continue,
            (FieldKind::String { inline: false }, _) => text(field, metadata, title.as_ref(), resolver),
            (kind, _) => kind.normalize(metadata.get(&field.name)),
        };
        match value {
            Ok(value) => values.push((field.name.clone(), value)),
            Err(e) => violations.push(Violation::from_field(location, &field.name, e)),
        }
    }

    match title {
        Some(title) if violations.is_empty() => {
            tracing::trace!(title = %title, "Parsed book");
            Ok(Book::new(location.to_path_buf(), title, values))
        },
        _ => {
            tracing::debug!(count = violations.len(), "Book metadata has problems");
            exn::bail!(ErrorKind::Invalid(violations))
        },
    }
}

/// Resolves a non-inline string from its text file, stripping the title
/// prefix the text file is written with.
fn text(
    field: &FieldDeclaration,
    metadata: &Map<String, Value>,
    title: Option<&SortDisplay>,
    resolver: &impl TextResolver,
) -> std::result::Result<FieldValue, FieldError> {
    if metadata.contains_key(&field.name) {
        return Err(FieldError::schema_violation(format!(
            "'{}' is declared with inline: false, so its value belongs in a text file, not the metadata",
            field.name
        )));
    }
    let text = resolver.resolve(&field.name).map(|mut text| {
        if let Some(title) = title {
            let prefix = title_prefix(&title.display);
            if text.starts_with(&prefix) {
                text.drain(..prefix.len());
            }
        }
        Value::String(text)
    });
    field.kind.normalize(text.as_ref())
}

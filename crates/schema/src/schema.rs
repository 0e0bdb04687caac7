use crate::error::{Error, ErrorKind, Result};
use crate::kind::{FieldDeclaration, FieldKind};
use serde_json::Value;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::instrument;

/// Field names that collide with output files written next to the library.
pub const RESERVED_NAMES: &[&str] = &["books"];

/// The ordered set of field declarations governing a library run.
///
/// Exactly one field is a [`FieldKind::Title`] and exactly one is a
/// [`FieldKind::File`]. Declaration order is preserved; it determines output
/// column order. Immutable once built.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldDeclaration>,
    title: usize,
    file: usize,
}
impl Schema {
    /// Builds a schema from declarations, enforcing name uniqueness, reserved
    /// names and the exactly-one `title`/`file` rule.
    pub fn new(fields: impl IntoIterator<Item = FieldDeclaration>) -> Result<Self> {
        let fields: Vec<FieldDeclaration> = fields.into_iter().collect();
        for (i, field) in fields.iter().enumerate() {
            if RESERVED_NAMES.contains(&field.name.as_str()) {
                exn::bail!(ErrorKind::ReservedName(field.name.clone()));
            }
            if fields[..i].iter().any(|f| f.name == field.name) {
                exn::bail!(ErrorKind::DuplicateName(field.name.clone()));
            }
        }
        let title = Self::single(&fields, "title", |k| matches!(k, FieldKind::Title))?;
        let file = Self::single(&fields, "file", |k| matches!(k, FieldKind::File))?;
        Ok(Self { fields, title, file })
    }

    /// Finds the index of the only field of a given kind.
    fn single(fields: &[FieldDeclaration], kind: &'static str, is: impl Fn(&FieldKind) -> bool) -> Result<usize> {
        let found: Vec<usize> = fields.iter().enumerate().filter(|(_, f)| is(&f.kind)).map(|(i, _)| i).collect();
        match found.as_slice() {
            [] => exn::bail!(ErrorKind::MissingKind(kind)),
            [index] => Ok(*index),
            _ => exn::bail!(ErrorKind::DuplicateKind {
                kind,
                names: found.iter().map(|i| fields[*i].name.clone()).collect(),
            }),
        }
    }

    /// Parses a raw schema: a JSON object whose keys are field names (in
    /// declaration order) and whose values are kind declarations.
    #[instrument(level = "debug", skip_all)]
    pub fn parse(raw: &Value) -> Result<Self> {
        let Value::Object(map) = raw else {
            exn::bail!(ErrorKind::NotAnObject);
        };
        let fields = map
            .iter()
            .map(|(name, kind)| {
                let name = name.to_lowercase();
                Ok(FieldDeclaration { kind: FieldKind::parse(&name, kind)?, name })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(fields)
    }

    /// Returns `true` if both schemas declare the same field names with the
    /// same kinds and configuration, regardless of declaration order.
    pub fn matches(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len() && self.fields.iter().all(|f| other.get(&f.name) == Some(f))
    }

    /// Reduces the schemas found across library roots to the single schema
    /// governing the run.
    ///
    /// Every schema must logically match the first one. There is no partial
    /// merge: any mismatch is fatal.
    pub fn reconcile<P: Into<PathBuf>>(schemas: impl IntoIterator<Item = (P, Schema)>) -> Result<Schema> {
        let mut schemas = schemas.into_iter().map(|(source, schema)| (Into::<PathBuf>::into(source), schema));
        let Some((first, schema)) = schemas.next() else {
            exn::bail!(ErrorKind::NoSchema);
        };
        let mut sources = vec![first];
        for (source, other) in schemas {
            if !schema.matches(&other) {
                exn::bail!(ErrorKind::Mismatch { first: sources[0].clone(), other: source });
            }
            sources.push(source);
        }
        match sources.as_slice() {
            [single] => tracing::info!(source = %single.display(), "Using schema"),
            _ => tracing::info!(
                sources = %sources.iter().map(|s| s.display().to_string()).collect::<Vec<_>>().join("', '"),
                "Using matching schemas"
            ),
        }
        Ok(schema)
    }

    /// Iterates over the declarations in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &FieldDeclaration> {
        self.fields.iter()
    }

    /// Looks up a declaration by (lower-case) name.
    pub fn get(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The schema's only `title` field.
    pub fn title(&self) -> &FieldDeclaration {
        &self.fields[self.title]
    }

    /// The schema's only `file` field.
    pub fn file(&self) -> &FieldDeclaration {
        &self.fields[self.file]
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
impl FromStr for Schema {
    type Err = Error;

    /// Parses schema JSON text. Duplicate object keys are rejected rather than
    /// silently overwritten.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(&crate::json::from_str(s)?)
    }
}
impl<'a> IntoIterator for &'a Schema {
    type Item = &'a FieldDeclaration;
    type IntoIter = std::slice::Iter<'a, FieldDeclaration>;
    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

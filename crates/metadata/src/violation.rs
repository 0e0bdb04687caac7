//! Collectable problems found in book metadata.
//!
//! Unlike [`crate::error::ErrorKind`], a [`Violation`] never stops a run on its
//! own: violations are gathered per book and across the whole library, then
//! reported together so every problem can be fixed in one pass.

use derive_more::{Display, Error};
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use std::path::PathBuf;

/// The category of a [`Violation`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViolationKind {
    /// A required field is absent from the metadata.
    #[display("MissingFieldError")]
    MissingField,
    /// A value is the right shape but could not be parsed (e.g. an invalid date).
    #[display("ParseError")]
    Parse,
    /// A value is outside the field kind's defined equivalence classes.
    #[display("ValidationError")]
    Validation,
    /// A value's presence disagrees with its schema declaration.
    #[display("SchemaViolation")]
    SchemaViolation,
    /// A title or sortdisplay collides with another, exactly or partially.
    #[display("DuplicateError")]
    Duplicate,
    /// A file directory references a dir var that was not supplied.
    #[display("UnresolvedDirVarError")]
    UnresolvedDirVar,
}

/// A single field-level problem, before it is tied to a book and field.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
#[display("{kind}: {message}")]
pub struct FieldError {
    pub kind: ViolationKind,
    #[error(not(source))]
    pub message: String,
}
impl FieldError {
    pub fn missing() -> Self {
        Self { kind: ViolationKind::MissingField, message: "field is required".to_string() }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self { kind: ViolationKind::Parse, message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self { kind: ViolationKind::Validation, message: message.into() }
    }

    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self { kind: ViolationKind::SchemaViolation, message: message.into() }
    }
}

/// A problem tied to the book location(s) and, where relevant, the field that
/// caused it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Every book location involved, sorted.
    pub locations: Vec<PathBuf>,
    pub field: Option<String>,
    pub message: String,
}
impl Violation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self { kind, locations: Vec::new(), field: None, message: message.into() }
    }

    /// Ties a field error to the book and field it was found in.
    pub fn from_field(location: impl Into<PathBuf>, field: impl Into<String>, error: FieldError) -> Self {
        Self::new(error.kind, error.message).with_field(field).at(location)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Adds a book location, keeping locations sorted and unique.
    pub fn at(mut self, location: impl Into<PathBuf>) -> Self {
        let location = location.into();
        if let Err(i) = self.locations.binary_search(&location) {
            self.locations.insert(i, location);
        }
        self
    }
}
impl FmtDisplay for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.kind)?;
        if let Some(field) = &self.field {
            write!(f, " in field '{field}'")?;
        }
        if !self.locations.is_empty() {
            let locations: Vec<_> = self.locations.iter().map(|l| format!("'{}'", l.display())).collect();
            write!(f, " at {}", locations.join(", "))?;
        }
        write!(f, ": {}", self.message)
    }
}

/// An ordered collection of [`Violation`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);
impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Iterates over the violations of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.0.iter().filter(move |v| v.kind == kind)
    }

    /// Sorts by kind, then location, then field and message, and drops exact
    /// repeats, so that reports are stable between runs.
    pub fn sort(&mut self) {
        self.0.sort();
        self.0.dedup();
    }
}
impl FmtDisplay for Violations {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.0.len() {
            1 => write!(f, "1 problem found")?,
            n => write!(f, "{n} problems found")?,
        }
        for violation in &self.0 {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}
impl Extend<Violation> for Violations {
    fn extend<T: IntoIterator<Item = Violation>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}
impl FromIterator<Violation> for Violations {
    fn from_iter<T: IntoIterator<Item = Violation>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

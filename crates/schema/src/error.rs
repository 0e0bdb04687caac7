//! Schema Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Every variant here is fatal for a library run: once the schema can't be
//! trusted, no per-book work is meaningful.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A schema error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The JSON text could not be parsed (includes duplicate object keys).
    #[display("malformed JSON: {_0}")]
    Json(#[error(not(source))] String),
    /// The schema value is not a JSON object.
    #[display("schema must be a JSON object mapping field names to types")]
    NotAnObject,
    /// A field uses a name reserved for output files.
    #[display("reserved name '{_0}' found in schema")]
    ReservedName(#[error(not(source))] String),
    /// Two fields share a name (after lower-casing).
    #[display("duplicate field name '{_0}' found in schema")]
    DuplicateName(#[error(not(source))] String),
    /// A field's type (or the type's configuration) could not be processed.
    #[display("problem processing type for field '{field}': {reason}")]
    InvalidType {
        /// The field being declared.
        field: String,
        /// What was wrong with the declaration.
        reason: String,
    },
    /// A date format string uses an unsupported directive or is incomplete.
    #[display("invalid date format '{format}': {reason}")]
    DateFormat {
        /// The strftime-style format string.
        format: String,
        /// What was wrong with it.
        reason: String,
    },
    /// A kind that must appear exactly once is missing.
    #[display("field with required type '{_0}' not found in schema")]
    MissingKind(#[error(not(source))] &'static str),
    /// A kind that must appear exactly once appears more than once.
    #[display("duplicate fields with type '{kind}' found in schema, field names: {}", names.join(", "))]
    DuplicateKind {
        /// The kind that may only appear once.
        kind: &'static str,
        /// Every field declared with that kind.
        names: Vec<String>,
    },
    /// No schema was supplied for the run.
    #[display("no schema provided")]
    NoSchema,
    /// Two library roots supplied schemas that are not logically matching.
    #[display("schemas from '{}' and '{}' conflict", first.display(), other.display())]
    Mismatch {
        /// Source of the first schema seen.
        first: PathBuf,
        /// Source of the conflicting schema.
        other: PathBuf,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Schemas are hand-authored; the same input will always fail the same way.
        false
    }
}

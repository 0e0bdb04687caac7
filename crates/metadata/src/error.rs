//! Metadata Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Per-field problems are gathered into [`ErrorKind::Invalid`] so that one
//! book reports all of them at once. Structural problems (metadata that isn't
//! an object, keys the schema doesn't declare) are returned immediately.

use crate::violation::Violations;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// A metadata error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The metadata value is not a JSON object.
    #[display("metadata for '{}' must be a JSON object", _0.display())]
    NotAnObject(#[error(not(source))] PathBuf),
    /// The metadata carries a key the schema does not declare.
    #[display("unknown field '{field}' in metadata for '{}'", location.display())]
    UnknownField {
        /// The book's location.
        location: PathBuf,
        /// The undeclared key.
        field: String,
    },
    /// One or more fields failed to normalize; fix every listed problem.
    #[display("{_0}")]
    Invalid(#[error(not(source))] Violations),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Metadata is hand-authored: the same input always fails the same way.
        false
    }

    /// Returns `true` for errors that make any further per-book work pointless.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }
}

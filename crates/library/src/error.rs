//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use shelf_metadata::violation::Violations;
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A book's metadata is structurally unusable; the run can't continue.
    #[display("could not read metadata for '{}'", _0.display())]
    Book(#[error(not(source))] PathBuf),
    /// Books or library-wide invariants failed validation; fix every listed
    /// problem.
    #[display("{_0}")]
    Invalid(#[error(not(source))] Violations),
    /// A dir var binding isn't of the form `name=value`.
    #[display("invalid dir var '{_0}', expected 'name=value'")]
    DirVar(#[error(not(source))] String),
    /// The same dir var name was bound twice.
    #[display("duplicate dir var name found: '{_0}'")]
    DuplicateDirVar(#[error(not(source))] String),
    /// A file directory references a dir var that has no binding.
    #[display("dir var '{var}' is not supplied (needed by '{}')", location.display())]
    UnresolvedDirVar {
        /// The missing dir var.
        var: String,
        /// The book whose file needs it.
        location: PathBuf,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::DirVar("v1".into()).to_string(), "invalid dir var 'v1', expected 'name=value'");
        assert_eq!(
            ErrorKind::UnresolvedDirVar { var: "v1".into(), location: "lib/a".into() }.to_string(),
            "dir var 'v1' is not supplied (needed by 'lib/a')"
        );
        assert_eq!(ErrorKind::Invalid(Violations::new()).to_string(), "0 problems found");
    }
}

//! Config Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested config file doesn't exist.
    #[display("config file '{}' not found", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The merged configuration couldn't be deserialized.
    #[display("invalid configuration")]
    Invalid,
    /// A dir var binding has a name that can't be used as a placeholder.
    #[display("invalid dir var name '{_0}'")]
    DirVar(#[error(not(source))] String),
    /// No library roots were configured.
    #[display("no library directories configured")]
    NoLibraries,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

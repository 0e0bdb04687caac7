use crate::collection::Library;
use crate::dirvars::DirVars;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde_json::Value;
use shelf_metadata::error::ErrorKind as MetadataErrorKind;
use shelf_metadata::violation::Violations;
use shelf_metadata::{TextResolver, parse_book};
use shelf_schema::Schema;
use std::path::PathBuf;
use tracing::instrument;

/// Everything the filesystem layer read for one book.
pub struct BookSource {
    /// The book directory.
    pub location: PathBuf,
    /// The parsed metadata file.
    pub metadata: Value,
    /// Supplies the content of the book's non-inline string text files.
    pub resolver: Box<dyn TextResolver + Send + Sync>,
}
impl BookSource {
    pub fn new(
        location: impl Into<PathBuf>,
        metadata: Value,
        resolver: impl TextResolver + Send + Sync + 'static,
    ) -> Self {
        Self { location: location.into(), metadata, resolver: Box::new(resolver) }
    }
}

/// Builds a [`Library`] from every book of a run.
///
/// Each book is parsed independently (in parallel with the `parallel`
/// feature). A structurally broken book aborts the run; otherwise every
/// per-field problem of every book is collected, then library-wide
/// invariants are checked, and all violations are returned together.
#[instrument(skip_all, fields(books = sources.len()))]
pub fn load(schema: Schema, sources: Vec<BookSource>, dir_vars: &DirVars) -> Result<Library> {
    let parse = |source: &BookSource| {
        parse_book(&source.location, &source.metadata, &schema, &source.resolver).map_err(|e| (source.location.clone(), e))
    };
    #[cfg(feature = "parallel")]
    let parsed: Vec<_> = sources.par_iter().map(parse).collect();
    #[cfg(not(feature = "parallel"))]
    let parsed: Vec<_> = sources.iter().map(parse).collect();

    let mut books = Vec::with_capacity(parsed.len());
    let mut violations = Violations::new();
    for result in parsed {
        match result {
            Ok(book) => books.push(book),
            Err((location, e)) => match &*e {
                MetadataErrorKind::Invalid(found) => violations.extend(found.iter().cloned()),
                _ => return Err(e).or_raise(|| ErrorKind::Book(location)),
            },
        }
    }
    tracing::debug!(parsed = books.len(), invalid = sources.len() - books.len(), "Parsed books");

    let library = Library::new(schema, books, dir_vars);
    match (library, violations.is_empty()) {
        (Ok(library), true) => {
            tracing::info!(books = library.len(), "Loaded library");
            Ok(library)
        },
        (Ok(_), false) => {
            violations.sort();
            tracing::warn!(count = violations.len(), "Library has invalid books");
            exn::bail!(ErrorKind::Invalid(violations))
        },
        (Err(e), _) => match &*e {
            ErrorKind::Invalid(found) => {
                violations.extend(found.iter().cloned());
                violations.sort();
                exn::bail!(ErrorKind::Invalid(violations))
            },
            _ => Err(e),
        },
    }
}

//! Library-wide invariants, checked once every book has been parsed.
//!
//! Three indices are built over the whole collection:
//! - titles, to find exact and partial title collisions between books,
//! - sortdisplay entities from every `sortdisplay` field of every book, keyed
//!   by `sort` and by `display`, to find partial duplicates,
//! - dir var usage, to find placeholders with no binding.
//!
//! Nothing here stops at the first problem.

use crate::dirvars::DirVars;
use shelf_metadata::models::{Book, SortDisplay};
use shelf_metadata::violation::{Violation, ViolationKind, Violations};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::instrument;

/// Checks every library-wide invariant and returns all violations, sorted.
#[instrument(level = "debug", skip_all, fields(books = books.len()))]
pub fn validate(books: &[Book], dir_vars: &DirVars) -> Violations {
    let mut violations = Violations::new();
    titles(books, &mut violations);
    sortdisplays(books, &mut violations);
    unresolved_dir_vars(books, dir_vars, &mut violations);
    violations.sort();
    if !violations.is_empty() {
        tracing::warn!(count = violations.len(), "Library failed validation");
    }
    violations
}

fn titles(books: &[Book], violations: &mut Violations) {
    let mut index: BTreeMap<&SortDisplay, Vec<&Path>> = BTreeMap::new();
    for book in books {
        index.entry(book.title()).or_default().push(book.location());
    }
    for (title, locations) in &index {
        if locations.len() > 1 {
            let message = format!(
                "the title with sort '{}' and display '{}' appears in more than one book",
                title.sort, title.display
            );
            violations.push(at_all(Violation::new(ViolationKind::Duplicate, message), locations.iter().copied()));
        }
    }
    partial_duplicates(&index, "title", violations);
}

fn sortdisplays(books: &[Book], violations: &mut Violations) {
    let mut index: BTreeMap<&SortDisplay, Vec<&Path>> = BTreeMap::new();
    for book in books {
        for (_, entity) in book.sortdisplays() {
            index.entry(entity).or_default().push(book.location());
        }
    }
    let before = violations.len();
    partial_duplicates(&index, "sortdisplay", violations);
    tracing::trace!(entities = index.len(), partial = violations.len() - before, "Indexed sortdisplay entities");
}

/// Reports every `sort` shared by entities with different `display`s, and
/// every `display` shared by entities with different `sort`s.
fn partial_duplicates(index: &BTreeMap<&SortDisplay, Vec<&Path>>, what: &str, violations: &mut Violations) {
    let mut by_sort: BTreeMap<&str, Vec<&SortDisplay>> = BTreeMap::new();
    let mut by_display: BTreeMap<&str, Vec<&SortDisplay>> = BTreeMap::new();
    for entity in index.keys() {
        by_sort.entry(&entity.sort).or_default().push(entity);
        by_display.entry(&entity.display).or_default().push(entity);
    }
    let groups = by_sort
        .iter()
        .map(|(value, entities)| ("sort", "display", value, entities))
        .chain(by_display.iter().map(|(value, entities)| ("display", "sort", value, entities)));
    for (key, other, value, entities) in groups {
        if entities.len() < 2 {
            continue;
        }
        let others: Vec<_> = entities
            .iter()
            .map(|e| format!("'{}'", if key == "sort" { &e.display } else { &e.sort }))
            .collect();
        let message = format!("the {what} {key} value '{value}' has more than one {other} value: {}", others.join(", "));
        let locations = entities.iter().flat_map(|e| index[e].iter().copied());
        violations.push(at_all(Violation::new(ViolationKind::Duplicate, message), locations));
    }
}

fn unresolved_dir_vars(books: &[Book], dir_vars: &DirVars, violations: &mut Violations) {
    let mut usage: BTreeMap<&str, BTreeSet<&Path>> = BTreeMap::new();
    for book in books {
        for var in book.dir_vars() {
            usage.entry(var).or_default().insert(book.location());
        }
    }
    for (var, locations) in usage {
        if !dir_vars.contains(var) {
            let message = format!("dir var '{var}' is not supplied (provided: {dir_vars})");
            violations.push(at_all(Violation::new(ViolationKind::UnresolvedDirVar, message), locations));
        }
    }
}

fn at_all<'a>(violation: Violation, locations: impl IntoIterator<Item = &'a Path>) -> Violation {
    locations.into_iter().fold(violation, |violation, location| violation.at(location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};
    use shelf_metadata::parse_book;
    use shelf_schema::Schema;

    fn schema() -> Schema {
        r#"{"title": "title", "files": "file", "authors": "sortdisplay", "editors": "sortdisplay"}"#.parse().unwrap()
    }

    fn book(location: &str, title: Value, authors: Value, directory: &str) -> Book {
        let metadata = json!({
            "title": title,
            "files": {"name": "book.epub", "directory": directory},
            "authors": authors,
            "editors": null,
        });
        parse_book(Path::new(location), &metadata, &schema(), &()).unwrap()
    }

    fn summary(violations: &Violations) -> Vec<(ViolationKind, Vec<&str>)> {
        violations
            .iter()
            .map(|v| (v.kind, v.locations.iter().map(|l| l.to_str().unwrap()).collect()))
            .collect()
    }

    #[test]
    fn test_valid_library() {
        let books = [
            book("lib/a", json!("A"), json!(["X", "Y"]), "."),
            book("lib/b", json!("B"), json!(["Y", {"sort": "Z, z", "display": "z Z"}]), "."),
        ];
        assert!(validate(&books, &DirVars::new()).is_empty());
    }

    #[rstest]
    #[case(json!({"sort": "A", "display": "X"}), json!({"sort": "A", "display": "Y"}))]
    #[case(json!({"sort": "A", "display": "X"}), json!({"sort": "B", "display": "X"}))]
    fn test_partial_title_duplicate_is_reported_once(#[case] a: Value, #[case] b: Value) {
        let books = [book("lib/a", a, json!(null), "."), book("lib/b", b, json!(null), ".")];
        let violations = validate(&books, &DirVars::new());
        assert_eq!(summary(&violations), [(ViolationKind::Duplicate, vec!["lib/a", "lib/b"])]);
    }

    #[test]
    fn test_exact_title_duplicate() {
        let books = [
            book("lib/b", json!("Dune"), json!(null), "."),
            book("lib/a", json!("Dune"), json!(null), "."),
        ];
        let violations = validate(&books, &DirVars::new());
        assert_eq!(summary(&violations), [(ViolationKind::Duplicate, vec!["lib/a", "lib/b"])]);
        assert!(violations.iter().next().unwrap().message.contains("appears in more than one book"));
    }

    #[test]
    fn test_sortdisplay_partial_duplicates_span_fields_and_books() {
        let metadata = json!({
            "title": "C",
            "files": {"name": "c.epub"},
            "authors": {"sort": "Herbert, Frank", "display": "Frank Herbert"},
            "editors": {"sort": "Herbert, F.", "display": "Frank Herbert"},
        });
        let books = [
            book("lib/a", json!("A"), json!({"sort": "Le Guin, Ursula", "display": "Ursula Le Guin"}), "."),
            book("lib/b", json!("B"), json!({"sort": "Le Guin, Ursula", "display": "Ursula K. Le Guin"}), "."),
            parse_book(Path::new("lib/c"), &metadata, &schema(), &()).unwrap(),
        ];
        let violations = validate(&books, &DirVars::new());
        assert_eq!(
            summary(&violations),
            [(ViolationKind::Duplicate, vec!["lib/a", "lib/b"]), (ViolationKind::Duplicate, vec!["lib/c"])]
        );
    }

    #[test]
    fn test_partial_duplicate_within_one_field() {
        let books = [book("lib/a", json!("A"), json!([{"sort": "A", "display": "X"}, {"sort": "A", "display": "Y"}]), ".")];
        let violations = validate(&books, &DirVars::new());
        assert_eq!(summary(&violations), [(ViolationKind::Duplicate, vec!["lib/a"])]);
    }

    #[test]
    fn test_unresolved_dir_var() {
        let books = [
            book("lib/a", json!("A"), json!(null), "{v1}/sub"),
            book("lib/b", json!("B"), json!(null), "{v2}"),
            book("lib/c", json!("C"), json!(null), "."),
        ];
        let mut dir_vars = DirVars::new();
        dir_vars.insert("v2", "/mnt");
        let violations = validate(&books, &dir_vars);
        assert_eq!(summary(&violations), [(ViolationKind::UnresolvedDirVar, vec!["lib/a"])]);
        assert!(violations.iter().next().unwrap().message.starts_with("dir var 'v1' is not supplied"));
    }
}

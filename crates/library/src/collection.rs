use crate::dirvars::DirVars;
use crate::error::{ErrorKind, Result};
use crate::validate::validate;
use shelf_metadata::models::{Book, BookFile, SortDisplay};
use shelf_schema::Schema;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// The validated, read-only collection of every book in a run.
///
/// Books are ordered by title (`sort`, then `display`). A `Library` can only be
/// built when every library-wide invariant holds; there is no mutation API.
#[derive(Debug, Clone)]
pub struct Library {
    schema: Schema,
    books: Vec<Book>,
}
impl Library {
    /// Validates `books` as a whole and freezes them into a library.
    ///
    /// Returns [`ErrorKind::Invalid`] with every violation found.
    pub fn new(schema: Schema, mut books: Vec<Book>, dir_vars: &DirVars) -> Result<Self> {
        let violations = validate(&books, dir_vars);
        if !violations.is_empty() {
            exn::bail!(ErrorKind::Invalid(violations));
        }
        books.sort_by(|a, b| a.title().cmp(b.title()).then_with(|| a.location().cmp(b.location())));
        Ok(Self { schema, books })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Book> {
        self.books.iter()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Finds the book with the given title.
    pub fn get(&self, title: &SortDisplay) -> Option<&Book> {
        self.books.binary_search_by(|book| book.title().cmp(title)).ok().map(|i| &self.books[i])
    }

    /// Finds a book by its title's display value. Use [`Library::get`] to
    /// look up a title by both its values.
    pub fn by_title(&self, display: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.title().display == display)
    }

    /// Builds the cross-reference view of every `sortdisplay` entity.
    pub fn cross_references(&self) -> CrossReferences<'_> {
        let mut entities: BTreeMap<&str, BTreeMap<&SortDisplay, Vec<&Book>>> = BTreeMap::new();
        for book in &self.books {
            for (field, entity) in book.sortdisplays() {
                entities.entry(field).or_default().entry(entity).or_default().push(book);
            }
        }
        CrossReferences { entities }
    }

    /// Resolves where `file` lives: its directory template is rendered with
    /// `dir_vars`, joined with the file name and, when relative, with the
    /// book's location. `.` and `..` are resolved lexically; the filesystem
    /// is never consulted.
    pub fn file_path(book: &Book, file: &BookFile, dir_vars: &DirVars) -> Result<PathBuf> {
        let directory = match file.directory.render(|name| dir_vars.get(name).map(str::to_string)) {
            Ok(directory) => directory,
            Err(var) => exn::bail!(ErrorKind::UnresolvedDirVar { var, location: book.location().to_path_buf() }),
        };
        let path = Path::new(&directory).join(&file.name);
        Ok(normalize(&match path.is_absolute() {
            true => path,
            false => book.location().join(path),
        }))
    }
}
impl<'a> IntoIterator for &'a Library {
    type Item = &'a Book;
    type IntoIter = std::slice::Iter<'a, Book>;
    fn into_iter(self) -> Self::IntoIter {
        self.books.iter()
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                },
                Some(Component::RootDir | Component::Prefix(_)) => {},
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

/// Every distinct `sortdisplay` entity, per field, with the books that
/// reference it. Books appear in library order.
#[derive(Debug, Clone)]
pub struct CrossReferences<'a> {
    entities: BTreeMap<&'a str, BTreeMap<&'a SortDisplay, Vec<&'a Book>>>,
}
impl<'a> CrossReferences<'a> {
    /// Fields with at least one entity.
    pub fn fields(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entities.keys().copied()
    }

    /// The distinct entities of one field, sorted, with their books.
    pub fn entities(&self, field: &str) -> impl Iterator<Item = (&'a SortDisplay, &[&'a Book])> + '_ {
        self.entities
            .get(field)
            .into_iter()
            .flat_map(|entities| entities.iter().map(|(entity, books)| (*entity, books.as_slice())))
    }

    /// Books referencing `entity` in `field`.
    pub fn books(&self, field: &str, entity: &SortDisplay) -> &[&'a Book] {
        self.entities.get(field).and_then(|entities| entities.get(entity)).map(Vec::as_slice).unwrap_or_default()
    }

    /// For each entity `book` references, the *other* books that reference it.
    pub fn related(&self, book: &'a Book) -> impl Iterator<Item = (&'a str, &'a SortDisplay, &'a Book)> + '_ {
        book.sortdisplays().flat_map(move |(field, entity)| {
            self.books(field, entity)
                .iter()
                .filter(move |other| !std::ptr::eq(**other, book))
                .map(move |other| (field, entity, *other))
        })
    }

    /// Number of distinct `(field, entity)` pairs.
    pub fn len(&self) -> usize {
        self.entities.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shelf_metadata::parse_book;

    fn schema() -> Schema {
        r#"{"title": "title", "files": "file", "authors": "sortdisplay"}"#.parse().unwrap()
    }

    fn library() -> Library {
        let schema = schema();
        let books = [
            ("lib/c", json!({"sort": "Hobbit, The", "display": "The Hobbit"}), json!("J. R. R. Tolkien"), "{v1}/../shelf"),
            ("lib/a", json!("Dune"), json!(["Frank Herbert", "Brian Herbert"]), "."),
            ("lib/b", json!("Dune Messiah"), json!("Frank Herbert"), "/abs"),
        ]
        .into_iter()
        .map(|(location, title, authors, directory)| {
            let metadata = json!({"title": title, "authors": authors, "files": {"name": "book.epub", "directory": directory}});
            parse_book(Path::new(location), &metadata, &schema, &()).unwrap()
        })
        .collect();
        let mut dir_vars = DirVars::new();
        dir_vars.insert("v1", "/mnt/books/sub");
        Library::new(schema, books, &dir_vars).unwrap()
    }

    #[test]
    fn test_books_are_ordered_by_title() {
        let library = library();
        let titles: Vec<_> = library.iter().map(|book| book.title().display.as_str()).collect();
        assert_eq!(titles, ["Dune", "Dune Messiah", "The Hobbit"]);
        assert_eq!(library.len(), 3);
    }

    #[test]
    fn test_lookup_by_title() {
        let library = library();
        assert_eq!(library.by_title("The Hobbit").unwrap().location(), Path::new("lib/c"));
        assert!(library.by_title("Hobbit, The").is_none());
        assert!(library.by_title("Hobbit").is_none());
        let title = SortDisplay::from("Dune Messiah");
        assert_eq!(library.get(&title).unwrap().location(), Path::new("lib/b"));
    }

    #[test]
    fn test_lookup_by_title_ignores_sort_values() {
        let schema = schema();
        let books = [("lib/a", json!({"sort": "X", "display": "Y"})), ("lib/b", json!({"sort": "Y", "display": "Z"}))]
            .into_iter()
            .map(|(location, title)| {
                let metadata = json!({"title": title, "files": {"name": "book.epub"}, "authors": null});
                parse_book(Path::new(location), &metadata, &schema, &()).unwrap()
            })
            .collect();
        let library = Library::new(schema, books, &DirVars::new()).unwrap();
        assert_eq!(library.by_title("Y").unwrap().location(), Path::new("lib/a"));
        assert_eq!(library.by_title("Z").unwrap().location(), Path::new("lib/b"));
        assert!(library.by_title("X").is_none());
        assert_eq!(library.get(&SortDisplay::new("Y", "Z")).unwrap().location(), Path::new("lib/b"));
    }

    #[test]
    fn test_cross_references() {
        let library = library();
        let refs = library.cross_references();
        assert_eq!(refs.fields().collect::<Vec<_>>(), ["authors"]);
        assert_eq!(refs.len(), 3);
        let herbert = SortDisplay::from("Frank Herbert");
        let books: Vec<_> = refs.books("authors", &herbert).iter().map(|b| b.title().display.as_str()).collect();
        assert_eq!(books, ["Dune", "Dune Messiah"]);
        let dune = library.by_title("Dune").unwrap();
        let related: Vec<_> = refs.related(dune).map(|(_, entity, other)| (entity.display.as_str(), other.location())).collect();
        assert_eq!(related, [("Frank Herbert", Path::new("lib/b"))]);
    }

    #[test]
    fn test_file_paths() {
        let library = library();
        let mut dir_vars = DirVars::new();
        dir_vars.insert("v1", "/mnt/books/sub");
        let path = |title: &str| {
            let book = library.by_title(title).unwrap();
            Library::file_path(book, &book.files()[0], &dir_vars).unwrap()
        };
        assert_eq!(path("Dune"), Path::new("lib/a/book.epub"));
        assert_eq!(path("Dune Messiah"), Path::new("/abs/book.epub"));
        assert_eq!(path("The Hobbit"), Path::new("/mnt/books/shelf/book.epub"));

        let book = library.by_title("The Hobbit").unwrap();
        let err = Library::file_path(book, &book.files()[0], &DirVars::new()).unwrap_err();
        assert_eq!(*err, ErrorKind::UnresolvedDirVar { var: "v1".into(), location: "lib/c".into() });
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b/../c")), Path::new("a/c"));
        assert_eq!(normalize(Path::new("../a/..")), Path::new(".."));
        assert_eq!(normalize(Path::new("/../a")), Path::new("/a"));
    }
}

//! The field type registry: how each [`FieldKind`] normalizes, compares and
//! serializes raw JSON.
//!
//! Shared rules for every kind:
//! - a one-element array collapses to its element,
//! - an empty array or empty object collapses to null,
//! - an empty string is *not* null (except in a non-inline text file).
//!
//! Anything outside a kind's accepted shapes is an error, never repaired.

use crate::models::{BookFile, DirTemplate, FieldValue, SortDisplay};
use crate::violation::FieldError;
use serde_json::{Map, Value, json};
use shelf_schema::FieldKind;
use std::collections::BTreeMap;

static NULL: Value = Value::Null;

/// The three operations every field kind supports.
pub trait FieldType {
    /// Reduces a raw value to its canonical form. `None` means the key is
    /// absent from the metadata (or, for a non-inline string, that there is no
    /// text file).
    fn normalize(&self, raw: Option<&Value>) -> Result<FieldValue, FieldError>;

    /// Semantic equality of two raw values: both normalize, to the same
    /// canonical value.
    fn equals(&self, a: &Value, b: &Value) -> bool {
        match (self.normalize(Some(a)), self.normalize(Some(b))) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Converts a canonical value back to its raw metadata form. Returns `None`
    /// when the value isn't stored in the metadata object (non-inline strings)
    /// or doesn't belong to this kind.
    fn serialize(&self, value: &FieldValue) -> Option<Value>;
}

impl FieldType for FieldKind {
    fn normalize(&self, raw: Option<&Value>) -> Result<FieldValue, FieldError> {
        let Some(raw) = raw else {
            return match self {
                Self::File => Err(FieldError::validation("at least one file is required")),
                Self::String { inline: false } => Ok(FieldValue::String(None)),
                _ => Err(FieldError::missing()),
            };
        };
        match self {
            Self::Date(formats) => match collapse(raw) {
                Value::Null => Ok(FieldValue::Date(None)),
                Value::String(s) => formats
                    .input
                    .parse(s)
                    .map(|date| FieldValue::Date(Some(date)))
                    .map_err(|e| FieldError::parse(format!("'{s}' is not a valid '{}' date: {e}", formats.input))),
                other => Err(FieldError::validation(format!("expected a date string or null, found {other}"))),
            },
            Self::File => files(raw).map(FieldValue::Files),
            Self::KeyValue { .. } => match collapse(raw) {
                Value::Null => Ok(FieldValue::KeyValues(BTreeMap::new())),
                Value::Object(map) => map
                    .iter()
                    .map(|(key, value)| match value {
                        Value::String(s) => Ok((key.clone(), s.clone())),
                        Value::Null => Err(FieldError::validation(format!("key '{key}' has a null value"))),
                        other => Err(FieldError::validation(format!("key '{key}' must have a string value, found {other}"))),
                    })
                    .collect::<Result<_, _>>()
                    .map(FieldValue::KeyValues),
                other => Err(FieldError::validation(format!("expected an object of strings or null, found {other}"))),
            },
            Self::SortDisplay => sortdisplays(raw).map(FieldValue::SortDisplays),
            Self::String { inline } => match collapse(raw) {
                Value::Null => Ok(FieldValue::String(None)),
                Value::String(s) if s.is_empty() && !inline => Ok(FieldValue::String(None)),
                Value::String(s) => Ok(FieldValue::String(Some(s.clone()))),
                other => Err(FieldError::validation(format!("expected a string or null, found {other}"))),
            },
            Self::Title => title(raw).map(FieldValue::Title),
        }
    }

    fn serialize(&self, value: &FieldValue) -> Option<Value> {
        match (self, value) {
            (Self::Date(_), FieldValue::Date(None)) => Some(Value::Null),
            (Self::Date(formats), FieldValue::Date(Some(date))) => match formats.input.format(*date) {
                Ok(s) => Some(Value::String(s)),
                Err(e) => {
                    tracing::warn!(format = %formats.input, %date, error = %e, "Could not render date");
                    None
                },
            },
            (Self::File, FieldValue::Files(files)) => Some(collapse_list(files.iter().map(file_value).collect())),
            (Self::KeyValue { .. }, FieldValue::KeyValues(map)) if map.is_empty() => Some(Value::Null),
            (Self::KeyValue { .. }, FieldValue::KeyValues(map)) => Some(Value::Object(
                map.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect::<Map<_, _>>(),
            )),
            (Self::SortDisplay, FieldValue::SortDisplays(entities)) => {
                Some(collapse_list(entities.iter().map(sortdisplay_value).collect()))
            },
            (Self::String { inline: true }, FieldValue::String(text)) => {
                Some(text.as_ref().map_or(Value::Null, |s| Value::String(s.clone())))
            },
            (Self::Title, FieldValue::Title(title)) => Some(sortdisplay_value(title)),
            _ => None,
        }
    }
}

fn collapse(raw: &Value) -> &Value {
    match raw {
        Value::Array(items) if items.len() == 1 => &items[0],
        Value::Array(items) if items.is_empty() => &NULL,
        Value::Object(map) if map.is_empty() => &NULL,
        _ => raw,
    }
}

/// The entries of a multi-valued field: an array's elements, or a bare
/// element. Nested arrays are left for the entry parser to reject.
fn items(raw: &Value) -> Vec<&Value> {
    match raw {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        Value::Object(map) if map.is_empty() => Vec::new(),
        item => vec![item],
    }
}

fn collapse_list(mut values: Vec<Value>) -> Value {
    match values.len() {
        0 => Value::Null,
        1 => values.remove(0),
        _ => Value::Array(values),
    }
}

/// Parses the string shorthand or `{sort, display}` object form.
fn sortdisplay(raw: &Value) -> Result<SortDisplay, FieldError> {
    match raw {
        Value::String(s) => Ok(SortDisplay::from(s.as_str())),
        Value::Object(map) if map.len() == 2 => match (map.get("sort"), map.get("display")) {
            (Some(Value::String(sort)), Some(Value::String(display))) => Ok(SortDisplay::new(sort, display)),
            _ => Err(FieldError::validation(format!("'sort' and 'display' must both be strings, found {raw}"))),
        },
        other => Err(FieldError::validation(format!(
            "expected a string or an object with exactly 'sort' and 'display', found {other}"
        ))),
    }
}

fn sortdisplays(raw: &Value) -> Result<Vec<SortDisplay>, FieldError> {
    let items = items(raw);
    let mut entities: Vec<SortDisplay> = Vec::with_capacity(items.len());
    for item in items {
        let entity = sortdisplay(item)?;
        if entities.contains(&entity) {
            return Err(FieldError::validation(format!("'{entity}' appears more than once")));
        }
        entities.push(entity);
    }
    Ok(entities)
}

pub(crate) fn title(raw: &Value) -> Result<SortDisplay, FieldError> {
    match collapse(raw) {
        Value::Null => Err(FieldError::validation("title must not be null or empty")),
        Value::Array(_) => Err(FieldError::validation("a book has exactly one title")),
        item => {
            let title = sortdisplay(item)?;
            if title.sort.is_empty() || title.display.is_empty() {
                return Err(FieldError::validation("title sort and display must not be empty"));
            }
            Ok(title)
        },
    }
}

fn files(raw: &Value) -> Result<Vec<BookFile>, FieldError> {
    let mut files = items(raw).into_iter().map(file).collect::<Result<Vec<_>, _>>()?;
    if files.is_empty() {
        return Err(FieldError::validation("at least one file is required"));
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(pair) = files.windows(2).find(|pair| pair[0].name == pair[1].name) {
        return Err(FieldError::validation(format!("duplicate file with name '{}'", pair[0].name)));
    }
    Ok(files)
}

fn file(raw: &Value) -> Result<BookFile, FieldError> {
    let Value::Object(entry) = raw else {
        return Err(FieldError::validation(format!("expected a file object, found {raw}")));
    };
    if let Some(key) = entry.keys().find(|key| !matches!(key.as_str(), "name" | "hash" | "directory")) {
        return Err(FieldError::validation(format!("unexpected key '{key}' in file entry")));
    }
    let name = match entry.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(other) => return Err(FieldError::validation(format!("file 'name' must be a non-empty string, found {other}"))),
        None => return Err(FieldError::validation(format!("file entry {raw} has no 'name'"))),
    };
    let hash = match entry.get("hash") {
        None | Some(Value::Null) => None,
        Some(Value::String(hash)) => Some(hash.parse()?),
        Some(other) => return Err(FieldError::validation(format!("file 'hash' must be a string, found {other}"))),
    };
    let directory = match entry.get("directory") {
        None => DirTemplate::default(),
        Some(Value::String(directory)) => directory.parse()?,
        Some(other) => return Err(FieldError::validation(format!("file 'directory' must be a string, found {other}"))),
    };
    Ok(BookFile { name, hash, directory })
}

fn sortdisplay_value(entity: &SortDisplay) -> Value {
    match entity.is_simple() {
        true => Value::String(entity.display.clone()),
        false => json!({"display": entity.display, "sort": entity.sort}),
    }
}

fn file_value(file: &BookFile) -> Value {
    json!({
        "directory": file.directory.as_str(),
        "hash": file.hash.as_ref().map(ToString::to_string),
        "name": file.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::ViolationKind;
    use rstest::rstest;
    use shelf_schema::{DateFormats, FieldKind};
    use time::{Date, Month};

    fn date_kind(input: &str, output: &str) -> FieldKind {
        FieldKind::Date(DateFormats { input: input.parse().unwrap(), output: output.parse().unwrap() })
    }

    fn keyvalue_kind() -> FieldKind {
        FieldKind::KeyValue { key_label: "id_type".into(), value_label: "id_value".into() }
    }

    fn error_kind(kind: &FieldKind, raw: Option<Value>) -> ViolationKind {
        kind.normalize(raw.as_ref()).unwrap_err().kind
    }

    #[rstest]
    #[case(json!("Frank Herbert"))]
    #[case(json!({"sort": "Herbert, Frank", "display": "Frank Herbert"}))]
    #[case(json!(["A", {"sort": "B, b", "display": "b B"}, "C"]))]
    #[case(json!([]))]
    #[case(json!(null))]
    #[case(json!(""))]
    fn test_sortdisplay_round_trip_is_idempotent(#[case] raw: Value) {
        let kind = FieldKind::SortDisplay;
        let canonical = kind.normalize(Some(&raw)).unwrap();
        let serialized = kind.serialize(&canonical).unwrap();
        assert_eq!(kind.normalize(Some(&serialized)).unwrap(), canonical);
    }

    #[rstest]
    #[case(FieldKind::SortDisplay, json!("A"))]
    #[case(FieldKind::SortDisplay, json!({"sort": "B, A", "display": "A B"}))]
    #[case(FieldKind::Title, json!("Dune"))]
    #[case(FieldKind::File, json!({"name": "a.epub", "hash": null}))]
    #[case(keyvalue_kind(), json!({"isbn": "123"}))]
    #[case(FieldKind::String { inline: true }, json!("text"))]
    #[case(date_kind("%Y-%m-%d", "%Y"), json!("2001-02-03"))]
    fn test_one_element_array_equals_element(#[case] kind: FieldKind, #[case] raw: Value) {
        assert!(kind.equals(&json!([raw.clone()]), &raw));
        assert!(kind.equals(&raw, &json!([raw.clone()])));
    }

    #[rstest]
    #[case(FieldKind::SortDisplay, json!("A"), json!({"sort": "A", "display": "A"}), true)]
    #[case(FieldKind::SortDisplay, json!(["A", "B"]), json!(["B", "A"]), false)]
    #[case(FieldKind::SortDisplay, json!([]), json!(null), true)]
    #[case(FieldKind::SortDisplay, json!({}), json!(null), true)]
    #[case(keyvalue_kind(), json!({}), json!(null), true)]
    #[case(FieldKind::String { inline: true }, json!(""), json!(null), false)]
    #[case(FieldKind::String { inline: true }, json!([]), json!(null), true)]
    #[case(date_kind("%Y-%m-%d", "%Y"), json!("2001-2-3"), json!("2001-02-03"), true)]
    #[case(date_kind("%Y-%m-%d", "%Y"), json!("2001-13-03"), json!("2001-13-03"), false)]
    fn test_equals(#[case] kind: FieldKind, #[case] a: Value, #[case] b: Value, #[case] expected: bool) {
        assert_eq!(kind.equals(&a, &b), expected);
    }

    #[test]
    fn test_date_rejects_invalid_calendar_date() {
        let kind = date_kind("%Y-%m-%d", "%d %B %Y");
        assert_eq!(error_kind(&kind, Some(json!("1999-13-40"))), ViolationKind::Parse);
        assert_eq!(error_kind(&kind, Some(json!("1999-12-31T00:00"))), ViolationKind::Parse);
        assert_eq!(error_kind(&kind, Some(json!(19991231))), ViolationKind::Validation);
        assert_eq!(error_kind(&kind, None), ViolationKind::MissingField);
    }

    #[test]
    fn test_date_serializes_with_input_format() {
        let kind = date_kind("%Y-%b-%d", "%Y-%m-%d");
        let value = kind.normalize(Some(&json!("0100-jan-31"))).unwrap();
        let expected = Date::from_calendar_date(100, Month::January, 31).unwrap();
        assert_eq!(value, FieldValue::Date(Some(expected)));
        assert_eq!(kind.serialize(&value), Some(json!("0100-Jan-31")));
        assert_eq!(kind.serialize(&FieldValue::Date(None)), Some(Value::Null));
    }

    #[test]
    fn test_files_are_sorted_and_defaulted() {
        let raw = json!([
            {"name": "b.pdf", "hash": "md5:d41d8cd98f00b204e9800998ecf8427e", "directory": "{v1}/sub"},
            {"name": "a.epub"},
        ]);
        let FieldValue::Files(files) = FieldKind::File.normalize(Some(&raw)).unwrap() else {
            panic!("expected files");
        };
        assert_eq!(files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), ["a.epub", "b.pdf"]);
        assert_eq!(files[0].directory.as_str(), ".");
        assert_eq!(files[0].hash, None);
        assert_eq!(files[1].directory.vars().collect::<Vec<_>>(), ["v1"]);
        let serialized = FieldKind::File.serialize(&FieldValue::Files(files)).unwrap();
        assert_eq!(
            serialized,
            json!([
                {"directory": ".", "hash": null, "name": "a.epub"},
                {"directory": "{v1}/sub", "hash": "md5:d41d8cd98f00b204e9800998ecf8427e", "name": "b.pdf"},
            ])
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(json!(null)))]
    #[case(Some(json!([])))]
    #[case(Some(json!([{"name": "a.epub"}, {"name": "a.epub", "directory": "x"}])))]
    #[case(Some(json!({"name": "a.epub", "size": 3})))]
    #[case(Some(json!({"hash": null})))]
    #[case(Some(json!({"name": "a.epub", "hash": "md5:xyz"})))]
    #[case(Some(json!({"name": "a.epub", "directory": "{oops"})))]
    #[case(Some(json!("a.epub")))]
    #[case(Some(json!([[]])))]
    #[case(Some(json!([[{"name": "a.epub"}]])))]
    fn test_file_rejects(#[case] raw: Option<Value>) {
        assert_eq!(error_kind(&FieldKind::File, raw), ViolationKind::Validation);
    }

    #[test]
    fn test_keyvalue() {
        let kind = keyvalue_kind();
        let value = kind.normalize(Some(&json!({"isbn": "123", "asin": "B00"}))).unwrap();
        let FieldValue::KeyValues(map) = &value else { panic!("expected keyvalues") };
        assert_eq!(map.keys().collect::<Vec<_>>(), ["asin", "isbn"]);
        assert_eq!(kind.serialize(&value), Some(json!({"asin": "B00", "isbn": "123"})));
        assert_eq!(kind.serialize(&FieldValue::KeyValues(BTreeMap::new())), Some(Value::Null));
        assert_eq!(error_kind(&kind, Some(json!({"isbn": null}))), ViolationKind::Validation);
        assert_eq!(error_kind(&kind, Some(json!({"isbn": 123}))), ViolationKind::Validation);
        assert_eq!(error_kind(&kind, Some(json!("isbn"))), ViolationKind::Validation);
    }

    #[rstest]
    #[case(json!(["A", "A"]))]
    #[case(json!(["A", {"sort": "A", "display": "A"}]))]
    #[case(json!({"sort": "A"}))]
    #[case(json!({"sort": "A", "display": "B", "extra": "C"}))]
    #[case(json!({"sort": "A", "display": 1}))]
    #[case(json!([["A"]]))]
    #[case(json!([[]]))]
    #[case(json!(1))]
    fn test_sortdisplay_rejects(#[case] raw: Value) {
        assert_eq!(error_kind(&FieldKind::SortDisplay, Some(raw)), ViolationKind::Validation);
    }

    #[test]
    fn test_sortdisplay_keeps_order_and_partial_duplicates() {
        let raw = json!(["Z", {"sort": "A", "display": "X"}, {"sort": "A", "display": "Y"}]);
        let value = FieldKind::SortDisplay.normalize(Some(&raw)).unwrap();
        assert_eq!(
            value.as_sortdisplays().unwrap(),
            [SortDisplay::from("Z"), SortDisplay::new("A", "X"), SortDisplay::new("A", "Y")]
        );
    }

    #[rstest]
    #[case(None, ViolationKind::MissingField)]
    #[case(Some(json!(null)), ViolationKind::Validation)]
    #[case(Some(json!("")), ViolationKind::Validation)]
    #[case(Some(json!({"sort": "", "display": "X"})), ViolationKind::Validation)]
    #[case(Some(json!(["A", "B"])), ViolationKind::Validation)]
    fn test_title_rejects(#[case] raw: Option<Value>, #[case] expected: ViolationKind) {
        assert_eq!(error_kind(&FieldKind::Title, raw), expected);
    }

    #[test]
    fn test_title_collapses_when_simple() {
        let simple = FieldKind::Title.normalize(Some(&json!({"sort": "Dune", "display": "Dune"}))).unwrap();
        assert_eq!(FieldKind::Title.serialize(&simple), Some(json!("Dune")));
        let full = FieldKind::Title.normalize(Some(&json!({"display": "The Hobbit", "sort": "Hobbit, The"}))).unwrap();
        assert_eq!(FieldKind::Title.serialize(&full), Some(json!({"display": "The Hobbit", "sort": "Hobbit, The"})));
    }

    #[test]
    fn test_strings() {
        let inline = FieldKind::String { inline: true };
        assert_eq!(inline.normalize(Some(&json!(""))).unwrap(), FieldValue::String(Some(String::new())));
        assert_eq!(error_kind(&inline, None), ViolationKind::MissingField);
        assert_eq!(error_kind(&inline, Some(json!(5))), ViolationKind::Validation);
        assert_eq!(inline.serialize(&FieldValue::String(None)), Some(Value::Null));

        let text = FieldKind::String { inline: false };
        assert_eq!(text.normalize(None).unwrap(), FieldValue::String(None));
        assert_eq!(text.normalize(Some(&json!(""))).unwrap(), FieldValue::String(None));
        assert_eq!(text.serialize(&FieldValue::String(Some("x".into()))), None);
    }

    #[test]
    fn test_serialize_ignores_mismatched_values() {
        assert_eq!(FieldKind::Title.serialize(&FieldValue::String(Some("x".into()))), None);
    }
}

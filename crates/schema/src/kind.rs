use crate::error::{ErrorKind, Result};
use crate::format::DateFormat;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Input and output formats for a `date` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormats {
    /// Format used to read (and write back) the metadata value.
    pub input: DateFormat,
    /// Format used by output generators.
    pub output: DateFormat,
}

/// The closed set of field kinds, each carrying its own configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A calendar date.
    Date(DateFormats),
    /// One or more files belonging to the book.
    File,
    /// A map of string keys to string values.
    KeyValue {
        /// Column label for keys in tabular output.
        key_label: String,
        /// Column label for values in tabular output.
        value_label: String,
    },
    /// Cross-referenced `{sort, display}` entities (e.g. authors).
    SortDisplay,
    /// Free text, either inline in the metadata or in a sibling text file.
    String {
        /// `true` when the value lives in the metadata itself.
        inline: bool,
    },
    /// The book's unique title.
    Title,
}
impl FieldKind {
    /// Returns the schema type name for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date(_) => "date",
            Self::File => "file",
            Self::KeyValue { .. } => "keyvalue",
            Self::SortDisplay => "sortdisplay",
            Self::String { .. } => "string",
            Self::Title => "title",
        }
    }

    /// Parses a kind declaration: either a bare type name, or an object with a
    /// `type` key and the kind's configuration.
    pub(crate) fn parse(field: &str, raw: &Value) -> Result<Self> {
        let invalid = |reason: String| ErrorKind::InvalidType { field: field.to_string(), reason };
        let (type_name, mut config) = match raw {
            Value::String(s) => (s.to_lowercase(), Config::default()),
            Value::Object(map) => {
                let type_name = match map.get("type") {
                    Some(Value::String(s)) => s.to_lowercase(),
                    Some(other) => exn::bail!(invalid(format!("'type' must be a string, found {other}"))),
                    None => exn::bail!(invalid("missing 'type'".to_string())),
                };
                (type_name, Config::from(map))
            },
            other => exn::bail!(invalid(format!("expected a type name or object, found {other}"))),
        };
        let kind = match type_name.as_str() {
            "date" => {
                let input: DateFormat = config.string(field, "input_format")?.parse()?;
                let output: DateFormat = config.string(field, "output_format")?.parse()?;
                if !input.is_complete() {
                    exn::bail!(ErrorKind::DateFormat {
                        format: input.to_string(),
                        reason: "an input format must include a year and either a month and day or a day of year"
                            .to_string(),
                    });
                }
                Self::Date(DateFormats { input, output })
            },
            "file" => Self::File,
            "keyvalue" => Self::KeyValue {
                key_label: config.string(field, "key_label")?,
                value_label: config.string(field, "value_label")?,
            },
            "sortdisplay" => Self::SortDisplay,
            "string" => Self::String { inline: config.bool(field, "inline")? },
            "title" => Self::Title,
            other => exn::bail!(invalid(format!("unknown type '{other}'"))),
        };
        config.finish(field)?;
        Ok(kind)
    }
}
impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration keys of an object-form declaration, consumed as they're read
/// so that leftovers can be reported.
#[derive(Default)]
struct Config<'a> {
    remaining: Vec<(&'a str, &'a Value)>,
}
impl<'a> From<&'a Map<String, Value>> for Config<'a> {
    fn from(map: &'a Map<String, Value>) -> Self {
        Self {
            remaining: map.iter().filter(|(k, _)| *k != "type").map(|(k, v)| (k.as_str(), v)).collect(),
        }
    }
}
impl<'a> Config<'a> {
    fn take(&mut self, field: &str, key: &str) -> Result<&'a Value> {
        match self.remaining.iter().position(|(k, _)| *k == key) {
            Some(i) => Ok(self.remaining.remove(i).1),
            None => exn::bail!(ErrorKind::InvalidType {
                field: field.to_string(),
                reason: format!("missing '{key}'")
            }),
        }
    }

    fn string(&mut self, field: &str, key: &str) -> Result<String> {
        match self.take(field, key)? {
            Value::String(s) => Ok(s.clone()),
            other => exn::bail!(ErrorKind::InvalidType {
                field: field.to_string(),
                reason: format!("'{key}' must be a string, found {other}")
            }),
        }
    }

    fn bool(&mut self, field: &str, key: &str) -> Result<bool> {
        match self.take(field, key)? {
            Value::Bool(b) => Ok(*b),
            other => exn::bail!(ErrorKind::InvalidType {
                field: field.to_string(),
                reason: format!("'{key}' must be true or false, found {other}")
            }),
        }
    }

    fn finish(self, field: &str) -> Result<()> {
        match self.remaining.first() {
            Some((key, _)) => exn::bail!(ErrorKind::InvalidType {
                field: field.to_string(),
                reason: format!("unexpected key '{key}'")
            }),
            None => Ok(()),
        }
    }
}

/// A single named, typed field in a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDeclaration {
    /// Field name, lower-cased and unique within its schema.
    pub name: String,
    /// Field kind and configuration.
    pub kind: FieldKind,
}
impl FieldDeclaration {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into().to_lowercase(), kind }
    }

    /// Returns `true` for a `string` field whose value lives in a text file.
    pub fn is_text_file(&self) -> bool {
        matches!(self.kind, FieldKind::String { inline: false })
    }
}

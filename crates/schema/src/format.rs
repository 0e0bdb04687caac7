//! strftime-style date formats, compiled into [`time`] format descriptions.
//!
//! Schemas are authored with the familiar `%Y-%m-%d` syntax. Each format is
//! translated once, when the schema is parsed, into two [`OwnedFormatItem`]s:
//! a lenient one for parsing (unpadded numbers, case-insensitive names, the
//! same leniency as `strptime`) and a strict one for rendering (zero-padded
//! numbers, four-digit years even before the year 1000).
//!
//! | Directive   | Meaning                      |
//! |-------------|------------------------------|
//! | `%Y`        | Four-digit year              |
//! | `%m`        | Month number                 |
//! | `%d`        | Day of month                 |
//! | `%b`, `%h`  | Abbreviated month name       |
//! | `%B`        | Full month name              |
//! | `%j`        | Day of year                  |
//! | `%a`        | Abbreviated weekday name     |
//! | `%A`        | Full weekday name            |
//! | `%%`        | A literal `%`                |

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use time::Date;
use time::format_description::{self, OwnedFormatItem};

/// Which calendar components a format string supplies.
#[derive(Default)]
struct Components {
    year: bool,
    month: bool,
    day: bool,
    ordinal: bool,
}
impl Components {
    /// A date can only be parsed when the format pins down a single calendar day.
    fn is_complete(&self) -> bool {
        self.year && ((self.month && self.day) || self.ordinal)
    }
}

/// A compiled strftime-style date format.
///
/// Two formats are equal when their source strings are equal.
#[derive(Clone)]
pub struct DateFormat {
    source: String,
    complete: bool,
    parse: OwnedFormatItem,
    render: OwnedFormatItem,
}
impl DateFormat {
    /// The strftime-style string this format was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the format determines a full calendar date, and so
    /// can be used as an input format.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Parses `input` against this format. The whole input must match, and
    /// the result must be a real calendar date with a positive year.
    pub fn parse(&self, input: &str) -> std::result::Result<Date, String> {
        // No directive produces a sign, so any beyond the format's literals is
        // a signed year, which `strptime` never accepts.
        for sign in ['+', '-'] {
            if input.matches(sign).count() > self.source.matches(sign).count() {
                return Err(format!("unexpected '{sign}' in '{input}'"));
            }
        }
        let date = Date::parse(input, &self.parse).map_err(|e| e.to_string())?;
        if date.year() < 1 {
            return Err(format!("year {} is out of range", date.year()));
        }
        Ok(date)
    }

    /// Renders `date` with this format.
    pub fn format(&self, date: Date) -> std::result::Result<String, String> {
        date.format(&self.render).map_err(|e| e.to_string())
    }

    /// Translates a strftime-style string into a pair of `time` format
    /// descriptions (one for parsing, one for rendering).
    fn translate(source: &str) -> Result<(String, String, Components)> {
        let invalid = |reason: String| ErrorKind::DateFormat { format: source.to_string(), reason };
        let mut parse = String::new();
        let mut render = String::new();
        let mut components = Components::default();
        let mut chars = source.chars();
        while let Some(c) = chars.next() {
            let (p, r) = match c {
                '%' => match chars.next() {
                    Some('Y') => {
                        components.year = true;
                        ("[year]", "[year]")
                    },
                    Some('m') => {
                        components.month = true;
                        ("[month padding:none]", "[month]")
                    },
                    Some('d') => {
                        components.day = true;
                        ("[day padding:none]", "[day]")
                    },
                    Some('b') | Some('h') => {
                        components.month = true;
                        ("[month repr:short case_sensitive:false]", "[month repr:short]")
                    },
                    Some('B') => {
                        components.month = true;
                        ("[month repr:long case_sensitive:false]", "[month repr:long]")
                    },
                    Some('j') => {
                        components.ordinal = true;
                        ("[ordinal padding:none]", "[ordinal]")
                    },
                    Some('a') => ("[weekday repr:short case_sensitive:false]", "[weekday repr:short]"),
                    Some('A') => ("[weekday repr:long case_sensitive:false]", "[weekday repr:long]"),
                    Some('%') => ("%", "%"),
                    Some(other) => exn::bail!(invalid(format!("unsupported directive '%{other}'"))),
                    None => exn::bail!(invalid("trailing '%'".to_string())),
                },
                // A literal opening bracket is escaped by doubling it.
                '[' => ("[[", "[["),
                _ => {
                    parse.push(c);
                    render.push(c);
                    continue;
                },
            };
            parse.push_str(p);
            render.push_str(r);
        }
        Ok((parse, render, components))
    }
}
impl FromStr for DateFormat {
    type Err = Error;
    fn from_str(source: &str) -> std::result::Result<Self, Self::Err> {
        let (parse, render, components) = Self::translate(source)?;
        let invalid = || ErrorKind::DateFormat { format: source.to_string(), reason: "invalid description".into() };
        Ok(Self {
            source: source.to_string(),
            complete: components.is_complete(),
            parse: format_description::parse_owned::<1>(&parse).or_raise(invalid)?,
            render: format_description::parse_owned::<1>(&render).or_raise(invalid)?,
        })
    }
}
impl PartialEq for DateFormat {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
impl Eq for DateFormat {}
impl Debug for DateFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("DateFormat").field(&self.source).finish()
    }
}
impl Display for DateFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.source)
    }
}

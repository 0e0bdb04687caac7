//! Directory templates for book files.
//!
//! A file's `directory` may reference caller-supplied dir vars with `{name}`
//! placeholders. `{{` and `}}` stand for literal braces.
//!
//! ```
//! use shelf_metadata::models::DirTemplate;
//!
//! let template: DirTemplate = "{library}/scans/{{raw}}".parse().unwrap();
//! assert_eq!(template.vars().collect::<Vec<_>>(), ["library"]);
//! let rendered = template.render(|name| (name == "library").then(|| "/mnt/books".to_string()));
//! assert_eq!(rendered.unwrap(), "/mnt/books/scans/{raw}");
//! ```

use crate::consts::{DIR_TEMPLATE_REGEX, DIR_VAR_NAME_REGEX};
use crate::violation::FieldError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Literal(String),
    Var(String),
}

/// Returns `true` if `name` can be used as a dir var placeholder.
pub fn is_var_name(name: &str) -> bool {
    DIR_VAR_NAME_REGEX.is_match(name)
}

/// A parsed file directory string.
///
/// Equality compares the source string, which is also what gets written back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirTemplate {
    source: String,
    segments: Vec<Segment>,
}
impl DirTemplate {
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the dir vars referenced, in order of first appearance.
    pub fn vars(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = Vec::new();
        self.segments.iter().filter_map(move |segment| match segment {
            Segment::Var(name) if !seen.contains(&name.as_str()) => {
                seen.push(name);
                Some(name.as_str())
            },
            _ => None,
        })
    }

    /// Substitutes every placeholder using `lookup`. Returns the name of the
    /// first dir var that `lookup` can't supply.
    pub fn render(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String, String> {
        let mut rendered = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Var(name) => rendered.push_str(&lookup(name).ok_or_else(|| name.clone())?),
            }
        }
        Ok(rendered)
    }
}
impl Default for DirTemplate {
    fn default() -> Self {
        Self { source: ".".to_string(), segments: vec![Segment::Literal(".".to_string())] }
    }
}
impl FromStr for DirTemplate {
    type Err = FieldError;
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;
        for captures in DIR_TEMPLATE_REGEX.captures_iter(source) {
            let Some(matched) = captures.get(0) else { continue };
            literal.push_str(&source[last..matched.start()]);
            last = matched.end();
            match (matched.as_str(), captures.get(1)) {
                ("{{", _) => literal.push('{'),
                ("}}", _) => literal.push('}'),
                (_, Some(name)) if is_var_name(name.as_str()) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Var(name.as_str().to_string()));
                },
                (_, Some(name)) => {
                    return Err(FieldError::validation(format!(
                        "invalid dir var name '{}' in directory '{source}'",
                        name.as_str()
                    )));
                },
                (brace, None) => {
                    return Err(FieldError::validation(format!("unmatched '{brace}' in directory '{source}'")));
                },
            }
        }
        literal.push_str(&source[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { source: source.to_string(), segments })
    }
}
impl Display for DirTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "v1" => Some("/data".to_string()),
            "v2" => Some("shelf".to_string()),
            _ => None,
        }
    }

    #[rstest]
    #[case(".", ".", &[])]
    #[case("{v1}/sub", "/data/sub", &["v1"])]
    #[case("{v1}/{v2}/{v1}", "/data/shelf//data", &["v1", "v2"])]
    #[case("{{v1}}", "{v1}", &[])]
    #[case("a{{{v2}}}b", "a{shelf}b", &["v2"])]
    fn test_renders(#[case] source: &str, #[case] expected: &str, #[case] vars: &[&str]) {
        let template: DirTemplate = source.parse().unwrap();
        assert_eq!(template.render(lookup).unwrap(), expected);
        assert_eq!(template.vars().collect::<Vec<_>>(), vars);
        assert_eq!(template.as_str(), source);
    }

    #[test]
    fn test_reports_unresolved_var() {
        let template: DirTemplate = "{v1}/{missing}".parse().unwrap();
        assert_eq!(template.render(lookup).unwrap_err(), "missing");
    }

    #[rstest]
    #[case("{")]
    #[case("a}b")]
    #[case("{}")]
    #[case("{1abc}")]
    #[case("{a b}")]
    fn test_rejects(#[case] source: &str) {
        assert!(source.parse::<DirTemplate>().is_err());
    }
}

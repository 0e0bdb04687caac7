use std::fmt::{Display, Formatter, Result as FmtResult};

/// A cross-referenced entity (an author, a series) with independent sort and
/// display representations.
///
/// Ordered by `sort`, then `display`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortDisplay {
    pub sort: String,
    pub display: String,
}
impl SortDisplay {
    pub fn new(sort: impl Into<String>, display: impl Into<String>) -> Self {
        Self { sort: sort.into(), display: display.into() }
    }

    /// Returns `true` when the pair can be written as a single string.
    pub fn is_simple(&self) -> bool {
        self.sort == self.display
    }

    /// Returns `true` if exactly one of `sort` and `display` matches `other`.
    pub fn partially_matches(&self, other: &Self) -> bool {
        (self.sort == other.sort) != (self.display == other.display)
    }
}
impl From<&str> for SortDisplay {
    fn from(s: &str) -> Self {
        Self::new(s, s)
    }
}
impl From<String> for SortDisplay {
    fn from(s: String) -> Self {
        Self::new(s.clone(), s)
    }
}
impl Display for SortDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.is_simple() {
            true => write!(f, "{}", self.display),
            false => write!(f, "{} (sort: {})", self.display, self.sort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_matches() {
        let a = SortDisplay::new("A", "X");
        assert!(a.partially_matches(&SortDisplay::new("A", "Y")));
        assert!(a.partially_matches(&SortDisplay::new("B", "X")));
        assert!(!a.partially_matches(&SortDisplay::new("A", "X")));
        assert!(!a.partially_matches(&SortDisplay::new("B", "Y")));
    }

    #[test]
    fn test_display() {
        assert_eq!(SortDisplay::from("Dune").to_string(), "Dune");
        assert_eq!(SortDisplay::new("Herbert, Frank", "Frank Herbert").to_string(), "Frank Herbert (sort: Herbert, Frank)");
    }
}

use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Prefix written above the content of every non-inline string text file.
pub(crate) fn title_prefix(display: &str) -> String {
    format!("# Title: {display}\n#\n")
}

// Directory templates: escaped braces, a placeholder, or a stray brace (in that order).
regex!(DIR_TEMPLATE_REGEX, r"\{\{|\}\}|\{([^{}]*)\}|[{}]");
regex!(DIR_VAR_NAME_REGEX, r"^[A-Za-z_][A-Za-z0-9_]*$");
regex!(HEX_DIGEST_REGEX, r"^[0-9a-f]+$");

//! Content-Security-Policy directive lists.

use std::fmt;

use crate::trim::{trim_trailing, SEPARATORS};

/// Baseline directives every policy starts from.
pub const DEFAULT_DIRECTIVES: [&str; 4] = [
    "default-src 'none'",
    "object-src 'none'",
    "base-uri 'none'",
    "form-action 'none'",
];

/// Document whose path is rewritten to a script path.
pub const INDEX_DOCUMENT: &str = "/index.html";

/// Ordered list of CSP directives.
///
/// Insertion order is output order; duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CspDirectives(Vec<String>);

impl CspDirectives {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directive. Syntax is not validated.
    pub fn push(&mut self, directive: impl Into<String>) {
        self.0.push(directive.into());
    }

    /// Number of directives.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over directives in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Directives whose name is `name` (e.g., "script-src").
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter().filter(move |d| directive_name(d) == name)
    }

    /// Serialize as a header value.
    pub fn to_header_value(&self) -> String {
        self.0.join("; ")
    }
}

impl fmt::Display for CspDirectives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_value())
    }
}

/// Fresh list seeded with [`DEFAULT_DIRECTIVES`].
pub fn default_directives() -> CspDirectives {
    CspDirectives(DEFAULT_DIRECTIVES.iter().map(|d| d.to_string()).collect())
}

/// Append `directive` to `list`.
pub fn append_directive(directive: impl Into<String>, list: &mut CspDirectives) {
    list.push(directive);
}

/// Name part of a directive (text before the first whitespace).
pub fn directive_name(directive: &str) -> &str {
    directive.split_whitespace().next().unwrap_or("")
}

/// Split a serialized policy back into directives.
pub fn parse_policy(value: &str) -> Vec<&str> {
    value
        .split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .collect()
}

/// Replace a trailing `/index.html` with `script`.
///
/// Paths without that suffix are returned unchanged.
pub fn replace_index(path: &str, script: &str) -> String {
    match path.strip_suffix(INDEX_DOCUMENT) {
        Some(dir) => format!("{}{}", dir, script),
        None => path.to_string(),
    }
}

/// Join an origin and an already-trimmed relative path.
pub fn join_origin(origin: &str, path: &str) -> String {
    format!("{}/{}", trim_trailing(origin, SEPARATORS), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_directives_are_fresh() {
        let mut a = default_directives();
        append_directive("script-src https://js.example.com/a.js", &mut a);

        let b = default_directives();
        assert_eq!(a.len(), DEFAULT_DIRECTIVES.len() + 1);
        assert_eq!(b.len(), DEFAULT_DIRECTIVES.len());
    }

    #[test]
    fn test_baseline_has_no_source_lists_we_add() {
        let list = default_directives();
        for name in ["script-src", "frame-src", "connect-src"] {
            assert_eq!(list.named(name).count(), 0);
        }
    }

    #[test]
    fn test_header_value_join() {
        let mut list = CspDirectives::new();
        list.push("a");
        list.push("b c");
        assert_eq!(list.to_header_value(), "a; b c");
        assert_eq!(list.to_string(), "a; b c");
    }

    #[test]
    fn test_parse_policy() {
        let value = default_directives().to_header_value();
        assert_eq!(parse_policy(&value), DEFAULT_DIRECTIVES.to_vec());
    }

    #[test]
    fn test_replace_index() {
        assert_eq!(replace_index("/a/index.html", "/s.js"), "/a/s.js");
        assert_eq!(replace_index("/index.html", "/s.js"), "/s.js");
        assert_eq!(replace_index("/a/index.html/b", "/s.js"), "/a/index.html/b");
        assert_eq!(replace_index("/a/", "/s.js"), "/a/");
    }

    #[test]
    fn test_join_origin() {
        assert_eq!(join_origin("https://js.example.com/", "a/b.js"), "https://js.example.com/a/b.js");
        assert_eq!(join_origin("https://js.example.com", ""), "https://js.example.com/");
    }

    proptest! {
        #[test]
        fn prop_join_then_parse_preserves_order(items in prop::collection::vec("[a-z-]{1,8} [a-z:/.]{1,12}", 0..6)) {
            let mut list = CspDirectives::new();
            for item in &items {
                list.push(item.clone());
            }
            let value = list.to_header_value();
            let parsed: Vec<String> = parse_policy(&value).into_iter().map(String::from).collect();
            prop_assert_eq!(parsed, items);
        }
    }
}

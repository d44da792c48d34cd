//! One-sided trimming of origin and path strings.

/// Path separator class.
pub const SEPARATORS: &[char] = &['/'];

/// Strip the leading run of characters in `class`.
///
/// An empty class strips whitespace. Interior characters are never touched.
pub fn trim_leading<'a>(s: &'a str, class: &[char]) -> &'a str {
    if class.is_empty() {
        s.trim_start()
    } else {
        s.trim_start_matches(class)
    }
}

/// Strip the trailing run of characters in `class`.
///
/// An empty class strips whitespace. Interior characters are never touched.
pub fn trim_trailing<'a>(s: &'a str, class: &[char]) -> &'a str {
    if class.is_empty() {
        s.trim_end()
    } else {
        s.trim_end_matches(class)
    }
}

/// Strip the class from both ends.
pub fn trim_both<'a>(s: &'a str, class: &[char]) -> &'a str {
    trim_trailing(trim_leading(s, class), class)
}

//! Header map in the edge platform's representation.
//!
//! The platform delivers headers as a map from lower-case header name to a
//! list of `{key, value}` records, where `key` carries the display-cased
//! name. Every header written through [`HeaderMap::set`] follows that
//! contract with exactly one record; headers that are never touched
//! round-trip unchanged.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single header record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    /// Display-cased header name (e.g., "Content-Type").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Header value.
    pub value: String,
}

impl HeaderEntry {
    /// Create a header record with a display name.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }

    /// Create a header record without a display name.
    pub fn value_only(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }
}

/// Headers keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap(BTreeMap<String, Vec<HeaderEntry>>);

impl HeaderMap {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing every previous record for the same name.
    ///
    /// `key` is the display-cased name; the map key is its lower-case form.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0
            .insert(key.to_ascii_lowercase(), vec![HeaderEntry::new(key, value)]);
    }

    /// Insert raw records under an exact map key.
    pub fn insert_raw(&mut self, name: impl Into<String>, entries: Vec<HeaderEntry>) {
        self.0.insert(name.into(), entries);
    }

    /// Get the records stored under an exact map key.
    ///
    /// The lookup is case-sensitive: the edge platform already normalizes
    /// names, so callers decide which spellings they accept.
    pub fn get(&self, name: &str) -> Option<&[HeaderEntry]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Get the first value stored under an exact map key.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|entries| entries.first())
            .map(|entry| entry.value.as_str())
    }

    /// Remove a header by exact map key.
    pub fn remove(&mut self, name: &str) -> Option<Vec<HeaderEntry>> {
        self.0.remove(name)
    }

    /// Number of header names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, records)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<HeaderEntry>> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = (&'a String, &'a Vec<HeaderEntry>);
    type IntoIter = btree_map::Iter<'a, String, Vec<HeaderEntry>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_lowercases_map_key() {
        let mut headers = HeaderMap::new();
        headers.set("X-Content-Type-Options", "nosniff");

        let entries = headers.get("x-content-type-options").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key.as_deref(), Some("X-Content-Type-Options"));
        assert_eq!(entries[0].value, "nosniff");
    }

    #[test]
    fn test_set_replaces_all_records() {
        let mut headers = HeaderMap::new();
        headers.insert_raw(
            "x-xss-protection",
            vec![HeaderEntry::value_only("0"), HeaderEntry::value_only("1")],
        );

        headers.set("X-XSS-Protection", "1; mode=block");

        assert_eq!(headers.get("x-xss-protection").unwrap().len(), 1);
        assert_eq!(headers.first_value("x-xss-protection"), Some("1; mode=block"));
    }

    #[test]
    fn test_get_is_case_sensitive() {
        let mut headers = HeaderMap::new();
        headers.insert_raw("HOST", vec![HeaderEntry::value_only("a.example.com")]);

        assert!(headers.get("host").is_none());
        assert_eq!(headers.first_value("HOST"), Some("a.example.com"));
    }

    #[test]
    fn test_untouched_headers_round_trip() {
        let json = r#"{"etag":[{"key":"ETag","value":"\"abc\""}],"x-amz-meta":[{"value":"1"},{"value":"2"}]}"#;
        let headers: HeaderMap = serde_json::from_str(json).unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(serde_json::to_string(&headers).unwrap(), json);
    }

    #[test]
    fn test_remove() {
        let mut headers = HeaderMap::new();
        headers.set("Content-Encoding", "gzip");

        assert!(headers.remove("content-encoding").is_some());
        assert!(headers.is_empty());
    }
}

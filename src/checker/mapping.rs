// src/checker/mapping.rs
// =============================================================================
// A small case-insensitive header map.
//
// HTTP header names are case-insensitive ("Content-Type" == "content-type"),
// but we still want to remember how a header was spelled when we saw it.
// reqwest's HeaderMap lowercases every name on the way in, so we keep our
// own list of (name, value) pairs and compare names case-insensitively on
// lookup instead of rewriting them.
//
// Rust concepts:
// - FromIterator: lets us build the map with .collect()
// - impl Into<String>: accept both &str and String arguments
// =============================================================================

use reqwest::header::HeaderMap;

// Ordered (name, value) pairs with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    entries: Vec<(String, String)>,
}

impl HeaderMapping {
    pub fn new() -> Self {
        Self::default()
    }

    // Inserts a header, replacing the value of an existing header with the
    // same name (ignoring case). The first spelling of the name is kept.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Returns the raw value of a header, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    /// True when a header with this name exists, whatever its value.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    // Missing headers read as "" so rules can compare values without
    // caring whether the header was sent at all
    pub fn value_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Iterates over (name, value) pairs in the order they were inserted
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    // Converts response headers from reqwest
    //
    // A header that appears on several lines (e.g. two Cache-Control lines)
    // is folded into one value joined with ", ", which is how HTTP says
    // repeated headers should be combined.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let mut mapping = Self::new();

        for name in headers.keys() {
            let value = headers
                .get_all(name)
                .iter()
                // Non-UTF-8 bytes become U+FFFD, unlike an ISO-8859-1 decoding
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            mapping.insert(name.as_str(), value);
        }

        mapping
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (name, value) in iter {
            mapping.insert(name, value);
        }
        mapping
    }
}

impl From<&HeaderMap> for HeaderMapping {
    fn from(headers: &HeaderMap) -> Self {
        Self::from_header_map(headers)
    }
}

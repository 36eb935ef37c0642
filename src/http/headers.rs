//! HTTP headers handling
//!
//! Headers keep insertion order, compare names case-insensitively, and
//! allow a name to repeat.

use super::{Error, Result, MAX_HEADERS};
use std::fmt;

/// HTTP headers collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: Vec<(String, String)>,
}

impl Headers {
    /// Create a new empty headers collection
    pub fn new() -> Self {
        Headers {
            headers: Vec::new(),
        }
    }

    /// Append a header, keeping any existing value with the same name
    ///
    /// Headers past [`MAX_HEADERS`] are dropped.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        if self.headers.len() >= MAX_HEADERS {
            return;
        }
        self.headers.push((name.into(), value.into()));
    }

    /// Replace every value of `name` with a single value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.insert(name, value);
    }

    /// Get the first value for a header (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check if a header exists
    pub fn contains(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Check whether a comma-separated header carries `token`
    ///
    /// Used for `Connection: keep-alive, Upgrade` style values.
    pub fn has_token(&self, name: &str, token: &str) -> bool {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .flat_map(|(_, v)| v.split(','))
            .any(|t| t.trim().eq_ignore_ascii_case(token))
    }

    /// Remove all instances of a header (case-insensitive)
    pub fn remove(&mut self, name: &str) -> usize {
        let initial_len = self.headers.len();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        initial_len - self.headers.len()
    }

    /// Append every header from `other`
    pub fn extend(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn clear(&mut self) {
        self.headers.clear();
    }

    /// Iterate over all headers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parse a `Name: value` line
    pub fn parse_header_line(line: &str) -> Result<(String, String)> {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::InvalidHeader(format!("No colon in header: {}", line)))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidHeader("Empty header name".to_string()));
        }

        Ok((name.to_string(), value.trim().to_string()))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            writeln!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Encoding", "snappy");

        assert_eq!(headers.get("content-encoding"), Some("snappy"));
        assert_eq!(headers.get("CONTENT-ENCODING"), Some("snappy"));
        assert!(headers.contains("Content-encoding"));
        assert_eq!(headers.get("Content-Type"), None);
    }

    #[test]
    fn test_set_replaces_all_values() {
        let mut headers = Headers::new();
        headers.insert("User-Agent", "a");
        headers.insert("user-agent", "b");
        headers.set("User-Agent", "promwrite");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("User-Agent"), Some("promwrite"));
    }

    #[test]
    fn test_has_token() {
        let mut headers = Headers::new();
        headers.insert("Connection", "Keep-Alive, Upgrade");

        assert!(headers.has_token("connection", "keep-alive"));
        assert!(headers.has_token("Connection", "upgrade"));
        assert!(!headers.has_token("Connection", "close"));
    }

    #[test]
    fn test_extend_preserves_order() {
        let mut defaults = Headers::new();
        defaults.insert("Host", "example.com");
        defaults.insert("User-Agent", "promwrite");

        let mut headers = Headers::new();
        headers.insert("Content-Length", "4");
        headers.extend(&defaults);

        let collected: Vec<_> = headers.iter().collect();
        assert_eq!(
            collected,
            vec![
                ("Content-Length", "4"),
                ("Host", "example.com"),
                ("User-Agent", "promwrite"),
            ]
        );
    }

    #[test]
    fn test_parse_header_line() {
        let (name, value) = Headers::parse_header_line("Content-Type: text/plain").unwrap();
        assert_eq!(name, "Content-Type");
        assert_eq!(value, "text/plain");

        let (name, value) = Headers::parse_header_line("X-Custom:  a:b  ").unwrap();
        assert_eq!(name, "X-Custom");
        assert_eq!(value, "a:b");

        assert!(Headers::parse_header_line("Invalid").is_err());
        assert!(Headers::parse_header_line(": value").is_err());
    }

    #[test]
    fn test_max_headers() {
        let mut headers = Headers::new();
        for i in 0..MAX_HEADERS + 10 {
            headers.insert(format!("Header-{}", i), "value");
        }
        assert_eq!(headers.len(), MAX_HEADERS);
    }
}

//! Email header field map.

use crate::encoding::decode_rfc2047;
use std::collections::HashMap;

/// Collection of email headers keyed by canonical (lowercased) field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for a field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields
            .entry(name.into().to_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Sets a field, replacing any existing values.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields
            .insert(name.into().to_lowercase(), vec![value.into()]);
    }

    /// Returns the first raw value for a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// Returns every raw value for a field.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .get(&name.to_lowercase())
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the first value for a field with RFC 2047 encoded words
    /// decoded. A value that fails to decode is returned verbatim.
    #[must_use]
    pub fn decoded(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(|raw| decode_rfc2047(raw).unwrap_or_else(|_| raw.to_string()))
    }

    /// Returns true if no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of distinct field names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over all (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Parses headers from raw text.
    ///
    /// Continuation lines (starting with space or tab) are unfolded onto the
    /// preceding field. An empty line terminates the header block; anything
    /// after it is ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value.trim().to_string());
            }

            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, value.trim().to_string());
        }

        headers
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_headers() {
        let headers = Headers::parse("From: a@example.com\r\nSubject: hi\r\n");
        assert_eq!(headers.get("from"), Some("a@example.com"));
        assert_eq!(headers.get("Subject"), Some("hi"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn parse_unfolds_continuation_lines() {
        let headers = Headers::parse("Subject: a long\r\n subject line\r\n");
        assert_eq!(headers.get("subject"), Some("a long subject line"));
    }

    #[test]
    fn parse_stops_at_blank_line() {
        let headers = Headers::parse("From: a@example.com\r\n\r\nNot-A-Header: body\r\n");
        assert_eq!(headers.get("from"), Some("a@example.com"));
        assert_eq!(headers.get("not-a-header"), None);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn set_replaces_existing_values() {
        let mut headers = Headers::new();
        headers.add("to", "a@example.com");
        headers.add("to", "b@example.com");
        assert_eq!(headers.get_all("to").len(), 2);

        headers.set("to", "c@example.com");
        assert_eq!(headers.get_all("to"), vec!["c@example.com"]);
    }

    #[test]
    fn decoded_applies_rfc2047() {
        let mut headers = Headers::new();
        headers.add("subject", "=?utf-8?B?SMOpbGxv?=");
        assert_eq!(headers.decoded("subject").unwrap(), "Héllo");
    }

    #[test]
    fn decoded_falls_back_to_raw_on_bad_data() {
        let mut headers = Headers::new();
        headers.add("subject", "=?utf-8?B?*bad*?=");
        assert_eq!(headers.decoded("subject").unwrap(), "=?utf-8?B?*bad*?=");
    }
}

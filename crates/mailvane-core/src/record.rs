//! Cached message header records.

use mailvane_mime::{ContentType, Headers};

/// The header subset fetched per message, plus the derived content subtype.
///
/// Values are stored as received; RFC 2047 encoded words are decoded on
/// access. A record is only meaningful within the index epoch that fetched
/// it: sequence numbers are renumbered on expunge, so records must never be
/// carried across a cache rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    fields: Headers,
    subtype: String,
}

impl HeaderRecord {
    /// Creates an empty record (the result of a failed or invalid fetch).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            fields: Headers::new(),
            subtype: "plain".to_string(),
        }
    }

    /// Builds a record from raw header bytes as returned by a
    /// `HEADER.FIELDS` fetch.
    #[must_use]
    pub fn from_header_bytes(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let fields = Headers::parse(&text);

        let subtype = fields
            .get("content-type")
            .and_then(|raw| ContentType::parse(raw).ok())
            .map_or_else(|| "plain".to_string(), |ct| ct.sub_type);

        Self { fields, subtype }
    }

    /// True when the record holds no fields (failed fetch).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decoded From header, or empty.
    #[must_use]
    pub fn from_address(&self) -> String {
        self.fields.decoded("from").unwrap_or_default()
    }

    /// Decoded To header, or empty.
    #[must_use]
    pub fn to_address(&self) -> String {
        self.fields.decoded("to").unwrap_or_default()
    }

    /// Decoded Subject header, or empty.
    #[must_use]
    pub fn subject(&self) -> String {
        self.fields.decoded("subject").unwrap_or_default()
    }

    /// Raw Date header, or empty.
    #[must_use]
    pub fn date(&self) -> String {
        self.fields.get("date").unwrap_or_default().to_string()
    }

    /// Content subtype derived from the Content-Type header ("plain" when
    /// absent or unparseable).
    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }
}

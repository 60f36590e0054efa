//! Display-safe header projection.
//!
//! Raw header values are unbounded and may contain characters a terminal or
//! widget toolkit cannot render. These normalizers turn them into short,
//! safe strings for the message list.

use crate::record::HeaderRecord;

/// Column width applied to every displayed field.
pub const DISPLAY_WIDTH: isize = 35;

/// Removes characters outside the Basic Multilingual Plane (code points
/// ≥ 65536) and nothing else.
#[must_use]
pub fn strip_non_bmp(raw: &str) -> String {
    raw.chars().filter(|c| (*c as u32) < 0x1_0000).collect()
}

/// Bounds a string to `max_length` characters, ellipsizing when it is
/// longer. A `max_length` of 0 or less is an explicit no-truncation
/// sentinel and returns the input unchanged.
#[must_use]
pub fn truncate(s: &str, max_length: isize) -> String {
    if max_length <= 0 {
        return s.to_string();
    }

    #[allow(clippy::cast_sign_loss)]
    let max = max_length as usize;
    if s.chars().count() <= max {
        return s.to_string();
    }

    if max <= 3 {
        return s.chars().take(max).collect();
    }

    let kept: String = s.chars().take(max - 3).collect();
    format!("{kept}...")
}

/// Reduces an address header to either the display name or the bare email.
///
/// With both angle brackets present, the part before `<` wins when it has
/// any alphanumeric character (left-trimmed only; a trailing space before
/// the bracket is preserved), otherwise the bracketed email is extracted.
/// Anything else passes through, and an empty value reads "No address".
#[must_use]
pub fn normalize_address(raw: &str) -> String {
    if raw.is_empty() {
        return "No address".to_string();
    }

    if raw.contains('<') && raw.contains('>') {
        let Some((name, email)) = raw.split_once('<') else {
            return raw.to_string();
        };

        if !name.chars().any(char::is_alphanumeric) {
            return email
                .split_once('>')
                .map_or(email, |(address, _)| address)
                .to_string();
        }

        return name.trim_start().to_string();
    }

    raw.to_string()
}

/// Returns the subject, or "No subject" when it is empty.
#[must_use]
pub fn normalize_subject(raw: &str) -> String {
    if raw.is_empty() {
        return "No subject".to_string();
    }
    raw.to_string()
}

/// Keeps the first four space-separated tokens of a date header, dropping
/// the time zone and anything after it. Shorter or malformed input is
/// rejoined as-is; no date validation happens here.
#[must_use]
pub fn normalize_date(raw: &str) -> String {
    raw.split(' ').take(4).collect::<Vec<_>>().join(" ")
}

/// The bounded, render-ready projection of a [`HeaderRecord`].
///
/// Never cached: recomputed from the record each time it is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayHeader {
    /// Sender, ellipsized.
    pub from_address: String,
    /// Subject, ellipsized, "No subject" when absent.
    pub subject: String,
    /// Date, first four tokens of the raw value.
    pub date: String,
    /// Recipient, same rules as the sender.
    pub to_address: String,
}

impl DisplayHeader {
    /// Projects a record through the strip → normalize → truncate pipeline.
    #[must_use]
    pub fn from_record(record: &HeaderRecord) -> Self {
        Self {
            from_address: truncate(
                &normalize_address(&strip_non_bmp(&record.from_address())),
                DISPLAY_WIDTH,
            ),
            subject: truncate(
                &normalize_subject(&strip_non_bmp(&record.subject())),
                DISPLAY_WIDTH,
            ),
            date: truncate(&normalize_date(&strip_non_bmp(&record.date())), DISPLAY_WIDTH),
            to_address: truncate(
                &normalize_address(&strip_non_bmp(&record.to_address())),
                DISPLAY_WIDTH,
            ),
        }
    }
}

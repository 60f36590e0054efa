//! Flattening raw messages into a single displayable payload.
//!
//! The client renders one text body per message. Multipart structure is not
//! preserved: the best text part wins and everything else (attachments,
//! images) is dropped.

use crate::content_type::ContentType;
use crate::encoding::{decode_base64, decode_quoted_printable};
use crate::header::Headers;

/// Maximum multipart nesting depth the flattener will descend.
const MAX_NESTING: usize = 4;

/// A message body reduced to one text payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedBody {
    /// Decoded body text.
    pub text: String,
    /// Subtype of the chosen text part ("plain", "html", ...).
    pub subtype: String,
}

impl FlattenedBody {
    fn empty() -> Self {
        Self {
            text: String::new(),
            subtype: "plain".to_string(),
        }
    }
}

/// Reduces a raw RFC 5322 message to a single text payload plus subtype.
///
/// Single-part messages are decoded according to their transfer encoding.
/// Multipart messages are searched for text parts, descending nested
/// multiparts up to a fixed depth; a `text/plain` part is preferred over
/// `text/html`, which is preferred over any other text subtype.
#[must_use]
pub fn flatten(raw: &[u8]) -> FlattenedBody {
    let message = String::from_utf8_lossy(raw);
    let (header_text, body) = split_headers_body(&message);
    let headers = Headers::parse(header_text);

    let mut parts = Vec::new();
    collect_text_parts(&headers, body, 0, &mut parts);

    let chosen = parts
        .iter()
        .position(|(subtype, _)| subtype == "plain")
        .or_else(|| parts.iter().position(|(subtype, _)| subtype == "html"))
        .or(if parts.is_empty() { None } else { Some(0) });

    chosen.map_or_else(FlattenedBody::empty, |i| {
        let (subtype, text) = parts.swap_remove(i);
        FlattenedBody { text, subtype }
    })
}

/// Walks one body section, recursing into multiparts.
fn collect_text_parts(headers: &Headers, body: &str, depth: usize, out: &mut Vec<(String, String)>) {
    let content_type = headers
        .get("content-type")
        .and_then(|raw| ContentType::parse(raw).ok())
        .unwrap_or_else(ContentType::text_plain);

    if content_type.is_multipart() && depth < MAX_NESTING {
        if let Some(boundary) = content_type.boundary() {
            for part in split_multipart(body, boundary) {
                let (part_header_text, part_body) = split_headers_body(part);
                let part_headers = Headers::parse(part_header_text);
                collect_text_parts(&part_headers, part_body, depth + 1, out);
            }
        }
        return;
    }

    if content_type.is_text() {
        out.push((content_type.sub_type, transfer_decode(body, headers)));
    }
}

/// Splits a message into header text and body at the first blank line.
fn split_headers_body(message: &str) -> (&str, &str) {
    if let Some(idx) = message.find("\r\n\r\n") {
        (&message[..idx], &message[idx + 4..])
    } else if let Some(idx) = message.find("\n\n") {
        (&message[..idx], &message[idx + 2..])
    } else {
        (message, "")
    }
}

/// Splits a multipart body into its parts using the boundary delimiter.
fn split_multipart<'a>(body: &'a str, boundary: &str) -> Vec<&'a str> {
    let delimiter = format!("--{boundary}");
    let mut parts = Vec::new();

    for segment in body.split(&delimiter) {
        let trimmed = segment.trim();
        // Preamble, epilogue, and the closing "--" marker carry no part data
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        parts.push(trimmed);
    }

    parts
}

/// Decodes a part body according to its Content-Transfer-Encoding.
fn transfer_decode(body: &str, headers: &Headers) -> String {
    let encoding = headers
        .get("content-transfer-encoding")
        .unwrap_or("7bit")
        .trim()
        .to_lowercase();

    match encoding.as_str() {
        "base64" => {
            let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
            decode_base64(&cleaned).map_or_else(
                |_| body.to_string(),
                |bytes| String::from_utf8_lossy(&bytes).into_owned(),
            )
        }
        "quoted-printable" => decode_quoted_printable(body).unwrap_or_else(|_| body.to_string()),
        _ => body.to_string(),
    }
}

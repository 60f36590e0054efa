//! Transfer and header encodings.
//!
//! Base64, Quoted-Printable (RFC 2045), and encoded-word header values
//! (RFC 2047).

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Maximum output line length for Quoted-Printable encoding.
const MAX_LINE_LENGTH: usize = 76;

/// Encodes text using Quoted-Printable encoding (RFC 2045).
#[must_use]
pub fn encode_quoted_printable(text: &str) -> String {
    let mut result = String::new();
    let mut line_length = 0;

    for byte in text.as_bytes() {
        if line_length >= MAX_LINE_LENGTH - 3 {
            result.push_str("=\r\n");
            line_length = 0;
        }

        match byte {
            // Printable ASCII except '='
            b'!'..=b'<' | b'>'..=b'~' => {
                result.push(*byte as char);
                line_length += 1;
            }
            b' ' => {
                // A space may not end an encoded line
                if line_length >= MAX_LINE_LENGTH - 1 {
                    result.push_str("=20");
                    line_length += 3;
                } else {
                    result.push(' ');
                    line_length += 1;
                }
            }
            _ => {
                result.push('=');
                let _ = write!(result, "{byte:02X}");
                line_length += 3;
            }
        }
    }

    result
}

/// Decodes Quoted-Printable text (RFC 2045).
///
/// # Errors
///
/// Returns an error on a truncated or non-hex escape sequence, or if the
/// decoded bytes are not valid UTF-8.
pub fn decode_quoted_printable(text: &str) -> Result<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'=' {
            // Soft line break: "=\r\n" or "=\n"
            if bytes.get(i + 1) == Some(&b'\r') && bytes.get(i + 2) == Some(&b'\n') {
                i += 3;
                continue;
            }
            if bytes.get(i + 1) == Some(&b'\n') {
                i += 2;
                continue;
            }

            let hex = bytes.get(i + 1..i + 3).ok_or_else(|| {
                Error::InvalidEncoding("truncated quoted-printable escape".to_string())
            })?;
            let hex = std::str::from_utf8(hex)
                .map_err(|_| Error::InvalidEncoding("non-ASCII escape digits".to_string()))?;
            let value = u8::from_str_radix(hex, 16)
                .map_err(|_| Error::InvalidEncoding(format!("invalid escape: ={hex}")))?;
            out.push(value);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).map_err(Into::into)
}

/// Encodes a header value as an RFC 2047 encoded word when needed.
///
/// Plain ASCII values that cannot be mistaken for an encoded word pass
/// through unchanged.
#[must_use]
pub fn encode_rfc2047(text: &str, charset: &str) -> String {
    if text.is_ascii() && !text.contains("=?") {
        return text.to_string();
    }

    format!("=?{charset}?B?{}?=", encode_base64(text.as_bytes()))
}

/// Decodes RFC 2047 encoded words in a header value.
///
/// Handles any number of `=?charset?enc?data?=` words mixed with plain
/// text. Whitespace between two adjacent encoded words is transparent, as
/// the RFC requires. Tokens that merely resemble encoded words are kept
/// verbatim. Decoded bytes are interpreted as UTF-8.
///
/// # Errors
///
/// Returns an error if a well-formed encoded word carries an unknown
/// encoding or data that fails to decode.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    if !text.contains("=?") {
        return Ok(text.to_string());
    }

    let mut pieces: Vec<String> = Vec::new();
    let mut prev_encoded = false;

    for token in text.split(' ') {
        match try_decode_encoded_word(token) {
            Some(decoded) => {
                let decoded = decoded?;
                if prev_encoded {
                    if let Some(last) = pieces.last_mut() {
                        last.push_str(&decoded);
                    }
                } else {
                    pieces.push(decoded);
                }
                prev_encoded = true;
            }
            None => {
                pieces.push(token.to_string());
                prev_encoded = false;
            }
        }
    }

    Ok(pieces.join(" "))
}

/// Decodes one `=?charset?enc?data?=` token, or `None` if the token is not
/// shaped like an encoded word.
fn try_decode_encoded_word(token: &str) -> Option<Result<String>> {
    let inner = token.strip_prefix("=?")?.strip_suffix("?=")?;

    let mut parts = inner.splitn(3, '?');
    let _charset = parts.next()?;
    let encoding = parts.next()?;
    let payload = parts.next()?;

    Some(match encoding.to_ascii_uppercase().as_str() {
        "B" => decode_base64(payload).and_then(|b| String::from_utf8(b).map_err(Into::into)),
        "Q" => decode_quoted_printable(&payload.replace('_', " ")),
        _ => Err(Error::InvalidEncoding(format!(
            "unknown encoded-word encoding: {encoding}"
        ))),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip() {
        let data = b"Hello, World!";
        let encoded = encode_base64(data);
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");
        assert_eq!(decode_base64(&encoded).unwrap(), data);
    }

    #[test]
    fn quoted_printable_encode_ascii_passthrough() {
        assert_eq!(encode_quoted_printable("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn quoted_printable_encode_non_ascii() {
        let encoded = encode_quoted_printable("Héllo");
        assert!(encoded.contains("=C3"));
    }

    #[test]
    fn quoted_printable_decode() {
        assert_eq!(decode_quoted_printable("H=C3=A9llo").unwrap(), "Héllo");
    }

    #[test]
    fn quoted_printable_soft_line_break() {
        assert_eq!(decode_quoted_printable("Hello=\r\nWorld").unwrap(), "HelloWorld");
        assert_eq!(decode_quoted_printable("Hello=\nWorld").unwrap(), "HelloWorld");
    }

    #[test]
    fn quoted_printable_rejects_truncated_escape() {
        assert!(decode_quoted_printable("oops=4").is_err());
    }

    #[test]
    fn rfc2047_encode_only_when_needed() {
        assert_eq!(encode_rfc2047("Hello", "utf-8"), "Hello");

        let encoded = encode_rfc2047("Héllo", "utf-8");
        assert!(encoded.starts_with("=?utf-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    #[test]
    fn rfc2047_decode_base64_word() {
        assert_eq!(decode_rfc2047("=?utf-8?B?SMOpbGxv?=").unwrap(), "Héllo");
    }

    #[test]
    fn rfc2047_decode_q_word() {
        assert_eq!(decode_rfc2047("=?utf-8?Q?H=C3=A9llo?=").unwrap(), "Héllo");
        // Underscore means space in Q encoding
        assert_eq!(decode_rfc2047("=?utf-8?Q?a_b?=").unwrap(), "a b");
    }

    #[test]
    fn rfc2047_adjacent_words_join_without_space() {
        let decoded = decode_rfc2047("=?utf-8?B?SMOp?= =?utf-8?B?bGxv?=").unwrap();
        assert_eq!(decoded, "Héllo");
    }

    #[test]
    fn rfc2047_mixed_plain_and_encoded() {
        let decoded = decode_rfc2047("Re: =?utf-8?B?SMOpbGxv?= again").unwrap();
        assert_eq!(decoded, "Re: Héllo again");
    }

    #[test]
    fn rfc2047_plain_value_unchanged() {
        assert_eq!(decode_rfc2047("plain subject").unwrap(), "plain subject");
    }

    #[test]
    fn rfc2047_round_trip() {
        let original = "Héllo Wørld";
        let encoded = encode_rfc2047(original, "utf-8");
        assert_eq!(decode_rfc2047(&encoded).unwrap(), original);
    }

    proptest::proptest! {
        #[test]
        fn quoted_printable_round_trips(s in proptest::prelude::any::<String>()) {
            let encoded = encode_quoted_printable(&s);
            proptest::prop_assert_eq!(decode_quoted_printable(&encoded).unwrap(), s);
        }

        #[test]
        fn rfc2047_round_trips(s in proptest::prelude::any::<String>()) {
            let encoded = encode_rfc2047(&s, "utf-8");
            proptest::prop_assert_eq!(decode_rfc2047(&encoded).unwrap(), s);
        }
    }
}

//! EHLO extension keywords.

/// An extension advertised in an EHLO reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// AUTH with the advertised mechanisms (uppercased).
    Auth(Vec<String>),
    /// 8BITMIME (RFC 6152).
    EightBitMime,
    /// PIPELINING (RFC 2920).
    Pipelining,
    /// SIZE with the optional maximum message size.
    Size(Option<usize>),
    /// SMTPUTF8 (RFC 6531).
    SmtpUtf8,
    /// Any other keyword, kept verbatim.
    Other(String),
}

impl Extension {
    /// Parses one EHLO reply line into an extension.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let keyword = words.next().unwrap_or_default().to_uppercase();

        match keyword.as_str() {
            "AUTH" => Self::Auth(words.map(str::to_uppercase).collect()),
            "8BITMIME" => Self::EightBitMime,
            "PIPELINING" => Self::Pipelining,
            "SIZE" => Self::Size(words.next().and_then(|n| n.parse().ok())),
            "SMTPUTF8" => Self::SmtpUtf8,
            _ => Self::Other(line.trim().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_auth_mechanisms() {
        assert_eq!(
            Extension::parse("AUTH PLAIN LOGIN"),
            Extension::Auth(vec!["PLAIN".to_string(), "LOGIN".to_string()])
        );
    }

    #[test]
    fn parses_size_with_limit() {
        assert_eq!(Extension::parse("SIZE 35882577"), Extension::Size(Some(35_882_577)));
        assert_eq!(Extension::parse("SIZE"), Extension::Size(None));
    }

    #[test]
    fn parses_bare_keywords() {
        assert_eq!(Extension::parse("8BITMIME"), Extension::EightBitMime);
        assert_eq!(Extension::parse("PIPELINING"), Extension::Pipelining);
        assert_eq!(Extension::parse("smtputf8"), Extension::SmtpUtf8);
    }

    #[test]
    fn unknown_keyword_is_kept() {
        assert_eq!(
            Extension::parse("DSN"),
            Extension::Other("DSN".to_string())
        );
    }
}

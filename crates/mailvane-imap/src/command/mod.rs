//! IMAP command builder.
//!
//! Types and serialization for the command subset this client speaks:
//! CAPABILITY, NOOP, LOGIN, LIST, SELECT, FETCH, LOGOUT.

mod tag_generator;

pub use tag_generator::TagGenerator;

use crate::types::{Mailbox, SeqNum};

/// An IMAP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// CAPABILITY command.
    Capability,
    /// NOOP command (keep-alive).
    Noop,
    /// LOGOUT command.
    Logout,
    /// LOGIN command.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// LIST command.
    List {
        /// Reference name.
        reference: String,
        /// Mailbox pattern.
        pattern: String,
    },
    /// SELECT command.
    Select {
        /// Mailbox to select.
        mailbox: Mailbox,
    },
    /// FETCH command for a single message.
    Fetch {
        /// Message sequence number.
        sequence: SeqNum,
        /// Items to fetch.
        items: FetchItems,
    },
}

/// What a FETCH should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItems {
    /// A header-field subset: `BODY.PEEK[HEADER.FIELDS (...)]`.
    ///
    /// PEEK keeps the fetch from setting `\Seen`.
    HeaderFields(Vec<String>),
    /// The complete message: `BODY.PEEK[]`.
    FullMessage,
}

impl Command {
    /// Serializes the command with the given tag to wire bytes.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');

        match self {
            Self::Capability => buf.extend_from_slice(b"CAPABILITY"),
            Self::Noop => buf.extend_from_slice(b"NOOP"),
            Self::Logout => buf.extend_from_slice(b"LOGOUT"),

            Self::Login { username, password } => {
                buf.extend_from_slice(b"LOGIN ");
                write_astring(&mut buf, username);
                buf.push(b' ');
                write_astring(&mut buf, password);
            }

            Self::List { reference, pattern } => {
                buf.extend_from_slice(b"LIST ");
                write_astring(&mut buf, reference);
                buf.push(b' ');
                write_astring(&mut buf, pattern);
            }

            Self::Select { mailbox } => {
                buf.extend_from_slice(b"SELECT ");
                write_astring(&mut buf, mailbox.as_str());
            }

            Self::Fetch { sequence, items } => {
                buf.extend_from_slice(format!("FETCH {sequence} ").as_bytes());
                write_fetch_items(&mut buf, items);
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

/// Writes an astring (atom, or quoted string when quoting is needed).
fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if s.is_empty() || s.bytes().any(needs_quoting) {
        buf.push(b'"');
        for b in s.bytes() {
            if b == b'"' || b == b'\\' {
                buf.push(b'\\');
            }
            buf.push(b);
        }
        buf.push(b'"');
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
}

/// Returns true if the byte forces quoted-string syntax.
const fn needs_quoting(b: u8) -> bool {
    matches!(b, b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*') || b < 0x20 || b == 0x7F
}

/// Writes the FETCH item list.
fn write_fetch_items(buf: &mut Vec<u8>, items: &FetchItems) {
    match items {
        FetchItems::HeaderFields(fields) => {
            buf.extend_from_slice(b"(BODY.PEEK[HEADER.FIELDS (");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                buf.extend_from_slice(field.to_uppercase().as_bytes());
            }
            buf.extend_from_slice(b")])");
        }
        FetchItems::FullMessage => buf.extend_from_slice(b"(BODY.PEEK[])"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn login_serialization() {
        let cmd = Command::Login {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(cmd.serialize("A0001"), b"A0001 LOGIN user pass\r\n");
    }

    #[test]
    fn login_quotes_when_needed() {
        let cmd = Command::Login {
            username: "user@example.com".to_string(),
            password: "p a\"ss".to_string(),
        };
        assert_eq!(
            cmd.serialize("A0001"),
            b"A0001 LOGIN user@example.com \"p a\\\"ss\"\r\n"
        );
    }

    #[test]
    fn list_serialization() {
        let cmd = Command::List {
            reference: String::new(),
            pattern: "*".to_string(),
        };
        assert_eq!(cmd.serialize("A0002"), b"A0002 LIST \"\" \"*\"\r\n");
    }

    #[test]
    fn select_quotes_spaced_names() {
        let cmd = Command::Select {
            mailbox: Mailbox::new("Sent Items"),
        };
        assert_eq!(cmd.serialize("A0003"), b"A0003 SELECT \"Sent Items\"\r\n");
    }

    #[test]
    fn fetch_header_fields() {
        let cmd = Command::Fetch {
            sequence: SeqNum::new(42).unwrap(),
            items: FetchItems::HeaderFields(vec![
                "Subject".to_string(),
                "From".to_string(),
                "To".to_string(),
                "Date".to_string(),
                "Content-Type".to_string(),
            ]),
        };
        assert_eq!(
            cmd.serialize("A0004"),
            b"A0004 FETCH 42 (BODY.PEEK[HEADER.FIELDS (SUBJECT FROM TO DATE CONTENT-TYPE)])\r\n"
                .as_slice()
        );
    }

    #[test]
    fn fetch_full_message() {
        let cmd = Command::Fetch {
            sequence: SeqNum::new(1).unwrap(),
            items: FetchItems::FullMessage,
        };
        assert_eq!(cmd.serialize("A0005"), b"A0005 FETCH 1 (BODY.PEEK[])\r\n");
    }

    #[test]
    fn bare_commands() {
        assert_eq!(Command::Noop.serialize("A1"), b"A1 NOOP\r\n");
        assert_eq!(Command::Logout.serialize("A2"), b"A2 LOGOUT\r\n");
        assert_eq!(Command::Capability.serialize("A3"), b"A3 CAPABILITY\r\n");
    }
}

//! SMTP command builder.

use crate::types::Address;

/// An SMTP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - extended greeting.
    Ehlo {
        /// Client hostname.
        hostname: String,
    },
    /// AUTH - begin authentication.
    Auth {
        /// SASL mechanism name (e.g., "PLAIN").
        mechanism: String,
        /// Initial response (SASL-IR).
        initial_response: Option<String>,
    },
    /// MAIL FROM - start a mail transaction.
    MailFrom {
        /// Sender envelope address.
        from: Address,
    },
    /// RCPT TO - add a recipient.
    RcptTo {
        /// Recipient envelope address.
        to: Address,
    },
    /// DATA - begin message content.
    Data,
    /// QUIT - close the connection.
    Quit,
}

impl Command {
    /// Serializes the command to wire bytes (CRLF-terminated).
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Self::Ehlo { hostname } => {
                buf.extend_from_slice(b"EHLO ");
                buf.extend_from_slice(hostname.as_bytes());
            }
            Self::Auth {
                mechanism,
                initial_response,
            } => {
                buf.extend_from_slice(b"AUTH ");
                buf.extend_from_slice(mechanism.as_bytes());
                if let Some(resp) = initial_response {
                    buf.push(b' ');
                    buf.extend_from_slice(resp.as_bytes());
                }
            }
            Self::MailFrom { from } => {
                buf.extend_from_slice(b"MAIL FROM:<");
                buf.extend_from_slice(from.as_str().as_bytes());
                buf.push(b'>');
            }
            Self::RcptTo { to } => {
                buf.extend_from_slice(b"RCPT TO:<");
                buf.extend_from_slice(to.as_str().as_bytes());
                buf.push(b'>');
            }
            Self::Data => buf.extend_from_slice(b"DATA"),
            Self::Quit => buf.extend_from_slice(b"QUIT"),
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

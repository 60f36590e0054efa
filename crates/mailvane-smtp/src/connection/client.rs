//! Type-state SMTP client.

use super::stream::SmtpStream;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Extension, Reply, ReplyCode};
use base64::Engine;
use std::collections::HashSet;
use std::marker::PhantomData;
use tracing::debug;

/// Type-state marker for the connected (pre-auth) state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for the authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker for an open mail transaction.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for a transaction with at least one recipient.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

/// What the server told us about itself at greeting/EHLO time.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    /// Hostname from the greeting line.
    pub hostname: String,
    /// Extensions advertised in the EHLO reply.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Returns true if the server advertises AUTH PLAIN.
    #[must_use]
    pub fn supports_auth_plain(&self) -> bool {
        self.extensions.iter().any(|ext| {
            matches!(ext, Extension::Auth(mechanisms)
                if mechanisms.iter().any(|m| m == "PLAIN"))
        })
    }

    /// Returns the advertised SIZE limit, if any.
    #[must_use]
    pub fn size_limit(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(limit) => *limit,
            _ => None,
        })
    }
}

/// SMTP client whose type parameter tracks the protocol state.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

impl<S> Client<S> {
    /// Returns the server information collected so far.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    fn transition<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        let data = cmd.serialize();
        self.stream.write_all(&data).await?;
        let reply = Self::read_reply(&mut self.stream).await?;
        debug!(code = reply.code.as_u16(), "smtp reply");
        Ok(reply)
    }

    async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = stream.read_line().await?;
            if line.is_empty() {
                continue;
            }

            let is_last = is_last_reply_line(&line);
            lines.push(line);

            if is_last {
                break;
            }
        }

        parse_reply(&lines)
    }

    /// Sends QUIT and closes the connection (valid in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT exchange fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;

        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(Error::smtp(reply.code.as_u16(), reply.message_text()));
        }

        Ok(())
    }
}

impl Client<Connected> {
    /// Creates a client from a connected stream and reads the greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be read or is not a 220.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = Self::read_reply(&mut stream).await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(Error::smtp(greeting.code.as_u16(), greeting.message_text()));
        }

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                extensions: HashSet::new(),
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let reply = self
            .send_command(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?;

        if !reply.is_success() {
            return Err(Error::smtp(reply.code.as_u16(), reply.message_text()));
        }

        // First line repeats the greeting; the rest are extension keywords
        self.server_info.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();

        Ok(self)
    }

    /// Authenticates with the PLAIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the credentials.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        let credentials = format!("\0{username}\0{password}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());

        let reply = self
            .send_command(Command::Auth {
                mechanism: "PLAIN".to_string(),
                initial_response: Some(encoded),
            })
            .await?;

        if !reply.is_success() {
            return Err(Error::smtp(reply.code.as_u16(), reply.message_text()));
        }

        Ok(self.transition())
    }
}

impl Client<Authenticated> {
    /// Starts a mail transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(
        mut self,
        from: crate::types::Address,
    ) -> Result<Client<MailTransaction>> {
        let reply = self.send_command(Command::MailFrom { from }).await?;

        if !reply.is_success() {
            return Err(Error::smtp(reply.code.as_u16(), reply.message_text()));
        }

        Ok(self.transition())
    }
}

impl Client<MailTransaction> {
    /// Adds the first recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: crate::types::Address) -> Result<Client<RecipientAdded>> {
        let reply = self.send_command(Command::RcptTo { to }).await?;

        if !reply.is_success() {
            return Err(Error::smtp(reply.code.as_u16(), reply.message_text()));
        }

        Ok(self.transition())
    }
}

impl Client<RecipientAdded> {
    /// Adds another recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: crate::types::Address) -> Result<Self> {
        let reply = self.send_command(Command::RcptTo { to }).await?;

        if !reply.is_success() {
            return Err(Error::smtp(reply.code.as_u16(), reply.message_text()));
        }

        Ok(self)
    }

    /// Begins sending message content.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not accept DATA.
    pub async fn data(mut self) -> Result<Client<Data>> {
        let reply = self.send_command(Command::Data).await?;

        if reply.code != ReplyCode::START_DATA {
            return Err(Error::smtp(reply.code.as_u16(), reply.message_text()));
        }

        Ok(self.transition())
    }
}

impl Client<Data> {
    /// Sends the message content and completes the transaction.
    ///
    /// Line endings are normalized to CRLF, leading dots are stuffed, and
    /// the terminating `.` line is appended. On success the connection is
    /// back in the authenticated state and can start another transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails or the server rejects the message.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Authenticated>> {
        let payload = dot_stuff(message);
        self.stream.write_all(&payload).await?;
        self.stream.write_all(b".\r\n").await?;

        let reply = Self::read_reply(&mut self.stream).await?;

        if !reply.is_success() {
            return Err(Error::smtp(reply.code.as_u16(), reply.message_text()));
        }

        Ok(self.transition())
    }
}

/// Normalizes line endings to CRLF and byte-stuffs leading dots (RFC 5321
/// §4.5.2). The result always ends with CRLF so the terminator can follow.
fn dot_stuff(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 16);

    for line in message.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }

    // A trailing newline in the input produces one empty line too many
    if message.ends_with(b"\n") {
        out.truncate(out.len() - 2);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_stuff_normalizes_line_endings() {
        assert_eq!(dot_stuff(b"a\nb"), b"a\r\nb\r\n");
        assert_eq!(dot_stuff(b"a\r\nb"), b"a\r\nb\r\n");
    }

    #[test]
    fn dot_stuff_escapes_leading_dots() {
        assert_eq!(dot_stuff(b".hidden\nsafe."), b"..hidden\r\nsafe.\r\n");
    }

    #[test]
    fn dot_stuff_keeps_single_trailing_newline() {
        assert_eq!(dot_stuff(b"a\n"), b"a\r\n");
        assert_eq!(dot_stuff(b"a"), b"a\r\n");
    }

    #[test]
    fn server_info_auth_detection() {
        let mut extensions = HashSet::new();
        extensions.insert(Extension::Auth(vec!["PLAIN".to_string()]));
        let info = ServerInfo {
            hostname: "smtp.example.com".to_string(),
            extensions,
        };
        assert!(info.supports_auth_plain());
        assert_eq!(info.size_limit(), None);
    }
}

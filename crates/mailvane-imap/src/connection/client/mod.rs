//! Type-state IMAP client connection.
//!
//! The type parameter tracks the protocol state so only legal operations
//! are available:
//!
//! - `NotAuthenticated`: after the greeting
//! - `Authenticated`: after LOGIN
//! - `Selected`: after SELECT
//!
//! LOGIN and SELECT consume the client and return it in its new state.

mod authenticated;
mod not_authenticated;
mod selected;
mod states;

use std::marker::PhantomData;

use tokio::io::{AsyncRead, AsyncWrite};

pub use self::states::{Authenticated, NotAuthenticated, Selected};
use super::framed::FramedStream;
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseParser, Status, UntaggedResponse};
use crate::{Error, Result};

/// IMAP client connection with type-state.
pub struct Client<S, State> {
    pub(crate) stream: FramedStream<S>,
    pub(crate) tag_gen: TagGenerator,
    pub(crate) capabilities: Vec<String>,
    _state: PhantomData<State>,
}

impl<S, State> std::fmt::Debug for Client<S, State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("tag_gen", &self.tag_gen)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the server capabilities as last advertised.
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Checks a capability by name (case-insensitive).
    #[must_use]
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(capability))
    }

    /// Sends a NOOP to keep the connection alive.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn noop(&mut self) -> Result<()> {
        let tag = self.tag_gen.next();
        self.stream
            .write_command(&Command::Noop.serialize(&tag))
            .await?;

        let responses = self.stream.read_until_tagged(&tag).await?;
        Self::check_tagged_ok(&responses, &tag)
    }

    /// Sends a CAPABILITY command and refreshes the stored capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn capability(&mut self) -> Result<Vec<String>> {
        let tag = self.tag_gen.next();
        self.stream
            .write_command(&Command::Capability.serialize(&tag))
            .await?;

        let responses = self.stream.read_until_tagged(&tag).await?;
        self.harvest_capabilities(&responses);
        Self::check_tagged_ok(&responses, &tag)?;
        Ok(self.capabilities.clone())
    }

    /// Sends LOGOUT and drops the connection (valid in any state).
    ///
    /// The server's BYE/tagged reply is awaited but not required; a failure
    /// to read it still counts as logged out.
    ///
    /// # Errors
    ///
    /// Returns an error only if the LOGOUT command cannot be written.
    pub async fn logout(mut self) -> Result<()> {
        let tag = self.tag_gen.next();
        self.stream
            .write_command(&Command::Logout.serialize(&tag))
            .await?;

        let _ = self.stream.read_until_tagged(&tag).await;
        Ok(())
    }

    /// Rebuilds the client in a different type-state.
    pub(crate) fn into_state<T>(self) -> Client<S, T> {
        Client {
            stream: self.stream,
            tag_gen: self.tag_gen,
            capabilities: self.capabilities,
            _state: PhantomData,
        }
    }

    /// Creates a client from its parts (greeting already consumed).
    pub(crate) fn from_parts(stream: FramedStream<S>, capabilities: Vec<String>) -> Self {
        Self {
            stream,
            tag_gen: TagGenerator::default(),
            capabilities,
            _state: PhantomData,
        }
    }

    /// Updates stored capabilities from any response that carried them.
    pub(crate) fn harvest_capabilities(&mut self, responses: &[Vec<u8>]) {
        for response_bytes in responses {
            match ResponseParser::parse(response_bytes) {
                Ok(Response::Untagged(UntaggedResponse::Capability(caps)))
                | Ok(Response::Untagged(UntaggedResponse::Condition {
                    capabilities: caps,
                    ..
                }))
                | Ok(Response::Tagged {
                    capabilities: caps, ..
                }) if !caps.is_empty() => {
                    self.capabilities = caps;
                }
                _ => {}
            }
        }
    }

    /// Checks that the response tagged with `tag` completed with OK.
    pub(crate) fn check_tagged_ok(responses: &[Vec<u8>], tag: &str) -> Result<()> {
        for response_bytes in responses.iter().rev() {
            if let Ok(Response::Tagged {
                tag: resp_tag,
                status,
                text,
                ..
            }) = ResponseParser::parse(response_bytes)
                && resp_tag.as_str() == tag
            {
                return match status {
                    Status::Ok | Status::PreAuth => Ok(()),
                    Status::No => Err(Error::No(text)),
                    Status::Bad => Err(Error::Bad(text)),
                    Status::Bye => Err(Error::Bye(text)),
                };
            }
        }

        Err(Error::Protocol("missing tagged response".to_string()))
    }

    /// Runs one command round-trip and returns the collected responses.
    pub(crate) async fn exchange(&mut self, command: &Command) -> Result<(String, Vec<Vec<u8>>)> {
        let tag = self.tag_gen.next();
        tracing::trace!(%tag, "dispatching command");
        self.stream.write_command(&command.serialize(&tag)).await?;
        let responses = self.stream.read_until_tagged(&tag).await?;
        Ok((tag, responses))
    }
}

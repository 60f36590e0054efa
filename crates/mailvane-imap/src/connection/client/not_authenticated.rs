//! Implementation for the not-authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::Client;
use super::states::{Authenticated, NotAuthenticated};
use crate::command::Command;
use crate::connection::framed::FramedStream;
use crate::parser::{Response, ResponseParser, Status, UntaggedResponse};
use crate::{Error, Result};

impl<S> Client<S, NotAuthenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a client from a connected stream.
    ///
    /// Reads the server greeting and harvests any capabilities it carries.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be read, is malformed, or is
    /// a BYE.
    pub async fn from_stream(stream: S) -> Result<Self> {
        let mut framed = FramedStream::new(stream);

        let greeting = framed.read_response().await?;
        let response = ResponseParser::parse(&greeting)?;

        let capabilities = match response {
            Response::Untagged(UntaggedResponse::Condition {
                status: Status::Ok | Status::PreAuth,
                capabilities,
                ..
            }) => capabilities,
            Response::Untagged(UntaggedResponse::Condition {
                status: Status::Bye,
                text,
                ..
            }) => return Err(Error::Bye(text)),
            other => {
                return Err(Error::Protocol(format!("unexpected greeting: {other:?}")));
            }
        };

        Ok(Self::from_parts(framed, capabilities))
    }

    /// Authenticates with LOGIN.
    ///
    /// Consumes self and returns an authenticated client on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the server rejects the
    /// credentials.
    pub async fn login(mut self, username: &str, password: &str) -> Result<Client<S, Authenticated>> {
        let command = Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        let (tag, responses) = self.exchange(&command).await?;

        self.harvest_capabilities(&responses);
        Self::check_tagged_ok(&responses, &tag)?;

        Ok(self.into_state())
    }
}

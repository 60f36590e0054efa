//! Implementation for the authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::Client;
use super::states::{Authenticated, Selected};
use crate::command::Command;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{ListEntry, Mailbox, MailboxStatus};
use crate::Result;

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Lists mailboxes matching a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListEntry>> {
        let command = Command::List {
            reference: reference.to_string(),
            pattern: pattern.to_string(),
        };
        let (tag, responses) = self.exchange(&command).await?;

        let entries = collect_list_entries(&responses);
        Self::check_tagged_ok(&responses, &tag)?;
        Ok(entries)
    }

    /// Selects a mailbox.
    ///
    /// Consumes self and returns a selected client plus the mailbox status
    /// on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the mailbox cannot be
    /// selected.
    pub async fn select(mut self, mailbox: &str) -> Result<(Client<S, Selected>, MailboxStatus)> {
        let command = Command::Select {
            mailbox: Mailbox::new(mailbox),
        };
        let (tag, responses) = self.exchange(&command).await?;

        let status = collect_mailbox_status(&responses);
        Self::check_tagged_ok(&responses, &tag)?;

        Ok((self.into_state(), status))
    }
}

/// Extracts LIST entries from a response batch.
pub(super) fn collect_list_entries(responses: &[Vec<u8>]) -> Vec<ListEntry> {
    responses
        .iter()
        .filter_map(|bytes| match ResponseParser::parse(bytes) {
            Ok(Response::Untagged(UntaggedResponse::List(entry))) => Some(entry),
            _ => None,
        })
        .collect()
}

/// Extracts EXISTS/RECENT counts from SELECT responses.
pub(super) fn collect_mailbox_status(responses: &[Vec<u8>]) -> MailboxStatus {
    let mut status = MailboxStatus::default();

    for bytes in responses {
        match ResponseParser::parse(bytes) {
            Ok(Response::Untagged(UntaggedResponse::Exists(n))) => status.exists = n,
            Ok(Response::Untagged(UntaggedResponse::Recent(n))) => status.recent = n,
            _ => {}
        }
    }

    status
}

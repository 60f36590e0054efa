//! Implementation for the selected state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::authenticated::{collect_list_entries, collect_mailbox_status};
use super::Client;
use super::states::Selected;
use crate::command::{Command, FetchItems};
use crate::parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
use crate::types::{ListEntry, Mailbox, MailboxStatus, SeqNum};
use crate::Result;

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Selects a different mailbox, staying in the selected state.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the mailbox cannot be
    /// selected.
    pub async fn select(&mut self, mailbox: &str) -> Result<MailboxStatus> {
        let command = Command::Select {
            mailbox: Mailbox::new(mailbox),
        };
        let (tag, responses) = self.exchange(&command).await?;

        let status = collect_mailbox_status(&responses);
        Self::check_tagged_ok(&responses, &tag)?;
        Ok(status)
    }

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

    /// Fetches data for one message by sequence number.
    ///
    /// Returns the items of the FETCH response matching the requested
    /// sequence number; an empty vector means the server sent no data for
    /// it (e.g., the message no longer exists).
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn fetch(&mut self, sequence: SeqNum, items: FetchItems) -> Result<Vec<FetchItem>> {
        let command = Command::Fetch { sequence, items };
        let (tag, responses) = self.exchange(&command).await?;

        let mut fetched = Vec::new();
        for bytes in &responses {
            if let Ok(Response::Untagged(UntaggedResponse::Fetch { seq, items })) =
                ResponseParser::parse(bytes)
                && seq == sequence.get()
            {
                fetched.extend(items);
            }
        }

        Self::check_tagged_ok(&responses, &tag)?;
        Ok(fetched)
    }
}

//! Retrieval session facade.
//!
//! Owns the one IMAP connection of a logged-in session and absorbs every
//! transport or protocol failure into a boolean or empty result, logging a
//! warning instead of propagating. The UI layer branches on results, never
//! on errors.

use mailvane_imap::{
    Authenticated, Client, Config, FetchItem, FetchItems, ImapStream, NotAuthenticated, SeqNum,
    Selected, connect_tls,
};
use tracing::warn;

use crate::index::MailboxBackend;
use crate::record::HeaderRecord;

/// Header fields fetched per message for the list view.
pub const HEADER_FIELDS: [&str; 5] = ["Subject", "From", "To", "Date", "Content-Type"];

type AuthClient = Client<ImapStream, Authenticated>;
type SelectedClient = Client<ImapStream, Selected>;

/// Connection state of the facade.
enum SessionState {
    Disconnected,
    Authenticated(AuthClient),
    Selected(SelectedClient),
}

/// The retrieval side of a mail session: one connection, one user.
///
/// The connection handle is owned exclusively by this facade; an
/// unrecoverable failure drops it and the facade reads as disconnected.
pub struct MailboxSession {
    config: Config,
    state: SessionState,
}

impl MailboxSession {
    /// Creates a disconnected session facade for the given server.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            config: Config::new(host).with_port(port),
            state: SessionState::Disconnected,
        }
    }

    /// True once connected and authenticated.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !matches!(self.state, SessionState::Disconnected)
    }

    /// True once a mailbox is selected.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        matches!(self.state, SessionState::Selected(_))
    }

    /// Connects with TLS and logs in.
    ///
    /// Any existing connection is discarded first; a session restarts its
    /// state machine from scratch on reconnect.
    pub async fn connect_and_login(&mut self, username: &str, password: &str) -> bool {
        self.state = SessionState::Disconnected;

        match self.try_connect_and_login(username, password).await {
            Ok(client) => {
                self.state = SessionState::Authenticated(client);
                true
            }
            Err(error) => {
                warn!(host = %self.config.host, %error, "IMAP login failed");
                false
            }
        }
    }

    async fn try_connect_and_login(
        &self,
        username: &str,
        password: &str,
    ) -> mailvane_imap::Result<AuthClient> {
        let stream = connect_tls(&self.config).await?;
        let client = Client::<ImapStream, NotAuthenticated>::from_stream(stream).await?;
        client.login(username, password).await
    }

    /// Lists all mailbox names; empty on failure.
    pub async fn list_mailboxes(&mut self) -> Vec<String> {
        let result = match &mut self.state {
            SessionState::Authenticated(client) => client.list("", "*").await,
            SessionState::Selected(client) => client.list("", "*").await,
            SessionState::Disconnected => {
                warn!("mailbox listing requested while disconnected");
                return Vec::new();
            }
        };

        match result {
            Ok(entries) => entries
                .into_iter()
                .map(|entry| entry.mailbox.0)
                .collect(),
            Err(error) => {
                warn!(%error, "mailbox listing failed");
                Vec::new()
            }
        }
    }

    /// Selects a mailbox and returns the server's total message count.
    ///
    /// Returns 0 if the selection fails or the mailbox is empty. The count
    /// is authoritative: the index compares it against its epoch marker to
    /// decide whether cached records are still valid.
    pub async fn select_mailbox(&mut self, mailbox: &str) -> u32 {
        match std::mem::replace(&mut self.state, SessionState::Disconnected) {
            SessionState::Disconnected => {
                warn!(mailbox, "selection requested while disconnected");
                0
            }
            SessionState::Authenticated(client) => match client.select(mailbox).await {
                Ok((selected, status)) => {
                    self.state = SessionState::Selected(selected);
                    status.exists
                }
                Err(error) => {
                    // The client was consumed; the connection is gone
                    warn!(mailbox, %error, "mailbox selection failed");
                    0
                }
            },
            SessionState::Selected(mut client) => match client.select(mailbox).await {
                Ok(status) => {
                    self.state = SessionState::Selected(client);
                    status.exists
                }
                Err(error) => {
                    warn!(mailbox, %error, "mailbox selection failed");
                    self.state = SessionState::Selected(client);
                    0
                }
            },
        }
    }

    /// Fetches the header subset for one message of the selected mailbox.
    ///
    /// Returns an empty record for sequence number 0, when no mailbox is
    /// selected, or when the server returns no data.
    pub async fn fetch_headers(&mut self, sequence: u32) -> HeaderRecord {
        let Some(seq) = SeqNum::new(sequence) else {
            return HeaderRecord::empty();
        };
        let Some(client) = self.selected_client("header fetch") else {
            return HeaderRecord::empty();
        };

        let fields = HEADER_FIELDS.iter().map(ToString::to_string).collect();
        match client.fetch(seq, FetchItems::HeaderFields(fields)).await {
            Ok(items) => items
                .into_iter()
                .find_map(|item| match item {
                    FetchItem::Body {
                        data: Some(data), ..
                    } => Some(HeaderRecord::from_header_bytes(&data)),
                    _ => None,
                })
                .unwrap_or_else(HeaderRecord::empty),
            Err(error) => {
                warn!(sequence, %error, "header fetch failed");
                HeaderRecord::empty()
            }
        }
    }

    /// Fetches a full message and returns its flattened body text plus the
    /// detected subtype. Empty text (and "plain") on failure.
    pub async fn fetch_body(&mut self, sequence: u32) -> (String, String) {
        let empty = || (String::new(), "plain".to_string());

        let Some(seq) = SeqNum::new(sequence) else {
            return empty();
        };
        let Some(client) = self.selected_client("body fetch") else {
            return empty();
        };

        match client.fetch(seq, FetchItems::FullMessage).await {
            Ok(items) => items
                .into_iter()
                .find_map(|item| match item {
                    FetchItem::Body {
                        data: Some(data), ..
                    } => Some(data),
                    _ => None,
                })
                .map_or_else(empty, |raw| {
                    let body = mailvane_mime::flatten(&raw);
                    (body.text, body.subtype)
                }),
            Err(error) => {
                warn!(sequence, %error, "body fetch failed");
                empty()
            }
        }
    }

    /// Sends a NOOP keep-alive on the connection.
    pub async fn keepalive(&mut self) -> bool {
        let result = match &mut self.state {
            SessionState::Authenticated(client) => client.noop().await,
            SessionState::Selected(client) => client.noop().await,
            SessionState::Disconnected => return false,
        };

        result
            .map_err(|error| warn!(%error, "keep-alive failed"))
            .is_ok()
    }

    /// Logs out and drops the connection.
    ///
    /// The facade reads as disconnected afterwards either way; the return
    /// value reports whether the server acknowledged the logout.
    pub async fn logout(&mut self) -> bool {
        let result = match std::mem::replace(&mut self.state, SessionState::Disconnected) {
            SessionState::Disconnected => {
                warn!("logout requested while disconnected");
                return false;
            }
            SessionState::Authenticated(client) => client.logout().await,
            SessionState::Selected(client) => client.logout().await,
        };

        result
            .map_err(|error| warn!(%error, "IMAP logout failed"))
            .is_ok()
    }

    fn selected_client(&mut self, operation: &str) -> Option<&mut SelectedClient> {
        match &mut self.state {
            SessionState::Selected(client) => Some(client),
            _ => {
                warn!("{operation} requested with no mailbox selected");
                None
            }
        }
    }
}

impl MailboxBackend for MailboxSession {
    async fn remote_count(&mut self, mailbox: &str) -> u32 {
        self.select_mailbox(mailbox).await
    }

    async fn header(&mut self, sequence: u32) -> HeaderRecord {
        self.fetch_headers(sequence).await
    }
}

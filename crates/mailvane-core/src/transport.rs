//! Submission transport facade.
//!
//! Owns the one SMTP connection of a logged-in session. Transport and
//! server failures are absorbed into `false` with a logged warning; a
//! malformed outgoing message is the caller's bug and is rejected before
//! any traffic, logged at error level, without touching the connection.

use mailvane_smtp::{Address, Authenticated, Client, Connected, connection::connect_tls};
use tracing::{error, warn};

use crate::compose::OutgoingMessage;

/// Connection state of the facade.
enum TransportState {
    Disconnected,
    Connected(Client<Connected>),
    Authenticated(Client<Authenticated>),
}

/// Validated envelope for one send.
struct Envelope {
    from: Address,
    recipients: Vec<Address>,
}

/// The submission side of a mail session: one connection, one user.
pub struct MailTransport {
    host: String,
    port: u16,
    state: TransportState,
}

impl MailTransport {
    /// Creates a disconnected transport facade for the given server.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            state: TransportState::Disconnected,
        }
    }

    /// True once connected (authenticated or not).
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !matches!(self.state, TransportState::Disconnected)
    }

    /// True once authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, TransportState::Authenticated(_))
    }

    /// Opens a TLS connection and exchanges the greeting and EHLO.
    ///
    /// Any existing connection is discarded first; reconnecting restarts
    /// the state machine.
    pub async fn connect(&mut self) -> bool {
        self.state = TransportState::Disconnected;

        match Self::open(&self.host, self.port).await {
            Ok(client) => {
                self.state = TransportState::Connected(client);
                true
            }
            Err(error) => {
                warn!(host = %self.host, %error, "SMTP connect failed");
                false
            }
        }
    }

    async fn open(host: &str, port: u16) -> mailvane_smtp::Result<Client<Connected>> {
        let stream = connect_tls(host, port).await?;
        let client = Client::from_stream(stream).await?;
        client.ehlo("localhost").await
    }

    /// Authenticates with AUTH PLAIN. Valid only when connected and not yet
    /// authenticated.
    ///
    /// On rejection the server-side connection state is unreliable, so the
    /// facade reconnects to restore the pre-auth state; the caller can
    /// simply retry with other credentials.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> bool {
        match std::mem::replace(&mut self.state, TransportState::Disconnected) {
            TransportState::Disconnected => {
                warn!("authentication requested while disconnected");
                false
            }
            TransportState::Authenticated(client) => {
                warn!("authentication requested while already authenticated");
                self.state = TransportState::Authenticated(client);
                false
            }
            TransportState::Connected(client) => match client.auth_plain(username, password).await {
                Ok(client) => {
                    self.state = TransportState::Authenticated(client);
                    true
                }
                Err(auth_error) => {
                    warn!(%auth_error, "SMTP authentication failed");
                    if let Ok(client) = Self::open(&self.host, self.port).await {
                        self.state = TransportState::Connected(client);
                    }
                    false
                }
            },
        }
    }

    /// Sends a composed message. Valid only when authenticated.
    ///
    /// All recipients (to, cc, bcc) become envelope recipients. Transport
    /// failures mid-transaction drop the connection.
    pub async fn send(&mut self, message: &OutgoingMessage) -> bool {
        // Caller-contract check before any I/O
        let envelope = match build_envelope(message) {
            Ok(envelope) => envelope,
            Err(contract_error) => {
                error!(%contract_error, "rejecting malformed outgoing message");
                return false;
            }
        };

        match std::mem::replace(&mut self.state, TransportState::Disconnected) {
            TransportState::Authenticated(client) => {
                match Self::transact(client, envelope, message).await {
                    Ok(client) => {
                        self.state = TransportState::Authenticated(client);
                        true
                    }
                    Err(send_error) => {
                        // The client was consumed; the connection is gone
                        warn!(%send_error, "sending failed");
                        false
                    }
                }
            }
            other => {
                warn!("send requested while not authenticated");
                self.state = other;
                false
            }
        }
    }

    async fn transact(
        client: Client<Authenticated>,
        envelope: Envelope,
        message: &OutgoingMessage,
    ) -> mailvane_smtp::Result<Client<Authenticated>> {
        let mut recipients = envelope.recipients.into_iter();
        let first = recipients.next().ok_or_else(|| {
            mailvane_smtp::Error::InvalidAddress("no recipients".to_string())
        })?;

        let client = client.mail_from(envelope.from).await?;
        let mut client = client.rcpt_to(first).await?;
        for recipient in recipients {
            client = client.rcpt_to(recipient).await?;
        }

        let client = client.data().await?;
        client.send_message(message.to_rfc5322().as_bytes()).await
    }

    /// Sends QUIT and drops the connection. False if already disconnected
    /// or the server failed to acknowledge.
    pub async fn disconnect(&mut self) -> bool {
        let result = match std::mem::replace(&mut self.state, TransportState::Disconnected) {
            TransportState::Disconnected => {
                warn!("disconnect requested while disconnected");
                return false;
            }
            TransportState::Connected(client) => client.quit().await,
            TransportState::Authenticated(client) => client.quit().await,
        };

        result
            .map_err(|error| warn!(%error, "SMTP logout failed"))
            .is_ok()
    }
}

/// Validates the sender and recipients into an envelope.
fn build_envelope(message: &OutgoingMessage) -> mailvane_smtp::Result<Envelope> {
    let recipients = message.all_recipients();
    if recipients.is_empty() {
        return Err(mailvane_smtp::Error::InvalidAddress(
            "no recipients".to_string(),
        ));
    }

    Ok(Envelope {
        from: Address::new(message.from.as_str())?,
        recipients: recipients
            .into_iter()
            .map(Address::new)
            .collect::<mailvane_smtp::Result<_>>()?,
    })
}

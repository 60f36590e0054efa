//! # mailvane-imap
//!
//! IMAP retrieval client for the mailvane mail client, speaking the
//! RFC 3501 subset the client needs: LOGIN, LIST, SELECT, single-message
//! FETCH (header subset or full message), NOOP, and LOGOUT, over implicit
//! TLS (port 993).
//!
//! The connection uses the type-state pattern so state transitions are
//! enforced at compile time:
//!
//! ```text
//! ┌───────────────────┐
//! │  NotAuthenticated │ ── login() ──→ Authenticated
//! └───────────────────┘
//!            │
//!            ▼
//! ┌───────────────────┐
//! │   Authenticated   │ ── select() ──→ Selected
//! └───────────────────┘
//! ```
//!
//! A `Selected` client can re-select other mailboxes in place and fetch
//! messages by sequence number.
//!
//! ## Example
//!
//! ```ignore
//! use mailvane_imap::{Client, Config, FetchItems, SeqNum, connect_tls};
//!
//! let config = Config::new("imap.example.com");
//! let stream = connect_tls(&config).await?;
//! let client = Client::from_stream(stream).await?;
//! let mut client = client.login("user@example.com", "password").await?;
//!
//! let mailboxes = client.list("", "*").await?;
//! let (mut client, status) = client.select("INBOX").await?;
//! println!("{} messages", status.exists);
//!
//! if let Some(seq) = SeqNum::new(status.exists) {
//!     let items = client.fetch(seq, FetchItems::FullMessage).await?;
//! }
//! client.logout().await?;
//! ```
//!
//! ## Modules
//!
//! - [`command`]: command builders and tag generation
//! - [`connection`]: TLS setup, framing, and the type-state client
//! - [`parser`]: sans-I/O response parser
//! - [`types`]: core types (mailboxes, sequence numbers, tags)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::{Command, FetchItems, TagGenerator};
pub use connection::{
    Authenticated, Client, Config, DEFAULT_PORT, FramedStream, ImapStream, NotAuthenticated,
    Selected, connect_tls,
};
pub use error::{Error, Result};
pub use parser::{FetchItem, Response, ResponseParser, Status, UntaggedResponse};
pub use types::{ListEntry, Mailbox, MailboxStatus, SeqNum, Tag};

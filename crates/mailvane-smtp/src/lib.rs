//! # mailvane-smtp
//!
//! SMTP submission client (RFC 5321) for the mailvane mail client.
//!
//! The connection is implicit TLS (submission port 465). The client uses the
//! type-state pattern so that only protocol-legal operations are available
//! in each state:
//!
//! ```text
//! Connected ── ehlo() ──┐
//!     │                 ▼
//!     └── auth_plain() ──→ Authenticated ── mail_from() ──→ MailTransaction
//!                              ▲                                  │
//!                              │                              rcpt_to()
//!                         send_message()                          ▼
//!                              │                           RecipientAdded
//!                              └────────── data() ◄───────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use mailvane_smtp::{Address, Client, connection::connect_tls};
//!
//! let stream = connect_tls("smtp.example.com", 465).await?;
//! let client = Client::from_stream(stream).await?;
//! let client = client.ehlo("localhost").await?;
//! let client = client.auth_plain("user@example.com", "password").await?;
//!
//! let client = client.mail_from(Address::new("user@example.com")?).await?;
//! let client = client.rcpt_to(Address::new("friend@example.com")?).await?;
//! let client = client.data().await?;
//! let client = client.send_message(b"Subject: hi\r\n\r\nhello\r\n").await?;
//! client.quit().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded, ServerInfo,
};
pub use error::{Error, Result};
pub use types::{Address, Extension, Reply, ReplyCode};

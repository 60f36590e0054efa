//! # mailvane-core
//!
//! Core services for the mailvane mail client. A UI layer drives these
//! facades; everything network- or protocol-shaped lives behind them.
//!
//! - [`session`]: the retrieval session facade (connect, login, list,
//!   select, fetch, logout), absorbing failures into boolean/empty results
//! - [`transport`]: the submission facade (connect, authenticate, send,
//!   disconnect)
//! - [`index`]: the per-mailbox header cache with epoch-tagged windowed
//!   pagination and the UI-observable busy signal
//! - [`record`] / [`display`]: cached header records and their bounded,
//!   display-safe projection
//! - [`compose`]: outgoing message assembly, reply/forward prefills
//! - [`settings`]: the settings shape handed in by the embedding
//!   application

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod compose;
pub mod display;
mod error;
pub mod index;
pub mod record;
pub mod session;
pub mod settings;
pub mod transport;

pub use compose::OutgoingMessage;
pub use display::{
    DISPLAY_WIDTH, DisplayHeader, normalize_address, normalize_date, normalize_subject,
    strip_non_bmp, truncate,
};
pub use error::{Error, Result};
pub use index::{BusySignal, MailboxBackend, MailboxIndex, PageRow, PageUpdate, WINDOW_SIZE};
pub use record::HeaderRecord;
pub use session::{HEADER_FIELDS, MailboxSession};
pub use settings::{ServerAddr, Settings};
pub use transport::MailTransport;

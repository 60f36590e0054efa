//! Core IMAP types.

mod identifiers;
mod mailbox;

pub use identifiers::{SeqNum, Tag};
pub use mailbox::{ListEntry, Mailbox, MailboxStatus};

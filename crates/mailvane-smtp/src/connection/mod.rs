//! Connection management: TLS stream and type-state client.

mod client;
mod stream;

pub use client::{
    Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded, ServerInfo,
};
pub use stream::{SmtpStream, connect_tls};

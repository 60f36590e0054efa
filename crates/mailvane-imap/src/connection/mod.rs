//! Connection management: TLS setup, framing, and the type-state client.

mod client;
mod config;
mod framed;
mod stream;

pub use client::{Authenticated, Client, NotAuthenticated, Selected};
pub use config::{Config, DEFAULT_PORT};
pub use framed::FramedStream;
pub use stream::{ImapStream, connect_tls};

//! TLS stream setup for IMAP connections.

use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use super::config::Config;
use crate::{Error, Result};

/// The concrete stream type produced by [`connect_tls`].
pub type ImapStream = tokio_rustls::client::TlsStream<TcpStream>;

/// Connects to the configured server with implicit TLS.
///
/// The TCP connect is bounded by the configured timeout; the TLS handshake
/// rides on the established connection.
///
/// # Errors
///
/// Returns an error if the connection times out or fails, the hostname is
/// not a valid DNS name, or the TLS handshake fails.
pub async fn connect_tls(config: &Config) -> Result<ImapStream> {
    let addr = format!("{}:{}", config.host, config.port);
    let tcp = tokio::time::timeout(config.connect_timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| Error::Timeout(config.connect_timeout))??;

    let connector = create_tls_connector();
    let server_name = ServerName::try_from(config.host.clone())?;
    Ok(connector.connect(server_name, tcp).await?)
}

/// Creates a TLS connector trusting the bundled webpki roots.
fn create_tls_connector() -> TlsConnector {
    let root_store = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

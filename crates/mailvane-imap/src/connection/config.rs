//! Connection configuration.

use std::time::Duration;

/// Default IMAP-over-TLS port.
pub const DEFAULT_PORT: u16 = 993;

/// IMAP connection configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Config {
    /// Creates a configuration with the default port and a 30 s connect
    /// timeout.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new("imap.example.com");
        assert_eq!(config.host, "imap.example.com");
        assert_eq!(config.port, 993);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides() {
        let config = Config::new("imap.example.com")
            .with_port(1993)
            .with_connect_timeout(Duration::from_secs(5));
        assert_eq!(config.port, 1993);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }
}

//! Envelope address type.

use crate::error::{Error, Result};

/// Email address for the SMTP envelope.
///
/// Validation is intentionally shallow: the server is the authority on what
/// it accepts, but obviously malformed input is a caller error and is
/// rejected before any traffic is sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] for an empty address or one without
    /// exactly one `@` separating non-empty local and domain parts.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        let addr = addr.trim().to_string();

        if addr.is_empty() {
            return Err(Error::InvalidAddress("address is empty".into()));
        }

        match addr.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {}
            _ => {
                return Err(Error::InvalidAddress(format!(
                    "'{addr}' is not a valid address"
                )));
            }
        }

        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn valid_address() {
        let addr = Address::new("user@example.com").unwrap();
        assert_eq!(addr.as_str(), "user@example.com");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let addr = Address::new(" user@example.com ").unwrap();
        assert_eq!(addr.as_str(), "user@example.com");
    }

    #[test]
    fn rejects_missing_at() {
        assert!(Address::new("userexample.com").is_err());
    }

    #[test]
    fn rejects_empty() {
        assert!(Address::new("").is_err());
    }

    #[test]
    fn rejects_empty_local_or_domain() {
        assert!(Address::new("@example.com").is_err());
        assert!(Address::new("user@").is_err());
    }

    #[test]
    fn rejects_double_at() {
        assert!(Address::new("a@b@c").is_err());
    }
}

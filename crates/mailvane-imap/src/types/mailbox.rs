//! Mailbox types.

/// Mailbox name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox(pub String);

impl Mailbox {
    /// Creates a new mailbox name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The INBOX mailbox (case-insensitive per RFC).
    #[must_use]
    pub fn inbox() -> Self {
        Self("INBOX".to_string())
    }

    /// Returns the mailbox name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mailbox status harvested from SELECT responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailboxStatus {
    /// Number of messages in the mailbox (EXISTS).
    pub exists: u32,
    /// Number of recent messages (RECENT).
    pub recent: u32,
}

/// One entry of a LIST reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Name attributes as sent by the server (e.g., `\HasNoChildren`).
    pub attributes: Vec<String>,
    /// Hierarchy delimiter.
    pub delimiter: Option<char>,
    /// Mailbox name.
    pub mailbox: Mailbox,
}

impl ListEntry {
    /// Returns false if the server marked the mailbox `\Noselect`.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self
            .attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case("\\Noselect"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_constant() {
        assert_eq!(Mailbox::inbox().as_str(), "INBOX");
    }

    #[test]
    fn noselect_detection() {
        let entry = ListEntry {
            attributes: vec!["\\Noselect".to_string(), "\\HasChildren".to_string()],
            delimiter: Some('/'),
            mailbox: Mailbox::new("[Gmail]"),
        };
        assert!(!entry.is_selectable());

        let entry = ListEntry {
            attributes: vec!["\\HasNoChildren".to_string()],
            delimiter: Some('/'),
            mailbox: Mailbox::new("INBOX"),
        };
        assert!(entry.is_selectable());
    }
}

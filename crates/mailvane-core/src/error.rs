//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IMAP operation failed.
    #[error("IMAP error: {0}")]
    Imap(#[from] mailvane_imap::Error),

    /// SMTP operation failed.
    #[error("SMTP error: {0}")]
    Smtp(#[from] mailvane_smtp::Error),

    /// MIME processing failed.
    #[error("MIME error: {0}")]
    Mime(#[from] mailvane_mime::Error),

    /// Settings could not be parsed.
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

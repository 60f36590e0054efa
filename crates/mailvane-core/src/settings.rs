//! Application settings shape.
//!
//! Where the settings come from (file, environment, dialog) is the caller's
//! concern; this is only the boundary contract plus a JSON parse helper.

use serde::Deserialize;

use crate::Result;

/// One server endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerAddr {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
}

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Window/application title.
    pub title: String,
    /// Retrieval (IMAP) server, default port 993.
    pub imap: ServerAddr,
    /// Submission (SMTP) server, default port 465.
    pub smtp: ServerAddr,
}

impl Settings {
    /// Parses settings from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or does not match
    /// the settings shape.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(Into::into)
    }
}

//! Outgoing message assembly.
//!
//! Builds the message record the transport facade sends, plus the reply and
//! forward prefills. Address syntax is not validated here; the envelope
//! layer and ultimately the server judge addresses.

use std::fmt::Write as _;

use mailvane_mime::ContentType;
use mailvane_mime::encoding::encode_rfc2047;

use crate::record::HeaderRecord;

/// A message composed for sending, consumed once by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Sender address.
    pub from: String,
    /// Primary recipients.
    pub to: Vec<String>,
    /// Carbon-copy recipients.
    pub cc: Vec<String>,
    /// Blind-carbon-copy recipients (envelope only, never a header).
    pub bcc: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Body charset.
    pub charset: String,
    /// Body text subtype ("plain" or "html").
    pub subtype: String,
}

impl OutgoingMessage {
    /// Creates a message with one recipient, UTF-8 charset, and a plain
    /// text body.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: vec![to.into()],
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: subject.into(),
            body: body.into(),
            charset: "utf-8".to_string(),
            subtype: "plain".to_string(),
        }
    }

    /// Adds a carbon-copy recipient.
    #[must_use]
    pub fn cc(mut self, recipient: impl Into<String>) -> Self {
        self.cc.push(recipient.into());
        self
    }

    /// Adds a blind-carbon-copy recipient.
    #[must_use]
    pub fn bcc(mut self, recipient: impl Into<String>) -> Self {
        self.bcc.push(recipient.into());
        self
    }

    /// Overrides the charset.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Overrides the body subtype.
    #[must_use]
    pub fn subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = subtype.into();
        self
    }

    /// Prefills a reply draft: To is the original sender, Subject gains the
    /// "Re:" prefix. The sender is left for the caller to fill in.
    #[must_use]
    pub fn reply(original: &HeaderRecord) -> Self {
        Self::new(
            String::new(),
            original.from_address(),
            format!("Re:{}", original.subject()),
            String::new(),
        )
    }

    /// Prefills a forward draft: Subject gains the "Fwd:" prefix and the
    /// body carries the original text. Sender and recipient are left for
    /// the caller.
    #[must_use]
    pub fn forward(original: &HeaderRecord, body: impl Into<String>) -> Self {
        let mut draft = Self::new(
            String::new(),
            String::new(),
            format!("Fwd:{}", original.subject()),
            body,
        );
        draft.to.clear();
        draft
    }

    /// Every envelope recipient: to, then cc, then bcc.
    #[must_use]
    pub fn all_recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
            .collect()
    }

    /// Renders the RFC 5322 message.
    ///
    /// Bcc recipients are envelope-only and never appear here. The subject
    /// is RFC 2047-encoded when it needs to be.
    #[must_use]
    pub fn to_rfc5322(&self) -> String {
        let mut message = String::new();

        let _ = writeln!(message, "Date: {}\r", chrono::Utc::now().to_rfc2822());
        let _ = writeln!(message, "From: {}\r", self.from);

        if !self.to.is_empty() {
            let _ = writeln!(message, "To: {}\r", self.to.join(", "));
        }
        if !self.cc.is_empty() {
            let _ = writeln!(message, "Cc: {}\r", self.cc.join(", "));
        }

        let _ = writeln!(
            message,
            "Subject: {}\r",
            encode_rfc2047(&self.subject, &self.charset)
        );

        message.push_str("MIME-Version: 1.0\r\n");
        let content_type = ContentType::new("text", self.subtype.clone())
            .with_parameter("charset", self.charset.clone());
        let _ = writeln!(message, "Content-Type: {content_type}\r");
        message.push_str("Content-Transfer-Encoding: 8bit\r\n");

        message.push_str("\r\n");
        message.push_str(&self.body);

        message
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn original() -> HeaderRecord {
        HeaderRecord::from_header_bytes(
            b"Subject: status report\r\nFrom: Jane <jane@example.com>\r\n\r\n",
        )
    }

    #[test]
    fn reply_prefills_to_and_subject() {
        let draft = OutgoingMessage::reply(&original());
        assert_eq!(draft.to, vec!["Jane <jane@example.com>"]);
        assert_eq!(draft.subject, "Re:status report");
        assert_eq!(draft.body, "");
    }

    #[test]
    fn forward_prefills_subject_and_body() {
        let draft = OutgoingMessage::forward(&original(), "the original body");
        assert!(draft.to.is_empty());
        assert_eq!(draft.subject, "Fwd:status report");
        assert_eq!(draft.body, "the original body");
    }

    #[test]
    fn recipients_cover_cc_and_bcc() {
        let message = OutgoingMessage::new("me@example.com", "a@example.com", "hi", "body")
            .cc("b@example.com")
            .bcc("c@example.com");
        assert_eq!(
            message.all_recipients(),
            vec!["a@example.com", "b@example.com", "c@example.com"]
        );
    }

    #[test]
    fn rendering_includes_standard_headers() {
        let message = OutgoingMessage::new("me@example.com", "you@example.com", "hi", "hello")
            .cc("cc@example.com");
        let rendered = message.to_rfc5322();

        assert!(rendered.starts_with("Date: "));
        assert!(rendered.contains("From: me@example.com\r\n"));
        assert!(rendered.contains("To: you@example.com\r\n"));
        assert!(rendered.contains("Cc: cc@example.com\r\n"));
        assert!(rendered.contains("Subject: hi\r\n"));
        assert!(rendered.contains("MIME-Version: 1.0\r\n"));
        assert!(rendered.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(rendered.ends_with("\r\nhello"));
    }

    #[test]
    fn bcc_never_appears_in_headers() {
        let message = OutgoingMessage::new("me@example.com", "you@example.com", "hi", "hello")
            .bcc("secret@example.com");
        assert!(!message.to_rfc5322().contains("secret@example.com"));
    }

    #[test]
    fn non_ascii_subject_is_encoded() {
        let message = OutgoingMessage::new("me@example.com", "you@example.com", "Héllo", "hi");
        let rendered = message.to_rfc5322();
        assert!(rendered.contains("Subject: =?utf-8?B?"));
    }

    #[test]
    fn html_subtype_changes_content_type() {
        let message = OutgoingMessage::new("me@example.com", "you@example.com", "hi", "<p>x</p>")
            .subtype("html");
        assert!(
            message
                .to_rfc5322()
                .contains("Content-Type: text/html; charset=utf-8\r\n")
        );
    }
}

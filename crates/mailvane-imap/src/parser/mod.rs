//! Sans-I/O response parser.
//!
//! Parses single complete response lines (with any literals already read
//! inline by the framing layer) into structured values. Only the grammar
//! this client provokes is modelled; everything else is skipped with
//! balanced-delimiter rules so unsolicited data never derails a session.

use crate::error::{Error, Result};
use crate::types::{ListEntry, Mailbox, Tag};

/// Condition status of a tagged or untagged status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command completed / informational.
    Ok,
    /// Operational error.
    No,
    /// Protocol-level error.
    Bad,
    /// Server is closing the connection.
    Bye,
    /// Connection is pre-authenticated.
    PreAuth,
}

impl Status {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "OK" => Some(Self::Ok),
            "NO" => Some(Self::No),
            "BAD" => Some(Self::Bad),
            "BYE" => Some(Self::Bye),
            "PREAUTH" => Some(Self::PreAuth),
            _ => None,
        }
    }
}

/// A parsed server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Command completion, correlated by tag.
    Tagged {
        /// The command tag.
        tag: Tag,
        /// Completion status.
        status: Status,
        /// Capabilities carried in a `[CAPABILITY ...]` response code.
        capabilities: Vec<String>,
        /// Human-readable text.
        text: String,
    },
    /// Server data or status not tied to a command.
    Untagged(UntaggedResponse),
    /// Continuation request.
    Continuation {
        /// Prompt text, if any.
        text: String,
    },
}

/// Untagged response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// `* OK/NO/BAD/BYE/PREAUTH ...` status line.
    Condition {
        /// Condition status.
        status: Status,
        /// Capabilities carried in a `[CAPABILITY ...]` response code.
        capabilities: Vec<String>,
        /// Human-readable text.
        text: String,
    },
    /// `* CAPABILITY ...` listing.
    Capability(Vec<String>),
    /// `* <n> EXISTS` message count.
    Exists(u32),
    /// `* <n> RECENT` count.
    Recent(u32),
    /// `* <n> FETCH (...)` data.
    Fetch {
        /// Message sequence number the data belongs to.
        seq: u32,
        /// Parsed data items.
        items: Vec<FetchItem>,
    },
    /// `* LIST (...) delim name` entry.
    List(ListEntry),
    /// Any other keyword, recorded but not interpreted.
    Other(String),
}

/// One data item of a FETCH response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItem {
    /// `BODY[section]` data. `data` is `None` when the server sent NIL.
    Body {
        /// Section specifier (e.g. `HEADER.FIELDS (...)`), if non-empty.
        section: Option<String>,
        /// Raw section bytes.
        data: Option<Vec<u8>>,
    },
    /// Message flags.
    Flags(Vec<String>),
}

/// Response parser entry point.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses one complete response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the input violates the response
    /// grammar.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut s = Scanner::new(input);

        if s.eat(b'*') {
            s.expect(b' ')?;
            return parse_untagged(&mut s);
        }

        if s.eat(b'+') {
            let _ = s.eat(b' ');
            return Ok(Response::Continuation { text: s.rest_text() });
        }

        let tag = s.read_atom()?.to_string();
        s.expect(b' ')?;
        let keyword = s.read_atom()?.to_ascii_uppercase();
        let status = Status::from_keyword(&keyword)
            .ok_or_else(|| s.error(&format!("unknown status: {keyword}")))?;
        let (capabilities, text) = parse_resp_text(&mut s);

        Ok(Response::Tagged {
            tag: Tag::new(tag),
            status,
            capabilities,
            text,
        })
    }
}

fn parse_untagged(s: &mut Scanner<'_>) -> Result<Response> {
    // Numbered form: "* <n> EXISTS|RECENT|FETCH ..."
    if s.peek().is_some_and(|b| b.is_ascii_digit()) {
        let n = s.read_number()?;
        s.expect(b' ')?;
        let keyword = s.read_atom()?.to_ascii_uppercase();

        let data = match keyword.as_str() {
            "EXISTS" => UntaggedResponse::Exists(n),
            "RECENT" => UntaggedResponse::Recent(n),
            "FETCH" => {
                s.expect(b' ')?;
                UntaggedResponse::Fetch {
                    seq: n,
                    items: parse_fetch_items(s)?,
                }
            }
            _ => UntaggedResponse::Other(keyword),
        };
        return Ok(Response::Untagged(data));
    }

    let keyword = s.read_atom()?.to_ascii_uppercase();

    if let Some(status) = Status::from_keyword(&keyword) {
        let (capabilities, text) = parse_resp_text(s);
        return Ok(Response::Untagged(UntaggedResponse::Condition {
            status,
            capabilities,
            text,
        }));
    }

    let data = match keyword.as_str() {
        "CAPABILITY" => UntaggedResponse::Capability(
            s.rest_text()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        ),
        "LIST" => {
            s.expect(b' ')?;
            UntaggedResponse::List(parse_list(s)?)
        }
        _ => UntaggedResponse::Other(keyword),
    };

    Ok(Response::Untagged(data))
}

/// Parses resp-text: an optional `[code]` followed by free text.
///
/// Only the `CAPABILITY` response code is interpreted; other codes are
/// skipped.
fn parse_resp_text(s: &mut Scanner<'_>) -> (Vec<String>, String) {
    let _ = s.eat(b' ');
    let mut capabilities = Vec::new();

    if s.peek() == Some(b'[') {
        s.advance();
        let code = s.take_until(b']');
        let _ = s.eat(b']');
        let _ = s.eat(b' ');

        let mut words = code.split_whitespace();
        if words
            .next()
            .is_some_and(|w| w.eq_ignore_ascii_case("CAPABILITY"))
        {
            capabilities = words.map(str::to_string).collect();
        }
    }

    (capabilities, s.rest_text())
}

fn parse_list(s: &mut Scanner<'_>) -> Result<ListEntry> {
    s.expect(b'(')?;
    let mut attributes = Vec::new();
    loop {
        s.skip_spaces();
        if s.eat(b')') {
            break;
        }
        attributes.push(s.read_atom()?.to_string());
    }

    s.expect(b' ')?;
    let delimiter = if s.peek() == Some(b'"') {
        s.read_quoted()?.chars().next()
    } else {
        let atom = s.read_atom()?;
        if atom.eq_ignore_ascii_case("NIL") {
            None
        } else {
            return Err(s.error("expected delimiter or NIL"));
        }
    };

    s.expect(b' ')?;
    let name = s.read_astring()?;

    Ok(ListEntry {
        attributes,
        delimiter,
        mailbox: Mailbox::new(name),
    })
}

fn parse_fetch_items(s: &mut Scanner<'_>) -> Result<Vec<FetchItem>> {
    s.expect(b'(')?;
    let mut items = Vec::new();

    loop {
        s.skip_spaces();
        if s.eat(b')') {
            break;
        }
        if s.peek().is_none() {
            return Err(s.error("unterminated FETCH item list"));
        }

        let name = s.read_atom()?.to_ascii_uppercase();
        match name.as_str() {
            "FLAGS" => {
                s.skip_spaces();
                s.expect(b'(')?;
                let mut flags = Vec::new();
                loop {
                    s.skip_spaces();
                    if s.eat(b')') {
                        break;
                    }
                    flags.push(s.read_atom()?.to_string());
                }
                items.push(FetchItem::Flags(flags));
            }
            "BODY" | "RFC822" | "RFC822.HEADER" | "RFC822.TEXT" => {
                let section = read_section(s);
                skip_origin(s);
                s.skip_spaces();
                let data = read_body_value(s)?;
                items.push(FetchItem::Body { section, data });
            }
            _ => {
                // UID, RFC822.SIZE, INTERNALDATE, ENVELOPE, BODYSTRUCTURE, ...
                s.skip_spaces();
                skip_value(s)?;
            }
        }
    }

    Ok(items)
}

/// Reads an optional `[section]` after BODY.
fn read_section(s: &mut Scanner<'_>) -> Option<String> {
    if s.peek() != Some(b'[') {
        return None;
    }
    s.advance();
    let section = s.take_until(b']').to_string();
    let _ = s.eat(b']');

    if section.is_empty() { None } else { Some(section) }
}

/// Skips an optional `<origin>` partial-fetch marker.
fn skip_origin(s: &mut Scanner<'_>) {
    if s.peek() == Some(b'<') {
        let _ = s.take_until(b'>');
        let _ = s.eat(b'>');
    }
}

/// Reads a BODY value: literal, quoted string, or NIL.
fn read_body_value(s: &mut Scanner<'_>) -> Result<Option<Vec<u8>>> {
    match s.peek() {
        Some(b'{') => Ok(Some(s.read_literal()?)),
        Some(b'"') => Ok(Some(s.read_quoted()?.into_bytes())),
        _ => {
            let atom = s.read_atom()?;
            if atom.eq_ignore_ascii_case("NIL") {
                Ok(None)
            } else {
                Err(s.error("expected literal, quoted string, or NIL"))
            }
        }
    }
}

/// Skips one value of any shape: parenthesized list (balanced), quoted
/// string, literal, or atom.
fn skip_value(s: &mut Scanner<'_>) -> Result<()> {
    match s.peek() {
        Some(b'(') => {
            let mut depth = 0usize;
            loop {
                match s.peek() {
                    None => return Err(s.error("unbalanced parenthesis")),
                    Some(b'(') => {
                        depth += 1;
                        s.advance();
                    }
                    Some(b')') => {
                        depth -= 1;
                        s.advance();
                        if depth == 0 {
                            return Ok(());
                        }
                    }
                    Some(b'"') => {
                        let _ = s.read_quoted()?;
                    }
                    Some(b'{') => {
                        let _ = s.read_literal()?;
                    }
                    Some(_) => {
                        s.advance();
                    }
                }
            }
        }
        Some(b'"') => s.read_quoted().map(|_| ()),
        Some(b'{') => s.read_literal().map(|_| ()),
        _ => s.read_atom().map(|_| ()),
    }
}

/// Byte cursor over one response.
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos = (self.pos + 1).min(self.input.len());
    }

    /// Consumes the byte if it is next; returns whether it was.
    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {:?}", byte as char)))
        }
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.advance();
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::Parse {
            position: self.pos,
            message: message.to_string(),
        }
    }

    /// Captures bytes (lossily as UTF-8) up to, not including, `stop`.
    fn take_until(&mut self, stop: u8) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == stop {
                break;
            }
            self.advance();
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).to_string()
    }

    fn read_atom(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(
                b,
                b' ' | b'(' | b')' | b'[' | b']' | b'{' | b'"' | b'<' | b'\r' | b'\n'
            ) {
                break;
            }
            self.advance();
        }

        if self.pos == start {
            return Err(self.error("expected atom"));
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("non-UTF-8 atom"))
    }

    fn read_number(&mut self) -> Result<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }
        if self.pos == start {
            return Err(self.error("expected number"));
        }

        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| self.error("number out of range"))
    }

    fn read_quoted(&mut self) -> Result<String> {
        self.expect(b'"')?;
        let mut out = Vec::new();

        loop {
            match self.peek() {
                None => return Err(self.error("unterminated quoted string")),
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    match self.peek() {
                        Some(c @ (b'"' | b'\\')) => {
                            out.push(c);
                            self.advance();
                        }
                        _ => return Err(self.error("invalid escape in quoted string")),
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }

        String::from_utf8(out).map_err(|_| self.error("non-UTF-8 quoted string"))
    }

    /// Reads a `{n}\r\n<n bytes>` literal starting at `{`.
    fn read_literal(&mut self) -> Result<Vec<u8>> {
        self.expect(b'{')?;
        #[allow(clippy::cast_possible_truncation)]
        let len = self.read_number()? as usize;
        let _ = self.eat(b'+');
        self.expect(b'}')?;
        self.expect(b'\r')?;
        self.expect(b'\n')?;

        let end = self.pos + len;
        if end > self.input.len() {
            return Err(self.error("literal extends past end of response"));
        }
        let data = self.input[self.pos..end].to_vec();
        self.pos = end;
        Ok(data)
    }

    /// Reads an astring: quoted string, literal, or atom.
    fn read_astring(&mut self) -> Result<String> {
        match self.peek() {
            Some(b'"') => self.read_quoted(),
            Some(b'{') => {
                let bytes = self.read_literal()?;
                Ok(String::from_utf8_lossy(&bytes).to_string())
            }
            _ => self.read_atom().map(str::to_string),
        }
    }

    /// Consumes and returns everything up to CRLF (or end of input).
    fn rest_text(&mut self) -> String {
        let text = self.take_until(b'\r');
        self.pos = self.input.len();
        text
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tagged_ok() {
        let response = ResponseParser::parse(b"A0001 OK LOGIN completed\r\n").unwrap();
        match response {
            Response::Tagged { tag, status, text, .. } => {
                assert_eq!(tag.as_str(), "A0001");
                assert_eq!(status, Status::Ok);
                assert_eq!(text, "LOGIN completed");
            }
            other => panic!("expected tagged response, got {other:?}"),
        }
    }

    #[test]
    fn tagged_no_with_code() {
        let response =
            ResponseParser::parse(b"A0002 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n")
                .unwrap();
        match response {
            Response::Tagged { status, text, .. } => {
                assert_eq!(status, Status::No);
                assert_eq!(text, "Invalid credentials");
            }
            other => panic!("expected tagged response, got {other:?}"),
        }
    }

    #[test]
    fn tagged_ok_capability_code() {
        let response =
            ResponseParser::parse(b"A0001 OK [CAPABILITY IMAP4rev1 IDLE] Logged in\r\n").unwrap();
        match response {
            Response::Tagged { capabilities, .. } => {
                assert_eq!(capabilities, vec!["IMAP4rev1", "IDLE"]);
            }
            other => panic!("expected tagged response, got {other:?}"),
        }
    }

    #[test]
    fn greeting_with_capability_code() {
        let response =
            ResponseParser::parse(b"* OK [CAPABILITY IMAP4rev1 AUTH=PLAIN] ready\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Condition {
                status,
                capabilities,
                text,
            }) => {
                assert_eq!(status, Status::Ok);
                assert_eq!(capabilities, vec!["IMAP4rev1", "AUTH=PLAIN"]);
                assert_eq!(text, "ready");
            }
            other => panic!("expected condition, got {other:?}"),
        }
    }

    #[test]
    fn untagged_bye() {
        let response = ResponseParser::parse(b"* BYE Logging out\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Condition { status, text, .. }) => {
                assert_eq!(status, Status::Bye);
                assert_eq!(text, "Logging out");
            }
            other => panic!("expected condition, got {other:?}"),
        }
    }

    #[test]
    fn capability_listing() {
        let response = ResponseParser::parse(b"* CAPABILITY IMAP4rev1 IDLE NAMESPACE\r\n").unwrap();
        assert_eq!(
            response,
            Response::Untagged(UntaggedResponse::Capability(vec![
                "IMAP4rev1".to_string(),
                "IDLE".to_string(),
                "NAMESPACE".to_string(),
            ]))
        );
    }

    #[test]
    fn exists_and_recent() {
        assert_eq!(
            ResponseParser::parse(b"* 23 EXISTS\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Exists(23))
        );
        assert_eq!(
            ResponseParser::parse(b"* 2 RECENT\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Recent(2))
        );
    }

    #[test]
    fn list_with_quoted_name() {
        let response =
            ResponseParser::parse(b"* LIST (\\HasNoChildren) \"/\" \"Sent Items\"\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::List(entry)) => {
                assert_eq!(entry.attributes, vec!["\\HasNoChildren"]);
                assert_eq!(entry.delimiter, Some('/'));
                assert_eq!(entry.mailbox.as_str(), "Sent Items");
                assert!(entry.is_selectable());
            }
            other => panic!("expected list entry, got {other:?}"),
        }
    }

    #[test]
    fn list_with_atom_name_and_nil_delimiter() {
        let response = ResponseParser::parse(b"* LIST (\\Noselect) NIL INBOX\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::List(entry)) => {
                assert_eq!(entry.delimiter, None);
                assert_eq!(entry.mailbox.as_str(), "INBOX");
                assert!(!entry.is_selectable());
            }
            other => panic!("expected list entry, got {other:?}"),
        }
    }

    #[test]
    fn list_with_literal_name() {
        let response = ResponseParser::parse(b"* LIST () \"/\" {7}\r\nArchive\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::List(entry)) => {
                assert_eq!(entry.mailbox.as_str(), "Archive");
                assert!(entry.attributes.is_empty());
            }
            other => panic!("expected list entry, got {other:?}"),
        }
    }

    #[test]
    fn fetch_with_header_literal() {
        let raw = b"* 3 FETCH (BODY[HEADER.FIELDS (SUBJECT FROM)] {26}\r\nSubject: hi\r\nFrom: a@b.c\r\n)\r\n";
        let response = ResponseParser::parse(raw).unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Fetch { seq, items }) => {
                assert_eq!(seq, 3);
                assert_eq!(items.len(), 1);
                match &items[0] {
                    FetchItem::Body { section, data } => {
                        assert_eq!(section.as_deref(), Some("HEADER.FIELDS (SUBJECT FROM)"));
                        assert_eq!(
                            data.as_deref(),
                            Some(b"Subject: hi\r\nFrom: a@b.c\r\n".as_slice())
                        );
                    }
                    other => panic!("expected body item, got {other:?}"),
                }
            }
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn fetch_skips_unrequested_items() {
        let raw = b"* 7 FETCH (UID 112 RFC822.SIZE 3032 FLAGS (\\Seen) BODY[] {5}\r\nhello)\r\n";
        let response = ResponseParser::parse(raw).unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Fetch { seq, items }) => {
                assert_eq!(seq, 7);
                assert_eq!(
                    items,
                    vec![
                        FetchItem::Flags(vec!["\\Seen".to_string()]),
                        FetchItem::Body {
                            section: None,
                            data: Some(b"hello".to_vec()),
                        },
                    ]
                );
            }
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn fetch_skips_envelope_structure() {
        let raw = b"* 1 FETCH (ENVELOPE (\"date\" \"subj (nested)\" NIL NIL NIL NIL NIL NIL NIL NIL) BODY[] NIL)\r\n";
        let response = ResponseParser::parse(raw).unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Fetch { items, .. }) => {
                assert_eq!(
                    items,
                    vec![FetchItem::Body {
                        section: None,
                        data: None,
                    }]
                );
            }
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn fetch_with_partial_origin() {
        let raw = b"* 2 FETCH (BODY[TEXT]<0> {3}\r\nabc)\r\n";
        let response = ResponseParser::parse(raw).unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Fetch { items, .. }) => {
                assert_eq!(
                    items,
                    vec![FetchItem::Body {
                        section: Some("TEXT".to_string()),
                        data: Some(b"abc".to_vec()),
                    }]
                );
            }
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn continuation_request() {
        assert_eq!(
            ResponseParser::parse(b"+ Ready for additional input\r\n").unwrap(),
            Response::Continuation {
                text: "Ready for additional input".to_string(),
            }
        );
    }

    #[test]
    fn unknown_untagged_keyword_is_preserved() {
        let response = ResponseParser::parse(b"* FLAGS (\\Answered \\Seen)\r\n").unwrap();
        assert_eq!(
            response,
            Response::Untagged(UntaggedResponse::Other("FLAGS".to_string()))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(ResponseParser::parse(b"").is_err());
        assert!(ResponseParser::parse(b"A0001 WAT hm\r\n").is_err());
        assert!(ResponseParser::parse(b"* 1 FETCH (BODY[] {99}\r\nshort)\r\n").is_err());
    }
}

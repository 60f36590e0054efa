//! Integration tests for the IMAP client.
//!
//! A scripted mock stream stands in for the server, so a full
//! login → list → select → fetch → logout session runs without a network.

#![allow(clippy::unwrap_used)]

use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use mailvane_imap::{Client, FetchItem, FetchItems, SeqNum};

/// Mock stream that replays scripted responses and records written bytes.
struct MockStream {
    responses: Cursor<Vec<u8>>,
    sent: Arc<Mutex<Vec<u8>>>,
}

impl MockStream {
    fn new(responses: &[u8]) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                responses: Cursor::new(responses.to_vec()),
                sent: Arc::clone(&sent),
            },
            sent,
        )
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let data = self.responses.get_ref();
        #[allow(clippy::cast_possible_truncation)]
        let pos = self.responses.position() as usize;

        if pos >= data.len() {
            return Poll::Ready(Ok(()));
        }

        let remaining = &data[pos..];
        let to_read = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..to_read]);
        self.responses.set_position((pos + to_read) as u64);

        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.sent.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// One complete session against a scripted server.
#[tokio::test]
async fn full_session_walkthrough() {
    let script: &[u8] = b"* OK [CAPABILITY IMAP4rev1 AUTH=PLAIN] Server ready\r\n\
        A0000 OK [CAPABILITY IMAP4rev1 IDLE] Logged in\r\n\
        * LIST (\\HasNoChildren) \"/\" \"INBOX\"\r\n\
        * LIST (\\HasNoChildren) \"/\" \"Sent\"\r\n\
        A0001 OK List completed\r\n\
        * 3 EXISTS\r\n\
        * 0 RECENT\r\n\
        * FLAGS (\\Answered \\Seen)\r\n\
        A0002 OK [READ-WRITE] Select completed\r\n\
        * 3 FETCH (BODY[HEADER.FIELDS (SUBJECT FROM TO DATE CONTENT-TYPE)] {28}\r\n\
        Subject: hi\r\n\
        From: a@b.c\r\n\
        \r\n)\r\n\
        A0003 OK Fetch completed\r\n\
        * 3 FETCH (BODY[] {33}\r\n\
        Content-Type: text/plain\r\n\
        \r\n\
        hello)\r\n\
        A0004 OK Fetch completed\r\n\
        * BYE Logging out\r\n\
        A0005 OK Logout completed\r\n";

    let (stream, sent) = MockStream::new(script);

    // Greeting carries the pre-login capabilities
    let client = Client::from_stream(stream).await.unwrap();
    assert!(client.supports("AUTH=PLAIN"));

    // Login refreshes capabilities from the tagged OK
    let mut client = client.login("user", "secret").await.unwrap();
    assert!(client.supports("IDLE"));

    let mailboxes = client.list("", "*").await.unwrap();
    let names: Vec<&str> = mailboxes.iter().map(|e| e.mailbox.as_str()).collect();
    assert_eq!(names, vec!["INBOX", "Sent"]);

    let (mut client, status) = client.select("INBOX").await.unwrap();
    assert_eq!(status.exists, 3);
    assert_eq!(status.recent, 0);

    // Header-subset fetch returns the literal verbatim
    let seq = SeqNum::new(3).unwrap();
    let items = client
        .fetch(
            seq,
            FetchItems::HeaderFields(vec![
                "Subject".to_string(),
                "From".to_string(),
                "To".to_string(),
                "Date".to_string(),
                "Content-Type".to_string(),
            ]),
        )
        .await
        .unwrap();
    match items.as_slice() {
        [FetchItem::Body { data: Some(data), .. }] => {
            assert_eq!(data.as_slice(), b"Subject: hi\r\nFrom: a@b.c\r\n\r\n");
        }
        other => panic!("unexpected fetch items: {other:?}"),
    }

    // Full-message fetch
    let items = client.fetch(seq, FetchItems::FullMessage).await.unwrap();
    match items.as_slice() {
        [FetchItem::Body { data: Some(data), .. }] => {
            assert_eq!(data.as_slice(), b"Content-Type: text/plain\r\n\r\nhello");
        }
        other => panic!("unexpected fetch items: {other:?}"),
    }

    client.logout().await.unwrap();

    // Every command went out tagged and in order
    let sent = sent.lock().unwrap();
    let sent_text = String::from_utf8_lossy(&sent);
    assert!(sent_text.contains("A0000 LOGIN user secret\r\n"));
    assert!(sent_text.contains("A0001 LIST \"\" \"*\"\r\n"));
    assert!(sent_text.contains("A0002 SELECT INBOX\r\n"));
    assert!(sent_text.contains(
        "A0003 FETCH 3 (BODY.PEEK[HEADER.FIELDS (SUBJECT FROM TO DATE CONTENT-TYPE)])\r\n"
    ));
    assert!(sent_text.contains("A0004 FETCH 3 (BODY.PEEK[])\r\n"));
    assert!(sent_text.contains("A0005 LOGOUT\r\n"));
}

/// A rejected LOGIN surfaces the server's NO as an error.
#[tokio::test]
async fn login_rejection_is_an_error() {
    let script: &[u8] = b"* OK ready\r\n\
        A0000 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n";

    let (stream, _sent) = MockStream::new(script);
    let client = Client::from_stream(stream).await.unwrap();

    let err = client.login("user", "wrong").await.unwrap_err();
    assert!(matches!(err, mailvane_imap::Error::No(_)));
}

/// A BYE greeting refuses the connection.
#[tokio::test]
async fn bye_greeting_is_an_error() {
    let script: &[u8] = b"* BYE Too many connections\r\n";

    let (stream, _sent) = MockStream::new(script);
    let err = Client::from_stream(stream).await.unwrap_err();
    assert!(matches!(err, mailvane_imap::Error::Bye(_)));
}

/// Fetching a sequence number the server has no data for yields no items.
#[tokio::test]
async fn fetch_with_no_data_yields_empty_items() {
    let script: &[u8] = b"* OK ready\r\n\
        A0000 OK Logged in\r\n\
        * 0 EXISTS\r\n\
        A0001 OK Select completed\r\n\
        A0002 OK Fetch completed (nothing matched)\r\n";

    let (stream, _sent) = MockStream::new(script);
    let client = Client::from_stream(stream).await.unwrap();
    let client = client.login("user", "secret").await.unwrap();
    let (mut client, status) = client.select("Empty").await.unwrap();
    assert_eq!(status.exists, 0);

    let items = client
        .fetch(SeqNum::new(1).unwrap(), FetchItems::FullMessage)
        .await
        .unwrap();
    assert!(items.is_empty());
}

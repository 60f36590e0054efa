//! Framed I/O for the IMAP protocol.
//!
//! Responses are CRLF-terminated lines that may embed `{n}` literals; a
//! literal's bytes follow the line and the logical response continues
//! afterwards. This module reads one complete logical response at a time.

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::Result;

/// Read buffer size.
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Maximum line length, to bound memory on a misbehaving server.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Maximum literal size, same reason.
const MAX_LITERAL_SIZE: usize = 64 * 1024 * 1024;

/// Buffered framed connection.
pub struct FramedStream<S> {
    reader: BufReader<S>,
    write_buffer: BytesMut,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new framed stream.
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
            write_buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
        }
    }

    /// Reads one complete logical response, literals included.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, connection close, or when a line or
    /// literal exceeds its size bound.
    pub async fn read_response(&mut self) -> Result<Vec<u8>> {
        let mut response = Vec::new();

        loop {
            let line = self.read_line().await?;
            response.extend_from_slice(&line);

            let Some(literal_len) = parse_literal_length(&line) else {
                break;
            };

            if literal_len > MAX_LITERAL_SIZE {
                return Err(crate::Error::Protocol(format!(
                    "literal too large: {literal_len} bytes (max {MAX_LITERAL_SIZE})"
                )));
            }

            let mut literal = vec![0u8; literal_len];
            self.reader.read_exact(&mut literal).await?;
            response.extend_from_slice(&literal);
            // The line continues after the literal, so loop for more
        }

        Ok(response)
    }

    /// Reads responses until the one tagged with `tag`, returning all of
    /// them in arrival order (the tagged response last).
    ///
    /// # Errors
    ///
    /// Returns an error if any underlying read fails.
    pub async fn read_until_tagged(&mut self, tag: &str) -> Result<Vec<Vec<u8>>> {
        let mut responses = Vec::new();

        loop {
            let response = self.read_response().await?;

            let is_tagged = response
                .get(..tag.len())
                .is_some_and(|prefix| prefix == tag.as_bytes())
                && response.get(tag.len()) == Some(&b' ');

            responses.push(response);

            if is_tagged {
                return Ok(responses);
            }
        }
    }

    /// Reads a single CRLF-terminated line, including the CRLF.
    async fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();

        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(crate::Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }

            if let Some(pos) = find_crlf(buf) {
                line.extend_from_slice(&buf[..pos + 2]);
                self.reader.consume(pos + 2);
                break;
            }

            let len = buf.len();
            line.extend_from_slice(buf);
            self.reader.consume(len);

            if line.len() > MAX_LINE_LENGTH {
                return Err(crate::Error::Protocol("line too long".to_string()));
            }
        }

        Ok(line)
    }

    /// Writes a serialized command and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_command(&mut self, data: &[u8]) -> Result<()> {
        self.write_buffer.clear();
        self.write_buffer.extend_from_slice(data);

        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buffer).await?;
        stream.flush().await?;

        Ok(())
    }
}

/// Finds the position of the first CRLF in a buffer.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Parses a trailing literal announcement (`{n}` or `{n+}`) from a line.
fn parse_literal_length(line: &[u8]) -> Option<usize> {
    let line = line.strip_suffix(b"\r\n")?;
    let line = line.strip_suffix(b"}")?;
    let line = line.strip_suffix(b"+").unwrap_or(line);

    let open = line.iter().rposition(|&b| b == b'{')?;
    let digits = &line[open + 1..];
    if digits.is_empty() {
        return None;
    }

    std::str::from_utf8(digits).ok()?.parse().ok()
}

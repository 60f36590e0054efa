//! SMTP reply parser.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Parses an SMTP reply from its response lines.
///
/// Replies are single-line (`250 OK`) or multi-line
/// (`250-first`, `250-second`, `250 last`).
///
/// # Errors
///
/// Returns an error if the reply is empty or any line is malformed.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let first = lines
        .first()
        .ok_or_else(|| Error::Protocol("empty reply".into()))?;

    if first.len() < 3 {
        return Err(Error::Protocol(format!("reply too short: '{first}'")));
    }

    let code = first[0..3]
        .parse::<u16>()
        .map_err(|_| Error::Protocol(format!("invalid reply code in '{first}'")))?;

    let mut message = Vec::with_capacity(lines.len());
    for line in lines {
        if line.len() > 4 {
            // Skip the code and separator ("250-" or "250 ")
            message.push(line[4..].to_string());
        } else if line.len() == 3 {
            message.push(String::new());
        } else {
            return Err(Error::Protocol(format!("malformed reply line: '{line}'")));
        }
    }

    Ok(Reply::new(ReplyCode::new(code), message))
}

/// Returns true if a line terminates a (possibly multi-line) reply.
///
/// Continuation lines use `-` after the code; the final line uses a space.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.len() == 3 || (line.len() >= 4 && line.as_bytes()[3] == b' ')
}

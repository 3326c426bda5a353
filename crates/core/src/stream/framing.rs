//! Newline framing of the event stream.
//!
//! The response body arrives in chunks whose boundaries are arbitrary: a
//! chunk may end in the middle of a record, or in the middle of a multi-byte
//! character. [`LineFramer`] keeps the incomplete tail of the byte stream
//! between reads and only hands out complete lines.

use of_protocol::stream_models::StreamEvent;

use crate::stream::error::{StreamError, StreamResult};

/// Incremental splitter of a byte stream into text lines.
///
/// Bytes are buffered raw and decoded per complete line. `\n` never occurs
/// inside a multi-byte UTF-8 sequence, so splitting before decoding is safe.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completes.
    ///
    /// Lines are returned without their terminator and trimmed; lines that
    /// are empty after trimming are dropped. The bytes after the last `\n`
    /// stay buffered for the next call. Each line is decoded on its own: a
    /// line that is not valid UTF-8 becomes an `Err` entry after the lines
    /// that precede it, and nothing after it is returned.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamResult<String>> {
        self.buffer.extend_from_slice(chunk);

        let Some(last_newline) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        let mut lines = Vec::new();
        for raw in complete.split(|&b| b == b'\n') {
            match std::str::from_utf8(raw) {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        lines.push(Ok(text.to_string()));
                    }
                }
                Err(e) => {
                    lines.push(Err(StreamError::from(e)));
                    break;
                }
            }
        }
        lines
    }

    /// Bytes buffered after the last complete line.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the framer, returning the unterminated tail, if any.
    pub fn finish(self) -> Option<Vec<u8>> {
        let tail_is_blank = self.buffer.iter().all(u8::is_ascii_whitespace);
        (!tail_is_blank).then_some(self.buffer)
    }
}

/// Parse one complete line into an event record.
///
/// A malformed line is fatal for the whole stream.
pub fn parse_record(line: &str) -> StreamResult<StreamEvent> {
    serde_json::from_str(line).map_err(|source| StreamError::Parse {
        line: line.to_string(),
        source,
    })
}

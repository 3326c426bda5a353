//! Error types for the event stream.

use thiserror::Error;

/// Errors that end an event stream.
///
/// Every variant is fatal for the run that consumes the stream.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The request could not be sent or the connection failed.
    #[error("Stream request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Streaming response unavailable (HTTP {status})")]
    Status { status: u16 },

    /// Reading the next chunk of the body failed.
    #[error("Failed to read event stream: {0}")]
    Read(String),

    /// A complete line was not valid UTF-8.
    #[error("Event stream is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// A complete line was not a valid event record.
    #[error("Malformed event record: {source} (line: {line})")]
    Parse {
        line: String,
        source: serde_json::Error,
    },
}

/// Type alias for Result with StreamError.
pub type StreamResult<T> = Result<T, StreamError>;

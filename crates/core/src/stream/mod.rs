//! Streaming consumption of the chat endpoint.
//!
//! This module provides:
//! - Newline framing of an incrementally delivered byte stream
//! - Decoding of framed lines into [`StreamEvent`](of_protocol::StreamEvent)s
//! - The [`EventSource`] seam with an HTTP and a scripted implementation

pub mod consumer;
pub mod error;
pub mod framing;
pub mod scripted;
pub mod source;

pub use consumer::{decode_event_stream, EventStream};
pub use error::{StreamError, StreamResult};
pub use scripted::ScriptedEventSource;
pub use source::{EventSource, HttpEventSource};

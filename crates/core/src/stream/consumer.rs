//! Decoding of a byte-chunk stream into stream events.

use std::fmt::Display;
use std::pin::Pin;

use of_protocol::stream_models::StreamEvent;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::stream::error::StreamError;
use crate::stream::framing::{parse_record, LineFramer};

/// A finite, non-restartable sequence of decoded records.
///
/// The stream ends after the first error.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, StreamError>> + Send>>;

/// Turn a stream of byte chunks into an [`EventStream`].
///
/// Every read is raced against `cancel`. Once the token fires, no further
/// record is yielded and `chunks` is dropped, which releases the underlying
/// connection. An unterminated fragment left when `chunks` ends is discarded.
pub fn decode_event_stream<S, B, E>(chunks: S, cancel: CancellationToken) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        tokio::pin!(chunks);
        let mut framer = LineFramer::new();

        'read: loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("event stream cancelled");
                    break 'read;
                }
                next = chunks.next() => next,
            };

            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    yield Err(StreamError::Read(e.to_string()));
                    break 'read;
                }
                None => {
                    if let Some(tail) = std::mem::take(&mut framer).finish() {
                        warn!(bytes = tail.len(), "discarding unterminated trailing record");
                    }
                    break 'read;
                }
            };

            for line in framer.push(chunk.as_ref()) {
                if cancel.is_cancelled() {
                    break 'read;
                }
                match line.and_then(|line| parse_record(&line)) {
                    Ok(event) => yield Ok(event),
                    Err(e) => {
                        yield Err(e);
                        break 'read;
                    }
                }
            }
        }
    })
}

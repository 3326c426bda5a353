//! Event source replaying a fixed script of byte chunks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use of_protocol::stream_models::ChatRequest;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::stream::consumer::{decode_event_stream, EventStream};
use crate::stream::error::{StreamError, StreamResult};
use crate::stream::source::EventSource;

/// Replays byte chunks as if they came off the wire.
///
/// Chunks go through the same framing and decoding as a real response, so
/// a script can split records anywhere. Every submitted request is recorded.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEventSource {
    chunks: Vec<Vec<u8>>,
    read_error: Option<String>,
    open_status: Option<u16>,
    delay: Option<Duration>,
    hold_open: bool,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedEventSource {
    /// Script the given chunks verbatim.
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Script one chunk per line, each terminated by `\n`.
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        Self::from_chunks(lines.into_iter().map(|line| format!("{}\n", line.as_ref())))
    }

    /// Fail the read after the last chunk.
    pub fn with_read_error(mut self, message: impl Into<String>) -> Self {
        self.read_error = Some(message.into());
        self
    }

    /// Refuse the request with a non-success status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.open_status = Some(status);
        self
    }

    /// Wait before delivering each chunk.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Keep the connection open after the last chunk until cancelled.
    pub fn held_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Requests submitted so far.
    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl EventSource for ScriptedEventSource {
    async fn open(
        &self,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> StreamResult<EventStream> {
        self.requests.lock().await.push(request.clone());

        if let Some(status) = self.open_status {
            return Err(StreamError::Status { status });
        }

        let chunks = self.chunks.clone();
        let read_error = self.read_error.clone();
        let delay = self.delay;
        let hold_open = self.hold_open;

        let raw = async_stream::stream! {
            for chunk in chunks {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield Ok::<Vec<u8>, String>(chunk);
            }
            if let Some(message) = read_error {
                yield Err(message);
            }
            if hold_open {
                std::future::pending::<()>().await;
            }
        };

        Ok(decode_event_stream(raw, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use of_protocol::stream_models::StreamEvent;
    use tokio_stream::StreamExt;

    fn request() -> ChatRequest {
        ChatRequest {
            question: "What is the price of banana milk?".to_string(),
            method_id: "method1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_replays_lines_and_records_request() {
        let source = ScriptedEventSource::from_lines([
            r#"{"event":"answer","answer":"1,500 KRW"}"#,
            r#"{"event":"done"}"#,
        ]);

        let stream = source
            .open(&request(), CancellationToken::new())
            .await
            .expect("open succeeds");
        let events: Vec<_> = stream.collect().await;

        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            Ok(StreamEvent::Answer { answer: Some(a) }) if a == "1,500 KRW"
        ));
        assert_eq!(source.requests().await, vec![request()]);
    }

    #[tokio::test]
    async fn test_status_refusal() {
        let source = ScriptedEventSource::default().with_status(503);
        let result = source.open(&request(), CancellationToken::new()).await;
        assert!(matches!(result, Err(StreamError::Status { status: 503 })));
    }
}

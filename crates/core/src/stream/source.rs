//! Event sources: where a run's event stream comes from.

use async_trait::async_trait;
use of_protocol::stream_models::ChatRequest;
use reqwest::header::ACCEPT;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::models::ServerConfig;
use crate::stream::consumer::{decode_event_stream, EventStream};
use crate::stream::error::{StreamError, StreamResult};

/// Opens the event stream of one run.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Submit `request` and return its event stream.
    ///
    /// The returned stream must stop yielding once `cancel` fires.
    async fn open(&self, request: &ChatRequest, cancel: CancellationToken)
        -> StreamResult<EventStream>;
}

/// Streams events from the backend's `POST /api/chat/stream` endpoint.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: reqwest::Client,
    url: String,
}

impl HttpEventSource {
    /// Create a source for the configured backend.
    pub fn new(server: &ServerConfig) -> Self {
        Self::with_client(reqwest::Client::new(), server)
    }

    /// Create a source sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, server: &ServerConfig) -> Self {
        Self {
            client,
            url: server.stream_url(),
        }
    }

    /// The endpoint this source posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn open(
        &self,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> StreamResult<EventStream> {
        debug!(url = %self.url, method_id = %request.method_id, "opening event stream");

        let send = self
            .client
            .post(&self.url)
            .header(ACCEPT, "application/x-ndjson")
            .json(request)
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Ok(Box::pin(tokio_stream::empty()));
            }
            response = send => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status {
                status: status.as_u16(),
            });
        }

        Ok(decode_event_stream(response.bytes_stream(), cancel))
    }
}

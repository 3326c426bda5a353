//! HTTP client for the dashboard document and the health probe.

use std::collections::BTreeMap;

use of_protocol::dashboard_models::DashboardPayload;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::models::ServerConfig;

/// Fetches read-only documents from the backend.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    client: reqwest::Client,
    server: ServerConfig,
}

impl DashboardClient {
    pub fn new(server: ServerConfig) -> Self {
        Self::with_client(reqwest::Client::new(), server)
    }

    /// Construct a client from an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, server: ServerConfig) -> Self {
        Self { client, server }
    }

    /// `GET /api/dashboard`: methods, topologies, examples and status tables.
    #[instrument(name = "dashboard_client.fetch_dashboard", skip(self))]
    pub async fn fetch_dashboard(&self) -> ApiResult<DashboardPayload> {
        self.get_json(self.server.dashboard_url()).await
    }

    /// `GET /health`, e.g. `{"status": "ok"}`.
    #[instrument(name = "dashboard_client.health", skip(self))]
    pub async fn health(&self) -> ApiResult<BTreeMap<String, String>> {
        self.get_json(self.server.health_url()).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> ApiResult<T> {
        debug!(%url, "GET");
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(source) => return Err(ApiError::Request { url, source }),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }
}

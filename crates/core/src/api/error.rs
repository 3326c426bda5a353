//! Error types for the dashboard client.

use thiserror::Error;

/// Errors returned by [`DashboardClient`](crate::api::DashboardClient).
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request failed before a response arrived.
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body was not the expected document.
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        source: reqwest::Error,
    },
}

/// Type alias for Result with ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

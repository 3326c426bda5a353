//! Read-only backend endpoints used outside of runs.

pub mod client;
pub mod error;

pub use client::DashboardClient;
pub use error::{ApiError, ApiResult};

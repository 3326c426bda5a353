//! Configuration models.
//!
//! This module provides the unified `AppConfig` structure read from
//! `.ontoflow/config.toml`. Every section and every key is optional; missing
//! values take the defaults below.

use serde::{Deserialize, Serialize};

/// Unified application configuration.
///
/// # Example
///
/// ```toml
/// # .ontoflow/config.toml
/// [server]
/// base-url = "http://localhost:8000"
///
/// [run]
/// default-method = "method3"
///
/// [layout]
/// row-gap = 140.0
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppConfig {
    /// Where the pipeline backend lives.
    pub server: ServerConfig,

    /// Defaults for operator runs.
    pub run: RunDefaults,

    /// Graph layout constants.
    pub layout: LayoutConfig,
}

/// Backend endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Base URL of the backend, without trailing slash.
    pub base_url: String,

    /// Path of the dashboard document.
    pub dashboard_path: String,

    /// Path of the streaming chat endpoint.
    pub stream_path: String,

    /// Path of the health probe.
    pub health_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            dashboard_path: "/api/dashboard".to_string(),
            stream_path: "/api/chat/stream".to_string(),
            health_path: "/health".to_string(),
        }
    }
}

impl ServerConfig {
    /// Join the base URL with an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Full URL of the dashboard document.
    pub fn dashboard_url(&self) -> String {
        self.url(&self.dashboard_path)
    }

    /// Full URL of the streaming chat endpoint.
    pub fn stream_url(&self) -> String {
        self.url(&self.stream_path)
    }

    /// Full URL of the health probe.
    pub fn health_url(&self) -> String {
        self.url(&self.health_path)
    }
}

/// Defaults applied when the operator starts the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct RunDefaults {
    /// Method selected on startup.
    pub default_method: String,

    /// Question pre-filled in the question box.
    pub default_question: String,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            default_method: "method1".to_string(),
            default_question: "What is the price of banana milk?".to_string(),
        }
    }
}

/// Constants of the stage/task graph layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutConfig {
    /// Horizontal coordinate of each runtime stage band, in canonical order.
    pub stage_x: [f64; 4],

    /// Vertical coordinate of the first row.
    pub base_y: f64,

    /// Vertical distance between rows of one band.
    pub row_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            stage_x: [80.0, 620.0, 1160.0, 1700.0],
            base_y: 120.0,
            row_gap: 120.0,
        }
    }
}

impl LayoutConfig {
    /// Check the invariants the layout engine relies on.
    pub fn validate(&self) -> Result<(), String> {
        if !self.stage_x.iter().all(|x| x.is_finite()) {
            return Err("layout.stage-x must be finite".to_string());
        }
        if !self.base_y.is_finite() {
            return Err("layout.base-y must be finite".to_string());
        }
        if !self.row_gap.is_finite() {
            return Err("layout.row-gap must be finite".to_string());
        }
        if self.stage_x.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("layout.stage-x must be strictly increasing".to_string());
        }
        if self.row_gap <= 0.0 {
            return Err("layout.row-gap must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_urls_join_without_double_slash() {
        let server = ServerConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(server.stream_url(), "http://localhost:8000/api/chat/stream");
        assert_eq!(server.dashboard_url(), "http://localhost:8000/api/dashboard");
        assert_eq!(server.health_url(), "http://localhost:8000/health");
    }

    #[test]
    fn test_default_layout_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_layout_rejects_unordered_bands() {
        let layout = LayoutConfig {
            stage_x: [80.0, 80.0, 1160.0, 1700.0],
            ..LayoutConfig::default()
        };
        assert!(layout.validate().is_err());

        let layout = LayoutConfig {
            row_gap: 0.0,
            ..LayoutConfig::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_layout_rejects_non_finite_values() {
        let layouts = [
            LayoutConfig {
                stage_x: [80.0, f64::NAN, 1160.0, 1700.0],
                ..LayoutConfig::default()
            },
            LayoutConfig {
                stage_x: [80.0, 620.0, 1160.0, f64::INFINITY],
                ..LayoutConfig::default()
            },
            LayoutConfig {
                base_y: f64::NAN,
                ..LayoutConfig::default()
            },
            LayoutConfig {
                row_gap: f64::NAN,
                ..LayoutConfig::default()
            },
        ];
        for layout in layouts {
            assert!(layout.validate().is_err(), "{layout:?} accepted");
        }
    }
}

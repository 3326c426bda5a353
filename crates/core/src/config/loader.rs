//! Configuration file loader for the `.ontoflow/` directory.
//!
//! The only file read is `.ontoflow/config.toml`. A project without the
//! directory or the file runs on defaults.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use std::path::Path;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".ontoflow";

/// Loads the configuration from `<root>/.ontoflow/config.toml`.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.ontoflow/` folder
///
/// # Returns
///
/// The parsed `AppConfig`. If the directory or the file is missing, returns
/// the default configuration rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML or has values of the wrong type
/// - The layout section breaks its invariants
///
/// # Example
///
/// ```rust,no_run
/// use of_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Backend at {}", config.server.base_url);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let config_path = root.join(CONFIG_DIR).join("config.toml");

    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    let content = tokio::fs::read_to_string(&config_path)
        .await
        .map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path.clone(),
        source,
    })?;

    config
        .layout
        .validate()
        .map_err(|reason| ConfigError::InvalidConfig {
            path: config_path,
            reason,
        })?;

    Ok(config)
}

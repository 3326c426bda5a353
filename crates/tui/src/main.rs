//! Standalone entry point for the ontoflow dashboard.
//!
//! Reads `.ontoflow/config.toml` from the current directory; the `ontoflow`
//! binary offers the same dashboard plus headless commands.

use anyhow::Result;
use of_core::config::loader::load_config;
use of_tui::run_app;

#[tokio::main]
async fn main() -> Result<()> {
    let root = std::env::current_dir()?;
    let config = load_config(&root).await?;
    run_app(config).await
}

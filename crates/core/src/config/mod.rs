//! Configuration loading and management.
//!
//! This module provides functionality to load and parse the configuration
//! file from the `.ontoflow/` directory of a project.

pub mod error;
pub mod loader;
pub mod models;

//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality across the integration tests:
//! - Test fixtures (dashboard documents, topologies, stream scripts)
//! - Event assertions

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

//! # of-protocol
//!
//! Core protocol definitions and data models for ontoflow.
//!
//! This crate defines all shared data structures used for:
//! - The static method topology served by `GET /api/dashboard`
//! - The newline-delimited event records of `POST /api/chat/stream`
//! - Per-run stage state and run outcomes
//! - Communication between the terminal UI and the core session
//!
//! ## Modules
//!
//! - [`topology`]: Runtime stages, topology nodes, edges and stage titles
//! - [`dashboard_models`]: The dashboard document wrapping each method's topology
//! - [`run_models`]: Mutable run state and run outcomes
//! - [`stream_models`]: Wire records of the streaming chat endpoint
//! - [`ipc`]: Operations and Events for Core-TUI communication
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, uuid and chrono
//! - TypeScript generation: all types derive `TS` for client compatibility
//! - Independent compilation: no dependencies on other ontoflow crates

pub mod dashboard_models;
pub mod ipc;
pub mod run_models;
pub mod stream_models;
pub mod topology;

// Re-export all public types for convenience
pub use dashboard_models::*;
pub use ipc::*;
pub use run_models::*;
pub use stream_models::*;
pub use topology::*;

//! # of-core
//!
//! Execution-tracking core for ontoflow.
//!
//! This crate provides:
//! - Configuration loading from the `.ontoflow/` directory
//! - Streaming consumption of the backend's NDJSON event stream
//! - The stage template and the stage state machine
//! - Partial runs that stop once a chosen stage has completed
//! - Deterministic layout of the stage/task graph
//! - The session task that serves a user interface
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`stream`]: Framing, decoding and sources of stream events
//! - [`stages`]: Stage template and state machine
//! - [`run`]: Partial-run controller
//! - [`layout`]: Graph layout engine
//! - [`trace`]: Keyword trace of the lookup stage
//! - [`api`]: Dashboard and health endpoints
//! - [`session`]: Op/Event driven session task

pub mod api;
pub mod config;
pub mod layout;
pub mod run;
pub mod session;
pub mod stages;
pub mod stream;
pub mod trace;

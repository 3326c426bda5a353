//! Partial pipeline runs.

pub mod controller;

pub use controller::{RunController, RunRequest, DEFAULT_ERROR_MESSAGE};

//! Stage state for pipeline runs.
//!
//! This module provides:
//! - The stage template a run starts from
//! - The state machine applying `stage` records to a run state

pub mod machine;
pub mod template;

pub use machine::{apply_stage_event, reduce};
pub use template::build_stage_template;

//! TUI widgets module.
//!
//! This module contains the panels of the dashboard.

pub mod graph_view;
pub mod method_panel;
pub mod overview;
pub mod question_input;
pub mod stage_panel;
pub mod trace_panel;

pub use question_input::QuestionInput;
pub use stage_panel::PayloadView;

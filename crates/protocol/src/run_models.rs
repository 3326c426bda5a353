//! Run state models.
//!
//! This module defines the structures for tracking one pipeline invocation:
//! the per-stage state that the event stream mutates, and the outcome the
//! run ends with.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use ts_rs::TS;

use crate::topology::RuntimeStage;

/// Lifecycle status of one runtime stage within a run.
///
/// The status progresses Prep -> Running -> Done for every stage the
/// backend actually exercises.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Not started yet.
    #[default]
    Prep,
    /// The backend reported the stage as running.
    Running,
    /// The backend reported the stage as finished.
    Done,
}

impl StageStatus {
    /// Map a wire status onto a stage status.
    ///
    /// `running` and `done` map onto themselves; every other value,
    /// including unexpected ones, normalizes to [`StageStatus::Prep`].
    pub fn from_wire(value: &str) -> Self {
        match value {
            "running" => StageStatus::Running,
            "done" => StageStatus::Done,
            _ => StageStatus::Prep,
        }
    }

    /// Whether `value` is one of the status words the backend is known to send.
    pub fn is_known_wire_value(value: &str) -> bool {
        matches!(value, "prep" | "running" | "done")
    }

    /// Short operator-facing label.
    pub fn label(self) -> &'static str {
        match self {
            StageStatus::Prep => "ready",
            StageStatus::Running => "running",
            StageStatus::Done => "done",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// State of a single runtime stage during a run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct StageState {
    /// The stage this entry tracks.
    pub stage: RuntimeStage,

    /// Display title.
    pub title: String,

    /// Free text describing what the stage does or is doing.
    pub detail: String,

    /// Current status.
    pub status: StageStatus,

    /// Last input payload reported by the backend, `null` when none.
    pub input: Value,

    /// Last output payload reported by the backend, `null` when none.
    pub output: Value,
}

/// Per-run state of all four runtime stages.
///
/// Backed by a fixed array indexed by [`RuntimeStage`], so no stage can
/// ever be missing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct RunState {
    stages: [StageState; 4],
}

impl RunState {
    /// Build a run state from one entry per stage, in canonical order.
    pub fn new(stages: [StageState; 4]) -> Self {
        Self { stages }
    }

    /// The state of `stage`.
    pub fn get(&self, stage: RuntimeStage) -> &StageState {
        &self.stages[stage.index()]
    }

    /// Mutable access to the state of `stage`.
    pub fn get_mut(&mut self, stage: RuntimeStage) -> &mut StageState {
        &mut self.stages[stage.index()]
    }

    /// Status of `stage`.
    pub fn status_of(&self, stage: RuntimeStage) -> StageStatus {
        self.get(stage).status
    }

    /// Iterate the stages in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &StageState> {
        self.stages.iter()
    }
}

/// Why a run did not complete.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RunFailure {
    /// The question was empty; no request was made.
    EmptyQuestion,
    /// The request, the response stream or a record in it could not be processed.
    Transport { message: String },
    /// The backend sent an explicit `error` record.
    Backend { message: String },
    /// The run was cancelled from outside before its target was reached.
    Aborted,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFailure::EmptyQuestion => f.write_str("Please enter a question."),
            RunFailure::Transport { message } | RunFailure::Backend { message } => {
                f.write_str(message)
            }
            RunFailure::Aborted => f.write_str("The run was cancelled."),
        }
    }
}

/// How a run ended.
///
/// An early stop at the operator's target stage is a normal outcome, not
/// a failure.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum RunOutcome {
    /// The stream ended normally.
    Completed {
        /// Final answer, if the backend sent one.
        answer: Option<String>,
    },
    /// The run was stopped on purpose once `stage` reported completion.
    StoppedAt { stage: RuntimeStage },
    /// The run failed.
    Failed { reason: RunFailure },
}

impl RunOutcome {
    /// Whether the outcome should be reported to the operator as an error.
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&RunFailure> {
        match self {
            RunOutcome::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

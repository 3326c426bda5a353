//! Stage state machine.
//!
//! Applies `stage` records from the event stream to a [`RunState`]. Each
//! record is applied in a single step: status, detail and payloads change
//! together or not at all.

use of_protocol::run_models::{RunState, StageStatus};
use of_protocol::stream_models::StageEvent;
use of_protocol::topology::RuntimeStage;
use tracing::{debug, warn};

/// Apply a `stage` record to `state` in place.
///
/// - Records for stage ids the client does not know are ignored.
/// - The status is always replaced (see [`StageStatus::from_wire`]).
/// - The detail is replaced only by a non-empty message.
/// - `input`/`output` are replaced only when the record carries them; an
///   absent member keeps the previously recorded payload.
///
/// Returns the stage that was updated, or `None` when the record was ignored.
pub fn apply_stage_event(state: &mut RunState, event: &StageEvent) -> Option<RuntimeStage> {
    let Some(stage) = RuntimeStage::parse(&event.stage) else {
        debug!(stage = %event.stage, "ignoring stage record for unknown stage");
        return None;
    };

    if !StageStatus::is_known_wire_value(&event.status) {
        warn!(
            stage = %stage,
            status = %event.status,
            "unrecognized stage status, treating as prep"
        );
    }

    let entry = state.get_mut(stage);
    let status = StageStatus::from_wire(&event.status);
    if entry.status == StageStatus::Done && status != StageStatus::Done {
        warn!(stage = %stage, to = %status, "stage regressed after completion");
    }

    entry.status = status;
    if let Some(message) = event.message.as_deref().filter(|m| !m.is_empty()) {
        entry.detail = message.to_string();
    }
    if let Some(input) = &event.input {
        entry.input = input.clone();
    }
    if let Some(output) = &event.output {
        entry.output = output.clone();
    }

    Some(stage)
}

/// Pure form of [`apply_stage_event`]: `(state, event) -> next state`.
pub fn reduce(state: &RunState, event: &StageEvent) -> RunState {
    let mut next = state.clone();
    apply_stage_event(&mut next, event);
    next
}

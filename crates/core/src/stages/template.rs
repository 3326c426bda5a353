//! Stage template construction.
//!
//! The template is the run state a fresh run starts from: every stage in
//! `Prep`, no payloads, and titles/details derived from the active topology.

use of_protocol::run_models::{RunState, StageState, StageStatus};
use of_protocol::topology::{MethodDag, RuntimeStage};
use serde_json::Value;

/// Separator between node labels in a stage detail.
pub const DETAIL_CONNECTOR: &str = " → ";

/// Title used when the topology does not name a stage.
pub fn fallback_title(stage: RuntimeStage) -> &'static str {
    match stage {
        RuntimeStage::Received => "Question received",
        RuntimeStage::Lookup => "Ontology lookup",
        RuntimeStage::Compare => "Compare / build context",
        RuntimeStage::Generate => "Generate answer",
    }
}

/// Detail used when no topology node maps to a stage.
pub fn fallback_detail(stage: RuntimeStage) -> &'static str {
    match stage {
        RuntimeStage::Received => "Validate the operator input and prepare the run",
        RuntimeStage::Lookup => "Look up facts and relations from the question tokens",
        RuntimeStage::Compare => "Extract priority facts and compress the context",
        RuntimeStage::Generate => "Call the language model and produce the final answer",
    }
}

/// Build the initial run state for a topology.
///
/// Always yields the four runtime stages in canonical order, whatever the
/// number or order of the topology's nodes. Nodes whose runtime stage is
/// missing or unknown contribute to no stage.
pub fn build_stage_template(topology: Option<&MethodDag>) -> RunState {
    RunState::new(RuntimeStage::ALL.map(|stage| StageState {
        stage,
        title: stage_title(topology, stage),
        detail: stage_detail(topology, stage),
        status: StageStatus::Prep,
        input: Value::Null,
        output: Value::Null,
    }))
}

fn stage_title(topology: Option<&MethodDag>, stage: RuntimeStage) -> String {
    topology
        .and_then(|dag| dag.stage_title(stage))
        .unwrap_or_else(|| fallback_title(stage))
        .to_string()
}

fn stage_detail(topology: Option<&MethodDag>, stage: RuntimeStage) -> String {
    let labels: Vec<&str> = topology
        .map(|dag| {
            dag.nodes
                .iter()
                .filter(|node| node.runtime_stage() == Some(stage))
                .map(|node| node.label.as_str())
                .collect()
        })
        .unwrap_or_default();

    if labels.is_empty() {
        fallback_detail(stage).to_string()
    } else {
        labels.join(DETAIL_CONNECTOR)
    }
}

//! Static method topology models.
//!
//! A topology describes one method's internal task graph: the task nodes,
//! the data-flow edges between them and optional titles for the runtime
//! stages. It is served as the `dag` member of each method in the dashboard
//! document and never changes during a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// One of the four fixed phases every pipeline run goes through.
///
/// Every topology node is bucketed into one of these phases for execution
/// tracking and layout. The declaration order is the canonical order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeStage {
    /// The question has been received and validated.
    Received,
    /// Facts and relations are looked up in the ontology.
    Lookup,
    /// Retrieved facts are compared and compressed into a context.
    Compare,
    /// The language model generates the final answer.
    Generate,
}

impl RuntimeStage {
    /// All runtime stages in canonical order.
    pub const ALL: [RuntimeStage; 4] = [
        RuntimeStage::Received,
        RuntimeStage::Lookup,
        RuntimeStage::Compare,
        RuntimeStage::Generate,
    ];

    /// Wire name of the stage.
    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeStage::Received => "received",
            RuntimeStage::Lookup => "lookup",
            RuntimeStage::Compare => "compare",
            RuntimeStage::Generate => "generate",
        }
    }

    /// Strictly parse a wire name. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "received" => Some(RuntimeStage::Received),
            "lookup" => Some(RuntimeStage::Lookup),
            "compare" => Some(RuntimeStage::Compare),
            "generate" => Some(RuntimeStage::Generate),
            _ => None,
        }
    }

    /// Position of the stage in [`RuntimeStage::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this is the last stage of a run.
    ///
    /// Runs targeting the terminal stage are never stopped early.
    pub fn is_terminal(self) -> bool {
        self == RuntimeStage::Generate
    }
}

impl fmt::Display for RuntimeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task node of a method topology.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct TopologyNode {
    /// Identifier, unique within one topology.
    pub id: String,

    /// Human readable label.
    pub label: String,

    /// Runtime stage this node belongs to, as sent by the backend.
    ///
    /// Kept raw so that values the client does not know about survive
    /// deserialization; see [`TopologyNode::runtime_stage`] and
    /// [`TopologyNode::layout_stage`].
    #[serde(default)]
    pub runtime_stage: Option<String>,

    /// Ordering hint within the node's stage.
    #[serde(default)]
    pub lane: i64,

    /// Backend stage identifier (`s1`..`s4`), informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl TopologyNode {
    /// The node's runtime stage, or `None` when missing or unrecognized.
    pub fn runtime_stage(&self) -> Option<RuntimeStage> {
        self.runtime_stage.as_deref().and_then(RuntimeStage::parse)
    }

    /// The stage used to place the node: unrecognized values fall back to
    /// [`RuntimeStage::Received`].
    pub fn layout_stage(&self) -> RuntimeStage {
        self.runtime_stage().unwrap_or(RuntimeStage::Received)
    }
}

/// A directed data-flow edge between two topology nodes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct TopologyEdge {
    /// Source node id.
    pub source: String,

    /// Target node id.
    pub target: String,

    /// Explicit sequence number used as the edge label.
    #[serde(default)]
    pub order: Option<u32>,
}

/// Title override for one runtime stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StageDescriptor {
    /// Backend stage identifier.
    #[serde(default)]
    pub id: String,

    /// Human title shown for the stage.
    pub title: String,

    /// Runtime stage the title applies to.
    pub runtime_stage: String,
}

/// The task graph of one method.
///
/// # Example
///
/// ```json
/// {
///   "stages": [{ "id": "s1", "title": "1) Query Understanding", "runtime_stage": "received" }],
///   "nodes": [{ "id": "n01", "label": "Parse question", "lane": 0, "runtime_stage": "received" }],
///   "edges": []
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct MethodDag {
    /// Task nodes in topology order.
    #[serde(default)]
    pub nodes: Vec<TopologyNode>,

    /// Data-flow edges in topology order.
    #[serde(default)]
    pub edges: Vec<TopologyEdge>,

    /// Stage title overrides.
    #[serde(default)]
    pub stages: Vec<StageDescriptor>,
}

impl MethodDag {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&TopologyNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// The title the topology assigns to `stage`, if any.
    pub fn stage_title(&self, stage: RuntimeStage) -> Option<&str> {
        self.stages
            .iter()
            .find(|descriptor| descriptor.runtime_stage == stage.as_str())
            .map(|descriptor| descriptor.title.as_str())
            .filter(|title| !title.is_empty())
    }
}

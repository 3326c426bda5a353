//! Deterministic placement of topology nodes into stage bands.

use of_protocol::run_models::{RunState, StageStatus};
use of_protocol::topology::{MethodDag, RuntimeStage};

use crate::config::models::LayoutConfig;

/// A point in layout space. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Presentation hint for a node's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Plain task card.
    Card,
    /// Branching step; its label asks a question.
    Decision,
}

/// Direction class of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFlow {
    /// Both endpoints are in the same stage band (vertical).
    SameStage,
    /// The endpoints are in different stage bands (horizontal).
    CrossStage,
}

/// A topology node with its computed placement and live status.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub id: String,
    /// `"NN. label"`, numbered by topology position.
    pub display_label: String,
    pub label: String,
    pub stage: RuntimeStage,
    pub status: StageStatus,
    pub kind: NodeKind,
    pub position: Position,
}

/// A topology edge with its derived classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub flow: EdgeFlow,
    pub sequence: u32,
}

/// Result of a layout pass. Nodes and edges keep topology order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphLayout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<RoutedEdge>,
}

impl GraphLayout {
    /// Find a node by id.
    pub fn node(&self, node_id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    /// The runtime stage a node belongs to; the target of a run started
    /// from that node.
    pub fn stage_of(&self, node_id: &str) -> Option<RuntimeStage> {
        self.node(node_id).map(|node| node.stage)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Lay out `topology` for the given run state.
///
/// Nodes are bucketed by runtime stage (unknown stages fall into
/// `received`). Each bucket occupies the fixed x of its band; inside it, nodes
/// are stably sorted by lane and stacked `row_gap` apart from `base_y`.
pub fn compute_layout(
    topology: Option<&MethodDag>,
    state: &RunState,
    config: &LayoutConfig,
) -> GraphLayout {
    let Some(dag) = topology else {
        return GraphLayout::default();
    };

    let mut buckets: [Vec<usize>; 4] = Default::default();
    for (index, node) in dag.nodes.iter().enumerate() {
        buckets[node.layout_stage().index()].push(index);
    }

    let mut positions = vec![Position { x: 0.0, y: 0.0 }; dag.nodes.len()];
    for (stage, bucket) in RuntimeStage::ALL.iter().zip(buckets.iter_mut()) {
        // sort_by_key is stable: equal lanes keep topology order
        bucket.sort_by_key(|&index| dag.nodes[index].lane);
        for (row, &index) in bucket.iter().enumerate() {
            positions[index] = Position {
                x: config.stage_x[stage.index()],
                y: config.base_y + config.row_gap * row as f64,
            };
        }
    }

    let nodes = dag
        .nodes
        .iter()
        .zip(positions)
        .enumerate()
        .map(|(index, (node, position))| {
            let stage = node.layout_stage();
            PositionedNode {
                id: node.id.clone(),
                display_label: format!("{:02}. {}", index + 1, node.label),
                label: node.label.clone(),
                stage,
                status: state.status_of(stage),
                kind: if node.label.contains('?') {
                    NodeKind::Decision
                } else {
                    NodeKind::Card
                },
                position,
            }
        })
        .collect();

    let endpoint_stage = |id: &str| {
        dag.node(id)
            .map(|node| node.layout_stage())
            .unwrap_or(RuntimeStage::Received)
    };

    let edges = dag
        .edges
        .iter()
        .enumerate()
        .map(|(index, edge)| {
            let sequence = edge
                .order
                .filter(|&order| order > 0)
                .unwrap_or(index as u32 + 1);
            let flow = if endpoint_stage(&edge.source) == endpoint_stage(&edge.target) {
                EdgeFlow::SameStage
            } else {
                EdgeFlow::CrossStage
            };
            RoutedEdge {
                id: format!("e{sequence}"),
                source: edge.source.clone(),
                target: edge.target.clone(),
                flow,
                sequence,
            }
        })
        .collect();

    GraphLayout { nodes, edges }
}

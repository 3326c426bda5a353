//! Positions that survive re-layout.

use std::collections::HashMap;

use crate::layout::engine::{GraphLayout, Position};

/// Remembers node positions across layout passes.
///
/// A node id seen before keeps its previous position, whether computed or
/// moved by the operator; only its styling follows the new pass. New ids take
/// their fresh position and ids absent from a pass are forgotten.
#[derive(Debug, Clone, Default)]
pub struct StickyLayout {
    positions: HashMap<String, Position>,
}

impl StickyLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a freshly computed layout with the remembered positions.
    pub fn apply(&mut self, mut layout: GraphLayout) -> GraphLayout {
        let mut next = HashMap::with_capacity(layout.nodes.len());
        for node in &mut layout.nodes {
            if let Some(previous) = self.positions.get(&node.id) {
                node.position = *previous;
            }
            next.insert(node.id.clone(), node.position);
        }
        self.positions = next;
        layout
    }

    /// Record an operator adjustment. Returns `false` for unknown ids.
    pub fn move_node(&mut self, node_id: &str, position: Position) -> bool {
        match self.positions.get_mut(node_id) {
            Some(slot) => {
                *slot = position;
                true
            }
            None => false,
        }
    }

    pub fn position(&self, node_id: &str) -> Option<Position> {
        self.positions.get(node_id).copied()
    }

    /// Forget every position, e.g. when another method is selected.
    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

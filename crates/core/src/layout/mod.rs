//! Stage/task graph layout.
//!
//! [`compute_layout`] is a pure function of the topology, the live run state
//! and the layout constants. It produces abstract positioned nodes and routed
//! edges; drawing them is left to the rendering surface.

pub mod engine;
pub mod sticky;

pub use engine::{
    compute_layout, EdgeFlow, GraphLayout, NodeKind, Position, PositionedNode, RoutedEdge,
};
pub use sticky::StickyLayout;

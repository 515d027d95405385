//! Graph model: the validated tables as a petgraph `DiGraph`, plus the
//! serializable view handed to the interactive page.

pub mod graph;
pub mod view;

pub use graph::{ArchitectureGraph, GraphSummary};
pub use view::{DiagramView, EdgeView, LABEL_OFFSET, NodeView, build_view};

use crate::layout::Layout;
use crate::spec::Diagram;

use serde::Serialize;
use std::collections::BTreeMap;

/// Gap between a node's rim and its label baseline, in pixels.
pub const LABEL_OFFSET: f64 = 16.0;

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub label: String,
    pub description: Option<String>,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeView {
    pub index: usize,
    pub source: String,
    pub target: String,
}

/// Payload embedded in the interactive page; the script reads node geometry
/// from here when re-clipping edges during a drag.
#[derive(Debug, Clone, Serialize)]
pub struct DiagramView {
    pub title: String,
    pub label_offset: f64,
    pub nodes: BTreeMap<String, NodeView>,
    pub edges: Vec<EdgeView>,
}

pub fn build_view(diagram: &Diagram, layout: &Layout) -> DiagramView {
    let nodes = diagram
        .nodes
        .iter()
        .zip(&layout.nodes)
        .map(|(node, placed)| {
            (
                node.id.clone(),
                NodeView {
                    label: node.label.clone(),
                    description: node.description.clone(),
                    color: node.color.clone(),
                    x: round2(placed.center.x),
                    y: round2(placed.center.y),
                    r: placed.radius,
                },
            )
        })
        .collect();

    let edges = layout
        .edges
        .iter()
        .map(|e| EdgeView {
            index: e.index,
            source: e.source.clone(),
            target: e.target.clone(),
        })
        .collect();

    DiagramView {
        title: diagram.title.clone(),
        label_offset: LABEL_OFFSET,
        nodes,
        edges,
    }
}

/// Match the two-decimal precision used in the SVG markup.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

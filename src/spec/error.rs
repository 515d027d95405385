//! Validation failures for diagram files.

use std::fmt;

/// Which end of an edge a reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Target => f.write_str("target"),
        }
    }
}

/// Every way a diagram file can be rejected.
///
/// Travels inside `anyhow::Error`; recover the kind with `downcast_ref`.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramError {
    EmptyDiagram,
    InvalidNodeId {
        id: String,
    },
    DuplicateNode {
        id: String,
    },
    DuplicateCategory {
        id: String,
    },
    UnknownCategory {
        node: String,
        category: String,
    },
    InvalidColor {
        owner: String,
        color: String,
    },
    MissingColor {
        node: String,
    },
    InvalidSize {
        node: String,
        size: f64,
    },
    InvalidPosition {
        node: String,
    },
    UnknownNodeReference {
        edge: usize,
        endpoint: Endpoint,
        id: String,
    },
    SelfLoop {
        edge: usize,
        id: String,
    },
    DuplicateEdge {
        edge: usize,
        source: String,
        target: String,
    },
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramError::EmptyDiagram => write!(f, "diagram must contain at least 1 node"),
            DiagramError::InvalidNodeId { id } => write!(
                f,
                "invalid node id {:?}: must start with a letter and contain only letters, digits, '_' or '-'",
                id
            ),
            DiagramError::DuplicateNode { id } => write!(f, "duplicate node id in diagram: {}", id),
            DiagramError::DuplicateCategory { id } => {
                write!(f, "duplicate category id in diagram: {}", id)
            }
            DiagramError::UnknownCategory { node, category } => write!(
                f,
                "node {} references unknown category {}",
                node, category
            ),
            DiagramError::InvalidColor { owner, color } => {
                write!(f, "{} has invalid color {:?}", owner, color)
            }
            DiagramError::MissingColor { node } => write!(
                f,
                "node {} has neither a color nor a category to take one from",
                node
            ),
            DiagramError::InvalidSize { node, size } => write!(
                f,
                "node {} has size {} (expected a radius in (0, 200])",
                node, size
            ),
            DiagramError::InvalidPosition { node } => {
                write!(f, "node {} has a non-finite position", node)
            }
            DiagramError::UnknownNodeReference { edge, endpoint, id } => write!(
                f,
                "edge #{} references unknown {} node: {}",
                edge, endpoint, id
            ),
            DiagramError::SelfLoop { edge, id } => {
                write!(f, "edge #{} connects node {} to itself", edge, id)
            }
            DiagramError::DuplicateEdge {
                edge,
                source,
                target,
            } => write!(f, "edge #{} duplicates {} -> {}", edge, source, target),
        }
    }
}

impl std::error::Error for DiagramError {}

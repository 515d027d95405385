use crate::Result;
use crate::spec::{Diagram, DiagramError, Endpoint};

use anyhow::bail;
use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Directed component graph. Node weights are node ids, edge weights are
/// indices into the edge table. Insertion follows table order.
#[derive(Debug, Clone)]
pub struct ArchitectureGraph {
    graph: DiGraph<String, usize>,
    index: BTreeMap<String, NodeIndex>,
    standalone: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub orphans: Vec<String>,
    pub entry_points: Vec<String>,
    pub acyclic: bool,
    /// Node id -> sorted direct successors; nodes without any are omitted.
    pub successors: BTreeMap<String, Vec<String>>,
}

impl ArchitectureGraph {
    /// Build the graph. Edge endpoints are resolved again here so a
    /// hand-assembled `Diagram` fails the same way a file would.
    ///
    /// Warns (log) about nodes with no edges unless marked standalone.
    pub fn build(diagram: &Diagram) -> Result<Self> {
        let mut graph = DiGraph::with_capacity(diagram.nodes.len(), diagram.edges.len());
        let mut index = BTreeMap::new();
        let mut standalone = BTreeSet::new();

        for node in &diagram.nodes {
            let ix = graph.add_node(node.id.clone());
            index.insert(node.id.clone(), ix);
            if node.standalone {
                standalone.insert(node.id.clone());
            }
        }

        for edge in &diagram.edges {
            let Some(&src) = index.get(&edge.source) else {
                bail!(DiagramError::UnknownNodeReference {
                    edge: edge.index,
                    endpoint: Endpoint::Source,
                    id: edge.source.clone(),
                });
            };
            let Some(&dst) = index.get(&edge.target) else {
                bail!(DiagramError::UnknownNodeReference {
                    edge: edge.index,
                    endpoint: Endpoint::Target,
                    id: edge.target.clone(),
                });
            };
            graph.add_edge(src, dst, edge.index);
        }

        let built = Self {
            graph,
            index,
            standalone,
        };
        for id in built.orphans() {
            log::warn!("node '{}' has no connections (mark it standalone if intended)", id);
        }
        Ok(built)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes without any incident edge that are not marked standalone.
    pub fn orphans(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|&ix| self.graph.neighbors_undirected(ix).next().is_none())
            .map(|ix| self.graph[ix].clone())
            .filter(|id| !self.standalone.contains(id))
            .collect()
    }

    /// Nodes with no incoming edge, in table order.
    pub fn entry_points(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|&ix| {
                self.graph
                    .neighbors_directed(ix, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|ix| self.graph[ix].clone())
            .collect()
    }

    /// Direct successors of `id`, sorted. Empty for unknown ids.
    pub fn successors(&self, id: &str) -> Vec<String> {
        let Some(&ix) = self.index.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<String> = self
            .graph
            .neighbors_directed(ix, Direction::Outgoing)
            .map(|n| self.graph[n].clone())
            .collect();
        out.sort();
        out
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            orphans: self.orphans(),
            entry_points: self.entry_points(),
            acyclic: !is_cyclic_directed(&self.graph),
            successors: self
                .index
                .keys()
                .map(|id| (id.clone(), self.successors(id)))
                .filter(|(_, next)| !next.is_empty())
                .collect(),
        }
    }
}

//! Undirected petgraph view of an edge list.

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::types::{Edge, EdgeType, EntityId};

/// Weighted undirected co-occurrence graph.
///
/// Nodes are the entities touched by at least one edge; isolated entities
/// are not represented.
#[derive(Debug, Default)]
pub struct CooccurrenceGraph {
    graph: UnGraph<EntityId, (usize, EdgeType)>,
    /// Fast lookup: entity -> NodeIndex
    index: HashMap<EntityId, NodeIndex>,
}

impl CooccurrenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// Idempotent - returns the existing index if already present.
    fn add_entity(&mut self, id: &EntityId) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(Arc::clone(id));
        self.index.insert(Arc::clone(id), idx);
        idx
    }

    pub fn add_edge(&mut self, edge: &Edge) {
        let a = self.add_entity(&edge.source);
        let b = self.add_entity(&edge.target);
        self.graph.update_edge(a, b, (edge.weight, edge.edge_type));
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.index.contains_key(entity)
    }

    /// Neighbors of `entity`, sorted by id. Empty for unknown entities.
    pub fn neighbors(&self, entity: &str) -> Vec<EntityId> {
        let Some(&idx) = self.index.get(entity) else {
            return Vec::new();
        };
        let mut out: Vec<EntityId> = self
            .graph
            .neighbors(idx)
            .map(|n| Arc::clone(&self.graph[n]))
            .collect();
        out.sort();
        out
    }

    pub fn degree(&self, entity: &str) -> usize {
        self.index
            .get(entity)
            .map(|&idx| self.graph.neighbors(idx).count())
            .unwrap_or(0)
    }

    /// Sum of edge weights incident to `entity`.
    pub fn strength(&self, entity: &str) -> usize {
        let Some(&idx) = self.index.get(entity) else {
            return 0;
        };
        self.graph.edges(idx).map(|e| e.weight().0).sum()
    }

    pub fn weight(&self, a: &str, b: &str) -> Option<usize> {
        let (&ia, &ib) = (self.index.get(a)?, self.index.get(b)?);
        let edge = self.graph.find_edge(ia, ib)?;
        Some(self.graph[edge].0)
    }

    /// Number of connected components among represented entities.
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }
}

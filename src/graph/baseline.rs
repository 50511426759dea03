//! Explicit-only co-occurrence graph.
//!
//! This is the graph the curated tags alone produce. Its connected entities
//! are the reference point for counting rescued nodes.

use std::sync::Arc;

use crate::inference::{EdgeRebuilder, RebuiltGraph};
use crate::types::{BaselineConnectivity, Edge, ExplicitTagIndex};

/// Co-occurrence graph from explicit tags only; every edge is `explicit`.
pub fn explicit_graph(explicit: &ExplicitTagIndex, min_edge_weight: usize) -> RebuiltGraph {
    EdgeRebuilder::new(min_edge_weight).rebuild(explicit, &[])
}

impl BaselineConnectivity {
    /// Entities appearing as an endpoint of any edge.
    pub fn from_edges(edges: &[Edge]) -> Self {
        edges
            .iter()
            .flat_map(|edge| [Arc::clone(&edge.source), Arc::clone(&edge.target)])
            .collect()
    }

    /// Connectivity of the explicit-only graph at `min_edge_weight`.
    pub fn from_explicit(explicit: &ExplicitTagIndex, min_edge_weight: usize) -> Self {
        Self::from_edges(&explicit_graph(explicit, min_edge_weight).edges)
    }
}

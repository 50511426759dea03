//! Comparison of a rebuilt graph against the explicit-only baseline.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::cooccurrence::CooccurrenceGraph;
use crate::types::{BaselineConnectivity, Edge, EntityId};

/// Weight change on a pair present in both graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeChange {
    pub source: EntityId,
    pub target: EntityId,
    pub before: usize,
    pub after: usize,
}

/// What implicit tags changed about the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDiff {
    /// Connected in the rebuilt graph, absent from baseline connectivity.
    pub rescued: Vec<EntityId>,
    /// Rebuilt edges whose pair has no baseline edge.
    pub added: Vec<Edge>,
    /// Pairs whose weight grew.
    pub strengthened: Vec<EdgeChange>,
    /// Baseline pairs missing from the rebuilt graph (only possible when
    /// the two were cut at different minimum weights).
    pub removed: Vec<Edge>,
    pub unchanged: usize,
    pub components_before: usize,
    pub components_after: usize,
}

impl GraphDiff {
    /// Diff two edge lists. All output vectors are sorted by pair.
    pub fn between(baseline_edges: &[Edge], rebuilt_edges: &[Edge], baseline: &BaselineConnectivity) -> Self {
        let before: BTreeMap<(&str, &str), &Edge> = baseline_edges.iter().map(|e| (e.key(), e)).collect();
        let after: BTreeMap<(&str, &str), &Edge> = rebuilt_edges.iter().map(|e| (e.key(), e)).collect();

        let mut diff = GraphDiff::default();

        for (key, &edge) in &after {
            match before.get(key) {
                None => diff.added.push(edge.clone()),
                Some(old) if edge.weight > old.weight => diff.strengthened.push(EdgeChange {
                    source: Arc::clone(&edge.source),
                    target: Arc::clone(&edge.target),
                    before: old.weight,
                    after: edge.weight,
                }),
                Some(_) => diff.unchanged += 1,
            }
        }
        diff.removed = before
            .iter()
            .filter(|(key, _)| !after.contains_key(*key))
            .map(|(_, &edge)| edge.clone())
            .collect();

        let rebuilt = CooccurrenceGraph::from_edges(rebuilt_edges);
        let mut rescued: Vec<EntityId> = rebuilt_edges
            .iter()
            .flat_map(|e| [&e.source, &e.target])
            .filter(|id| !baseline.contains(id))
            .cloned()
            .collect();
        rescued.sort();
        rescued.dedup();
        diff.rescued = rescued;

        diff.components_before = CooccurrenceGraph::from_edges(baseline_edges).component_count();
        diff.components_after = rebuilt.component_count();
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.rescued.is_empty() && self.added.is_empty() && self.strengthened.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::explicit_graph;
    use crate::inference::rebuild_edges;
    use crate::types::{CandidateTag, ExplicitTagIndex};

    #[test]
    fn test_diff_after_implicit_tags() {
        let explicit: ExplicitTagIndex = vec![
            ("e1", vec!["kaladin", "syl"]),
            ("e2", vec!["kaladin", "syl"]),
            ("e3", vec!["hoid"]),
            ("e4", vec!["vin", "elend"]),
        ]
        .into_iter()
        .collect();
        let baseline_graph = explicit_graph(&explicit, 1);
        let baseline = BaselineConnectivity::from_edges(&baseline_graph.edges);

        let implicit = vec![
            CandidateTag::new("hoid", "e1", 0.7),
            CandidateTag::new("syl", "e3", 0.8),
            CandidateTag::new("vin", "e2", 0.71),
        ];
        let rebuilt = rebuild_edges(&explicit, &implicit, 1);
        let diff = GraphDiff::between(&baseline_graph.edges, &rebuilt.edges, &baseline);

        let rescued: Vec<&str> = diff.rescued.iter().map(|id| &**id).collect();
        assert_eq!(rescued, vec!["hoid"]);

        // hoid-kaladin, hoid-syl, kaladin-vin, syl-vin are new.
        let added: Vec<(&str, &str)> = diff.added.iter().map(|e| e.key()).collect();
        assert_eq!(
            added,
            vec![("hoid", "kaladin"), ("hoid", "syl"), ("kaladin", "vin"), ("syl", "vin")]
        );
        assert!(diff.strengthened.is_empty());
        assert_eq!(diff.unchanged, 2);
        assert!(diff.removed.is_empty());
        assert_eq!(diff.components_before, 2);
        assert_eq!(diff.components_after, 1);
        assert!(!diff.is_empty());
    }

    #[test]
    fn test_strengthened_edges() {
        let explicit: ExplicitTagIndex = vec![("e1", vec!["a", "b"]), ("e2", vec!["a"])].into_iter().collect();
        let baseline_graph = explicit_graph(&explicit, 1);
        let baseline = BaselineConnectivity::from_edges(&baseline_graph.edges);
        let rebuilt = rebuild_edges(&explicit, &[CandidateTag::new("b", "e2", 0.9)], 1);

        let diff = GraphDiff::between(&baseline_graph.edges, &rebuilt.edges, &baseline);
        assert_eq!(
            diff.strengthened,
            vec![EdgeChange {
                source: "a".into(),
                target: "b".into(),
                before: 1,
                after: 2,
            }]
        );
        assert!(diff.rescued.is_empty());
    }

    #[test]
    fn test_identical_graphs() {
        let explicit: ExplicitTagIndex = vec![("e1", vec!["a", "b"])].into_iter().collect();
        let graph = explicit_graph(&explicit, 1);
        let baseline = BaselineConnectivity::from_edges(&graph.edges);
        let diff = GraphDiff::between(&graph.edges, &graph.edges, &baseline);
        assert!(diff.is_empty());
        assert_eq!(diff.unchanged, 1);
    }
}

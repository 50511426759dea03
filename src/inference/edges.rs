//! Co-occurrence graph rebuilding from explicit + implicit tags.
//!
//! Two entities share an edge once per entry on which both appear, whether
//! they got there explicitly or implicitly. Each edge remembers whether any
//! contributing co-occurrence involved an implicit-only side and whether any
//! involved a side that was not implicit-only:
//!
//! ```text
//! has_implicit && has_explicit  -> mixed
//! has_implicit                  -> implicit
//! otherwise                     -> explicit
//! ```
//!
//! The flags aggregate across entries, so an edge whose implicit support
//! comes from one entry and explicit support from another is `mixed`.
//!
//! Weight is the count of distinct contributing entries. It only grows while
//! accumulating; the minimum weight cutoff is applied once at the end.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{CandidateTag, Edge, EdgeType, EntityId, EntryId, ExplicitTagIndex};

/// Minimum co-occurrence count kept when the caller does not choose one.
pub const DEFAULT_MIN_EDGE_WEIGHT: usize = 2;

/// Counters describing one rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStats {
    /// Implicit tags handed to the rebuild (duplicates included).
    pub total_implicit_tags: usize,
    pub total_edges: usize,
    pub implicit_edges: usize,
    pub mixed_edges: usize,
    pub explicit_edges: usize,
    pub connected_entities: usize,
}

/// Edges surviving the weight cutoff, with their statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuiltGraph {
    /// Sorted by (source, target).
    pub edges: Vec<Edge>,
    pub stats: EdgeStats,
    /// Entities appearing in at least one surviving edge.
    pub connected: BTreeSet<EntityId>,
}

/// Canonical (source, target) ordering for an unordered entity pair.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Edge type from the aggregated contribution flags.
pub fn classify(has_implicit: bool, has_explicit: bool) -> EdgeType {
    match (has_implicit, has_explicit) {
        (true, true) => EdgeType::Mixed,
        (true, false) => EdgeType::Implicit,
        _ => EdgeType::Explicit,
    }
}

#[derive(Default)]
struct PairAccumulator<'a> {
    weight: usize,
    entry_ids: Vec<&'a EntryId>,
    has_implicit: bool,
    has_explicit: bool,
}

/// Merges explicit and implicit tags per entry into a weighted edge list.
pub struct EdgeRebuilder {
    min_edge_weight: usize,
}

impl EdgeRebuilder {
    pub fn new(min_edge_weight: usize) -> Self {
        Self { min_edge_weight }
    }

    /// Rebuild the co-occurrence graph.
    ///
    /// Steps:
    /// 1. Mark (entity, entry) pairs that are implicit-only; an implicit tag
    ///    duplicating an explicit one is ignored for typing.
    /// 2. Union explicit and implicit entities per entry (deduplicated).
    /// 3. Count every unordered pair per entry, recording the entry.
    /// 4. Classify, drop edges below the minimum weight, collect statistics.
    pub fn rebuild(&self, explicit: &ExplicitTagIndex, implicit: &[CandidateTag]) -> RebuiltGraph {
        let implicit_only: HashSet<(&str, &str)> = implicit
            .iter()
            .filter(|tag| !explicit.contains(&tag.entry_id, &tag.entity))
            .map(|tag| (&*tag.entity, &*tag.entry_id))
            .collect();

        let mut combined: BTreeMap<&EntryId, BTreeSet<&EntityId>> = BTreeMap::new();
        for (entry_id, entities) in explicit.iter() {
            combined.entry(entry_id).or_default().extend(entities.iter());
        }
        for tag in implicit {
            combined.entry(&tag.entry_id).or_default().insert(&tag.entity);
        }

        let mut pairs: BTreeMap<(&EntityId, &EntityId), PairAccumulator<'_>> = BTreeMap::new();
        for (&entry_id, entities) in &combined {
            // Ascending set order makes every (a, b) with a before b canonical.
            let tags: Vec<&EntityId> = entities.iter().copied().collect();
            for (i, &a) in tags.iter().enumerate() {
                let a_implicit = implicit_only.contains(&(&**a, &**entry_id));
                for &b in &tags[i + 1..] {
                    let b_implicit = implicit_only.contains(&(&**b, &**entry_id));
                    let acc = pairs.entry((a, b)).or_default();
                    acc.weight += 1;
                    acc.entry_ids.push(entry_id);
                    if a_implicit || b_implicit {
                        acc.has_implicit = true;
                    }
                    if !a_implicit || !b_implicit {
                        acc.has_explicit = true;
                    }
                }
            }
        }

        let mut stats = EdgeStats {
            total_implicit_tags: implicit.len(),
            ..Default::default()
        };
        let mut connected: BTreeSet<EntityId> = BTreeSet::new();
        let mut edges = Vec::new();

        for ((source, target), acc) in pairs {
            if acc.weight < self.min_edge_weight {
                continue;
            }
            let edge_type = classify(acc.has_implicit, acc.has_explicit);
            match edge_type {
                EdgeType::Mixed => stats.mixed_edges += 1,
                EdgeType::Implicit => stats.implicit_edges += 1,
                EdgeType::Explicit => stats.explicit_edges += 1,
            }
            connected.insert(Arc::clone(source));
            connected.insert(Arc::clone(target));
            edges.push(Edge {
                source: Arc::clone(source),
                target: Arc::clone(target),
                weight: acc.weight,
                edge_type,
                entry_ids: acc.entry_ids.into_iter().cloned().collect(),
            });
        }

        stats.total_edges = edges.len();
        stats.connected_entities = connected.len();

        RebuiltGraph {
            edges,
            stats,
            connected,
        }
    }
}

impl Default for EdgeRebuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_EDGE_WEIGHT)
    }
}

/// Functional shorthand for [`EdgeRebuilder::rebuild`].
pub fn rebuild_edges(
    explicit: &ExplicitTagIndex,
    implicit: &[CandidateTag],
    min_edge_weight: usize,
) -> RebuiltGraph {
    EdgeRebuilder::new(min_edge_weight).rebuild(explicit, implicit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(pairs: Vec<(&str, Vec<&str>)>) -> ExplicitTagIndex {
        pairs.into_iter().collect()
    }

    fn find<'a>(graph: &'a RebuiltGraph, a: &str, b: &str) -> Option<&'a Edge> {
        let key = canonical_pair(a, b);
        graph.edges.iter().find(|e| e.key() == key)
    }

    #[test]
    fn test_canonical_pair() {
        assert_eq!(canonical_pair("syl", "kaladin"), ("kaladin", "syl"));
        assert_eq!(canonical_pair("kaladin", "syl"), ("kaladin", "syl"));
    }

    #[test]
    fn test_two_shared_entries_make_one_edge() {
        let explicit = index(vec![("e1", vec!["a", "b"]), ("e2", vec!["b", "a"])]);
        let graph = rebuild_edges(&explicit, &[], 2);

        assert_eq!(graph.edges.len(), 1);
        let edge = &graph.edges[0];
        assert_eq!(edge.key(), ("a", "b"));
        assert_eq!(edge.weight, 2);
        assert_eq!(edge.edge_type, EdgeType::Explicit);
        let entries: Vec<&str> = edge.entry_ids.iter().map(|e| &**e).collect();
        assert_eq!(entries, vec!["e1", "e2"]);
    }

    #[test]
    fn test_single_shared_entry_below_cutoff() {
        let explicit = index(vec![("e1", vec!["a", "b"])]);
        let graph = rebuild_edges(&explicit, &[], 2);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.stats.connected_entities, 0);
    }

    #[test]
    fn test_implicit_only_pair() {
        let implicit = vec![
            CandidateTag::new("a", "e1", 0.9),
            CandidateTag::new("b", "e1", 0.8),
        ];
        let graph = rebuild_edges(&ExplicitTagIndex::new(), &implicit, 1);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].edge_type, EdgeType::Implicit);
        assert_eq!(graph.stats.implicit_edges, 1);
        assert_eq!(graph.stats.total_implicit_tags, 2);
    }

    #[test]
    fn test_implicit_with_explicit_partner_is_mixed() {
        let explicit = index(vec![("e1", vec!["c"])]);
        let implicit = vec![CandidateTag::new("a", "e1", 0.9)];
        let graph = rebuild_edges(&explicit, &implicit, 1);
        assert_eq!(find(&graph, "a", "c").unwrap().edge_type, EdgeType::Mixed);
    }

    #[test]
    fn test_mixed_aggregates_across_entries() {
        // Explicit support on e1, implicit-only support on e2.
        let explicit = index(vec![("e1", vec!["a", "b"])]);
        let implicit = vec![
            CandidateTag::new("a", "e2", 0.9),
            CandidateTag::new("b", "e2", 0.9),
        ];
        let graph = rebuild_edges(&explicit, &implicit, 2);
        let edge = find(&graph, "a", "b").unwrap();
        assert_eq!(edge.weight, 2);
        assert_eq!(edge.edge_type, EdgeType::Mixed);
    }

    #[test]
    fn test_implicit_duplicate_of_explicit_is_ignored() {
        let explicit = index(vec![("e1", vec!["a", "b"])]);
        let implicit = vec![CandidateTag::new("a", "e1", 0.9)];
        let graph = rebuild_edges(&explicit, &implicit, 1);
        let edge = find(&graph, "a", "b").unwrap();
        assert_eq!(edge.weight, 1);
        assert_eq!(edge.edge_type, EdgeType::Explicit);
    }

    #[test]
    fn test_duplicate_implicit_tags_count_once() {
        let implicit = vec![
            CandidateTag::new("a", "e1", 0.9),
            CandidateTag::new("a", "e1", 0.7),
            CandidateTag::new("b", "e1", 0.8),
        ];
        let graph = rebuild_edges(&ExplicitTagIndex::new(), &implicit, 1);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].weight, 1);
    }

    #[test]
    fn test_stats_and_connected_set() {
        let explicit = index(vec![("e1", vec!["a", "b", "c"]), ("e2", vec!["a", "b"])]);
        let implicit = vec![
            CandidateTag::new("d", "e1", 0.9),
            CandidateTag::new("d", "e2", 0.9),
        ];
        let graph = rebuild_edges(&explicit, &implicit, 2);

        // a-b explicit (2), a-d mixed (2), b-d mixed (2); c pairs only weigh 1.
        assert_eq!(graph.stats.total_edges, 3);
        assert_eq!(graph.stats.explicit_edges, 1);
        assert_eq!(graph.stats.mixed_edges, 2);
        assert_eq!(graph.stats.implicit_edges, 0);
        assert_eq!(graph.stats.connected_entities, 3);
        assert!(!graph.connected.contains("c"));

        let keys: Vec<(&str, &str)> = graph.edges.iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec![("a", "b"), ("a", "d"), ("b", "d")]);
    }

    #[test]
    fn test_classify_table() {
        assert_eq!(classify(true, true), EdgeType::Mixed);
        assert_eq!(classify(true, false), EdgeType::Implicit);
        assert_eq!(classify(false, true), EdgeType::Explicit);
        assert_eq!(classify(false, false), EdgeType::Explicit);
    }
}

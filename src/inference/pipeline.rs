//! End-to-end orchestration of one inference run.
//!
//! Stage order is fixed: specificity, candidates, margin, bridge, rebuild.
//! The margin stage runs only for a positive margin and the bridge stage only
//! when enabled. A run either produces a complete result or fails with
//! [`TaggingError::MissingCalibration`](crate::error::TaggingError); there is
//! no partial output.

use tracing::{debug, info};

use super::bridge::apply_must_bridge_filter;
use super::candidates::CandidateGenerator;
use super::edges::EdgeRebuilder;
use super::margin::apply_margin_filter;
use super::specificity::filter_by_specificity;
use crate::error::Result;
use crate::types::{
    BaselineConnectivity, ExplicitTagIndex, InferenceResult, InferenceStats, ScoreTable, Settings,
};

/// Runs the full pipeline under one set of [`Settings`].
///
/// Holds no state between runs; calling [`run`](Self::run) twice with the
/// same inputs yields identical results.
pub struct TaggingPipeline {
    settings: Settings,
}

impl TaggingPipeline {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Infer implicit tags and rebuild the co-occurrence graph.
    ///
    /// `baseline` is the set of entities connected in the explicit-only
    /// graph. Without it the rescued node count is 0.
    pub fn run(
        &self,
        entities: &ScoreTable,
        explicit: &ExplicitTagIndex,
        baseline: Option<&BaselineConnectivity>,
    ) -> Result<InferenceResult> {
        let settings = &self.settings;

        let view = filter_by_specificity(entities, settings.min_specificity);
        debug!(
            total = entities.len(),
            kept = view.len(),
            min_specificity = settings.min_specificity,
            "specificity filter"
        );

        let mut tags = CandidateGenerator::new(explicit, settings.calibration_percentile).generate(&view)?;

        if settings.confidence_margin > 0.0 {
            let before = tags.len();
            tags = apply_margin_filter(&tags, settings.confidence_margin);
            debug!(before, after = tags.len(), margin = settings.confidence_margin, "margin filter");
        }

        if settings.must_bridge {
            let before = tags.len();
            tags = apply_must_bridge_filter(&tags, explicit);
            debug!(before, after = tags.len(), "must-bridge filter");
        }

        let graph = EdgeRebuilder::new(settings.min_edge_weight).rebuild(explicit, &tags);

        let rescued_nodes = match baseline {
            Some(baseline) => graph
                .connected
                .iter()
                .filter(|entity| !baseline.contains(entity))
                .count(),
            None => 0,
        };

        let stats = InferenceStats {
            total_tags: tags.len(),
            total_edges: graph.stats.total_edges,
            implicit_edges: graph.stats.implicit_edges,
            mixed_edges: graph.stats.mixed_edges,
            explicit_edges: graph.stats.explicit_edges,
            rescued_nodes,
            connected_entities: graph.stats.connected_entities,
            entities_considered: view.len(),
        };

        info!(
            percentile = settings.calibration_percentile.value(),
            tags = stats.total_tags,
            edges = stats.total_edges,
            implicit_edges = stats.implicit_edges,
            mixed_edges = stats.mixed_edges,
            rescued = stats.rescued_nodes,
            "implicit tag inference complete"
        );

        Ok(InferenceResult {
            implicit_tags: tags,
            edges: graph.edges,
            stats,
        })
    }
}

/// Functional entry point: one pipeline run under `settings`.
pub fn compute_implicit_tags(
    entities: &ScoreTable,
    explicit: &ExplicitTagIndex,
    settings: &Settings,
    baseline: Option<&BaselineConnectivity>,
) -> Result<InferenceResult> {
    TaggingPipeline::new(settings.clone()).run(entities, explicit, baseline)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::{CalibrationPercentile, EdgeType, Entity};

    const P25: CalibrationPercentile = CalibrationPercentile::P25;

    /// Three entities on entry e1 (C explicit) and one explicit A+B entry e2.
    fn scenario() -> (ScoreTable, ExplicitTagIndex) {
        let mut t = ScoreTable::new();
        t.insert(
            Arc::from("A"),
            Entity::new(3.0).with_threshold(P25, 0.5).with_score("e1", 0.8),
        );
        t.insert(
            Arc::from("B"),
            Entity::new(3.0).with_threshold(P25, 0.5).with_score("e1", 0.7),
        );
        t.insert(Arc::from("C"), Entity::new(3.0).with_threshold(P25, 0.5));
        let explicit: ExplicitTagIndex = vec![("e1", vec!["C"])].into_iter().collect();
        (t, explicit)
    }

    fn settings(min_edge_weight: usize) -> Settings {
        Settings {
            min_edge_weight,
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_types() {
        let (t, explicit) = scenario();
        let result = compute_implicit_tags(&t, &explicit, &settings(1), None).unwrap();

        assert_eq!(result.stats.total_tags, 2);
        let types: Vec<(&str, &str, EdgeType, usize)> = result
            .edges
            .iter()
            .map(|e| (&*e.source, &*e.target, e.edge_type, e.weight))
            .collect();
        assert_eq!(
            types,
            vec![
                ("A", "B", EdgeType::Implicit, 1),
                ("A", "C", EdgeType::Mixed, 1),
                ("B", "C", EdgeType::Mixed, 1),
            ]
        );
        assert_eq!(result.stats.implicit_edges, 1);
        assert_eq!(result.stats.mixed_edges, 2);
        assert_eq!(result.stats.connected_entities, 3);
        assert_eq!(result.stats.entities_considered, 3);
        assert_eq!(result.stats.rescued_nodes, 0);
    }

    #[test]
    fn test_margin_then_bridge() {
        let (t, explicit) = scenario();
        let tight = Settings {
            confidence_margin: 0.05,
            must_bridge: true,
            min_edge_weight: 1,
            ..Default::default()
        };
        let result = compute_implicit_tags(&t, &explicit, &tight, None).unwrap();

        // B (0.7) falls outside 0.05 of A (0.8); A survives the bridge via C.
        assert_eq!(result.implicit_tags.len(), 1);
        assert_eq!(result.implicit_tags[0].key(), ("A", "e1"));
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].edge_type, EdgeType::Mixed);
    }

    #[test]
    fn test_rescued_nodes_against_baseline() {
        let (t, explicit) = scenario();
        let baseline: BaselineConnectivity = vec!["C"].into_iter().collect();
        let result = compute_implicit_tags(&t, &explicit, &settings(1), Some(&baseline)).unwrap();
        assert_eq!(result.stats.rescued_nodes, 2);
    }

    #[test]
    fn test_specificity_above_everything_is_empty_not_error() {
        let (mut t, explicit) = scenario();
        // Would fail threshold lookup if it were considered.
        t.insert(Arc::from("D"), Entity::new(1.0).with_score("e1", 0.99));
        let strict = Settings {
            min_specificity: 10.0,
            ..Default::default()
        };
        let result = compute_implicit_tags(&t, &explicit, &strict, None).unwrap();
        assert!(result.implicit_tags.is_empty());
        assert_eq!(result.stats.entities_considered, 0);
        // Explicit-only entries never produce pairs here, so no edges either.
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_missing_calibration_aborts_run() {
        let (mut t, explicit) = scenario();
        t.insert(Arc::from("D"), Entity::new(5.0).with_score("e1", 0.99));
        let err = compute_implicit_tags(&t, &explicit, &settings(1), None).unwrap_err();
        assert!(err.is_missing_calibration());
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let (t, explicit) = scenario();
        let pipeline = TaggingPipeline::new(settings(1));
        let first = pipeline.run(&t, &explicit, None).unwrap();
        let second = pipeline.run(&t, &explicit, None).unwrap();
        assert_eq!(first, second);
    }
}

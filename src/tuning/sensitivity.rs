//! One-at-a-time sensitivity of the output to each setting.
//!
//! Sweep each setting across its grid values while holding the others at
//! base. The spread of `totalTags` along a curve ranks settings by how much
//! they move the result; flat curves are settings not worth exposing for
//! this dataset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::grid::{with_setting, SettingsGrid, SETTING_NAMES};
use crate::error::Result;
use crate::inference::TaggingPipeline;
use crate::types::{BaselineConnectivity, ExplicitTagIndex, ScoreTable, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePoint {
    pub value: f64,
    pub total_tags: usize,
    pub total_edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityCurve {
    pub points: Vec<CurvePoint>,
    /// max - min `totalTags` along the curve
    pub spread: usize,
}

impl SensitivityCurve {
    fn new(points: Vec<CurvePoint>) -> Self {
        let max = points.iter().map(|p| p.total_tags).max().unwrap_or(0);
        let min = points.iter().map(|p| p.total_tags).min().unwrap_or(0);
        Self {
            points,
            spread: max - min,
        }
    }
}

/// Curves keyed by setting name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub curves: BTreeMap<String, SensitivityCurve>,
}

impl SensitivityReport {
    /// Setting names by spread, most influential first (ties by name).
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .curves
            .iter()
            .map(|(name, curve)| (name.as_str(), curve.spread))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked
    }
}

/// One-at-a-time sweep of every setting with a non-empty value list.
pub fn sensitivity(
    entities: &ScoreTable,
    explicit: &ExplicitTagIndex,
    baseline: Option<&BaselineConnectivity>,
    base: &Settings,
    grid: &SettingsGrid,
) -> Result<SensitivityReport> {
    let mut report = SensitivityReport::default();

    for name in SETTING_NAMES {
        let values = grid.values(name).unwrap_or_default();
        if values.is_empty() {
            continue;
        }

        let mut points = Vec::with_capacity(values.len());
        for value in values {
            let Some(settings) = with_setting(base, name, value) else {
                warn!(setting = name, value, "skipping value the setting cannot take");
                continue;
            };
            let stats = TaggingPipeline::new(settings).run(entities, explicit, baseline)?.stats;
            points.push(CurvePoint {
                value,
                total_tags: stats.total_tags,
                total_edges: stats.total_edges,
            });
        }
        report.curves.insert(name.to_string(), SensitivityCurve::new(points));
    }

    info!(
        settings = report.curves.len(),
        most_influential = report.ranked().first().map(|(name, _)| *name).unwrap_or("none"),
        "sensitivity analysis complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::{CalibrationPercentile, Entity};

    fn table() -> ScoreTable {
        let mut t = ScoreTable::new();
        t.insert(
            Arc::from("kaladin"),
            Entity::new(4.0)
                .with_threshold(CalibrationPercentile::P10, 0.8)
                .with_threshold(CalibrationPercentile::P50, 0.6)
                .with_score("e1", 0.85)
                .with_score("e2", 0.7)
                .with_score("e3", 0.65),
        );
        t.insert(
            Arc::from("syl"),
            Entity::new(1.0)
                .with_threshold(CalibrationPercentile::P10, 0.8)
                .with_threshold(CalibrationPercentile::P50, 0.6)
                .with_score("e1", 0.9),
        );
        t
    }

    #[test]
    fn test_curves_and_ranking() {
        let grid = SettingsGrid {
            calibration_percentile: vec![CalibrationPercentile::P10, CalibrationPercentile::P50],
            min_specificity: vec![0.0, 2.0],
            must_bridge: vec![false],
            ..SettingsGrid::empty()
        };
        let base = Settings {
            calibration_percentile: CalibrationPercentile::P50,
            min_edge_weight: 1,
            ..Default::default()
        };
        let report = sensitivity(&table(), &ExplicitTagIndex::new(), None, &base, &grid).unwrap();

        assert_eq!(report.curves.len(), 3);
        let pct = &report.curves["calibrationPercentile"];
        // p10 = 0.8 keeps (kaladin, e1) and (syl, e1); p50 = 0.6 keeps all four.
        assert_eq!(pct.points[0].total_tags, 2);
        assert_eq!(pct.points[1].total_tags, 4);
        assert_eq!(pct.spread, 2);

        let spec = &report.curves["minSpecificity"];
        // Dropping syl removes its one tag and the e1 edge.
        assert_eq!(spec.points[1].total_tags, 3);
        assert_eq!(spec.points[1].total_edges, 0);
        assert_eq!(spec.spread, 1);

        assert_eq!(report.curves["mustBridge"].spread, 0);
        assert_eq!(
            report.ranked(),
            vec![("calibrationPercentile", 2), ("minSpecificity", 1), ("mustBridge", 0)]
        );
    }
}

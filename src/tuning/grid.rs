//! Cartesian sweep over pipeline settings.
//!
//! Default value lists follow the ranges the settings controls expose:
//!
//! | Setting               | Range        | Default step |
//! |-----------------------|--------------|--------------|
//! | calibrationPercentile | p10 - p50    | 5            |
//! | minSpecificity        | 0.0 - 5.0    | 0.5          |
//! | confidenceMargin      | 0.00 - 0.15  | 0.05         |
//! | mustBridge            | off / on     |              |
//! | minEdgeWeight         | 2 - 10       | 1            |
//!
//! An empty value list holds that setting at the base value.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::inference::TaggingPipeline;
use crate::types::{
    BaselineConnectivity, CalibrationPercentile, ExplicitTagIndex, InferenceStats, ScoreTable, Settings,
    MAX_CONFIDENCE_MARGIN,
};

/// Setting names in sweep order (camelCase, as serialized).
pub const SETTING_NAMES: [&str; 5] = [
    "calibrationPercentile",
    "minSpecificity",
    "confidenceMargin",
    "mustBridge",
    "minEdgeWeight",
];

/// Value lists per setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsGrid {
    pub calibration_percentile: Vec<CalibrationPercentile>,
    pub min_specificity: Vec<f64>,
    pub confidence_margin: Vec<f64>,
    pub must_bridge: Vec<bool>,
    pub min_edge_weight: Vec<usize>,
}

impl Default for SettingsGrid {
    fn default() -> Self {
        Self {
            calibration_percentile: CalibrationPercentile::ALL.to_vec(),
            min_specificity: steps(0.0, 5.0, 0.5),
            confidence_margin: steps(0.0, MAX_CONFIDENCE_MARGIN, 0.05),
            must_bridge: vec![false, true],
            min_edge_weight: (2..=10).collect(),
        }
    }
}

/// Evenly spaced values from `min` to `max` inclusive.
///
/// Values are rounded to 6 decimals so 0.1 + 0.05 compares equal to 0.15.
pub(crate) fn steps(min: f64, max: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || max < min {
        return vec![min];
    }
    let n = ((max - min) / step).round() as usize;
    (0..=n)
        .map(|i| ((min + i as f64 * step) * 1e6).round() / 1e6)
        .collect()
}

impl SettingsGrid {
    /// A grid that holds everything at base.
    pub fn empty() -> Self {
        Self {
            calibration_percentile: Vec::new(),
            min_specificity: Vec::new(),
            confidence_margin: Vec::new(),
            must_bridge: Vec::new(),
            min_edge_weight: Vec::new(),
        }
    }

    /// Values for one setting as f64 (booleans as 0/1), or `None` for an
    /// unknown name.
    pub fn values(&self, name: &str) -> Option<Vec<f64>> {
        let values = match name {
            "calibrationPercentile" => self
                .calibration_percentile
                .iter()
                .map(|p| f64::from(p.value()))
                .collect(),
            "minSpecificity" => self.min_specificity.clone(),
            "confidenceMargin" => self.confidence_margin.clone(),
            "mustBridge" => self
                .must_bridge
                .iter()
                .map(|&b| if b { 1.0 } else { 0.0 })
                .collect(),
            "minEdgeWeight" => self.min_edge_weight.iter().map(|&w| w as f64).collect(),
            _ => return None,
        };
        Some(values)
    }

    /// Every combination, with empty lists held at `base`.
    ///
    /// Order: percentile outermost, edge weight innermost.
    pub fn points(&self, base: &Settings) -> Vec<Settings> {
        let percentiles = or_base(&self.calibration_percentile, base.calibration_percentile);
        let specificities = or_base(&self.min_specificity, base.min_specificity);
        let margins = or_base(&self.confidence_margin, base.confidence_margin);
        let bridges = or_base(&self.must_bridge, base.must_bridge);
        let weights = or_base(&self.min_edge_weight, base.min_edge_weight);

        let mut points =
            Vec::with_capacity(percentiles.len() * specificities.len() * margins.len() * bridges.len() * weights.len());
        for &calibration_percentile in &percentiles {
            for &min_specificity in &specificities {
                for &confidence_margin in &margins {
                    for &must_bridge in &bridges {
                        for &min_edge_weight in &weights {
                            points.push(Settings {
                                calibration_percentile,
                                min_specificity,
                                confidence_margin,
                                must_bridge,
                                min_edge_weight,
                            });
                        }
                    }
                }
            }
        }
        points
    }
}

fn or_base<T: Copy>(values: &[T], base: T) -> Vec<T> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}

/// Set one named setting from its f64 encoding.
///
/// `None` for an unknown name or a value the setting cannot take (a
/// percentile outside p10..p50, a negative edge weight).
pub(crate) fn with_setting(base: &Settings, name: &str, value: f64) -> Option<Settings> {
    let mut settings = base.clone();
    match name {
        "calibrationPercentile" => {
            let rounded = value.round();
            if !(0.0..=f64::from(u8::MAX)).contains(&rounded) {
                return None;
            }
            settings.calibration_percentile = CalibrationPercentile::try_from(rounded as u8).ok()?;
        }
        "minSpecificity" => settings.min_specificity = value,
        "confidenceMargin" => settings.confidence_margin = value,
        "mustBridge" => settings.must_bridge = value >= 0.5,
        "minEdgeWeight" => {
            if value < 0.0 {
                return None;
            }
            settings.min_edge_weight = value.round() as usize;
        }
        _ => return None,
    }
    Some(settings)
}

/// One evaluated grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub settings: Settings,
    pub stats: InferenceStats,
}

/// Run the pipeline at every grid point.
///
/// The first missing calibration aborts the sweep.
pub fn sweep(
    entities: &ScoreTable,
    explicit: &ExplicitTagIndex,
    baseline: Option<&BaselineConnectivity>,
    base: &Settings,
    grid: &SettingsGrid,
) -> Result<Vec<SweepPoint>> {
    let points = grid.points(base);
    info!(points = points.len(), "starting settings sweep");

    let mut results = Vec::with_capacity(points.len());
    for settings in points {
        let stats = TaggingPipeline::new(settings.clone())
            .run(entities, explicit, baseline)?
            .stats;
        debug!(
            percentile = settings.calibration_percentile.value(),
            tags = stats.total_tags,
            edges = stats.total_edges,
            "sweep point"
        );
        results.push(SweepPoint { settings, stats });
    }
    Ok(results)
}

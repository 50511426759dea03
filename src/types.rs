//! Core types for implicit tag inference.
//!
//! Inputs (score tables, explicit tag indexes, baseline connectivity) are
//! read-only for the duration of one pipeline run. Outputs (candidate tags,
//! edges, statistics) are built fresh per run and carry no identity across
//! runs: callers compare them by content, keyed on (entity, entry).
//!
//! Ids are `Arc<str>` so candidate tags and edges share the strings owned by
//! the input tables instead of copying them per record. All collections are
//! ordered maps/sets, which makes every stage's output order deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggingError};
use crate::ingest::lenient;

/// Entity identifier (a tag name such as "kaladin").
pub type EntityId = Arc<str>;

/// Entry identifier (a record that entities are tagged onto).
pub type EntryId = Arc<str>;

/// Upper bound of the confidence margin setting.
pub const MAX_CONFIDENCE_MARGIN: f64 = 0.15;

/// Calibration percentile of an entity's explicit-tag score distribution.
///
/// Higher percentile = stricter threshold = fewer implicit tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum CalibrationPercentile {
    P10 = 10,
    P15 = 15,
    P20 = 20,
    #[default]
    P25 = 25,
    P30 = 30,
    P35 = 35,
    P40 = 40,
    P45 = 45,
    P50 = 50,
}

impl CalibrationPercentile {
    /// Every supported percentile, loosest first.
    pub const ALL: [CalibrationPercentile; 9] = [
        CalibrationPercentile::P10,
        CalibrationPercentile::P15,
        CalibrationPercentile::P20,
        CalibrationPercentile::P25,
        CalibrationPercentile::P30,
        CalibrationPercentile::P35,
        CalibrationPercentile::P40,
        CalibrationPercentile::P45,
        CalibrationPercentile::P50,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Key under which the calibration table stores this percentile ("p25").
    pub fn key(self) -> String {
        format!("p{}", self.value())
    }
}

impl TryFrom<u8> for CalibrationPercentile {
    type Error = TaggingError;

    fn try_from(value: u8) -> Result<Self> {
        CalibrationPercentile::ALL
            .into_iter()
            .find(|p| p.value() == value)
            .ok_or_else(|| {
                TaggingError::InvalidSettings(format!(
                    "calibration percentile must be one of 10, 15, ..., 50 (got {})",
                    value
                ))
            })
    }
}

impl From<CalibrationPercentile> for u8 {
    fn from(p: CalibrationPercentile) -> Self {
        p.value()
    }
}

impl fmt::Display for CalibrationPercentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.value())
    }
}

/// Raw similarity value for one (entity, entry) pair.
///
/// Multi-prototype exports store one similarity per prototype; single
/// prototype exports store a plain number. Anything else is kept as-is and
/// resolved leniently (see [`crate::inference::resolve_score`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Single(f64),
    Prototypes(Vec<f64>),
    Malformed(serde_json::Value),
}

impl From<f64> for ScoreValue {
    fn from(score: f64) -> Self {
        ScoreValue::Single(score)
    }
}

impl From<Vec<f64>> for ScoreValue {
    fn from(scores: Vec<f64>) -> Self {
        ScoreValue::Prototypes(scores)
    }
}

/// Percentile thresholds computed upstream from explicitly tagged entries.
///
/// Percentile keys are stored as they appear in the export ("p10" ... "p50").
/// Values that are not numbers are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(flatten)]
    pub thresholds: BTreeMap<String, serde_json::Value>,
}

impl Calibration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, percentile: CalibrationPercentile, value: f64) -> Self {
        self.thresholds.insert(percentile.key(), serde_json::Value::from(value));
        self
    }

    /// Numeric threshold stored for a percentile, if any.
    pub fn threshold(&self, percentile: CalibrationPercentile) -> Option<f64> {
        self.thresholds.get(&percentile.key()).and_then(|v| v.as_f64())
    }
}

/// One entity's record in the score table.
///
/// Optional fields holding the wrong kind of value read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// How topically focused the entity is; hubs score low.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub specificity: Option<f64>,
    /// Number of reference prototypes the scores were computed against.
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub prototypes: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_u64", skip_serializing_if = "Option::is_none")]
    pub entries_above_floor: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_calibration")]
    pub calibration: Option<Calibration>,
    #[serde(default, deserialize_with = "lenient::scores")]
    pub scores: BTreeMap<EntryId, ScoreValue>,
}

impl Entity {
    pub fn new(specificity: f64) -> Self {
        Self {
            specificity: Some(specificity),
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, percentile: CalibrationPercentile, value: f64) -> Self {
        let calibration = self.calibration.take().unwrap_or_default();
        self.calibration = Some(calibration.with_threshold(percentile, value));
        self
    }

    pub fn with_score(mut self, entry: &str, score: impl Into<ScoreValue>) -> Self {
        self.scores.insert(Arc::from(entry), score.into());
        self
    }
}

/// Entity id -> entity record. Immutable input.
pub type ScoreTable = BTreeMap<EntityId, Entity>;

/// Borrowed view over a subset of a [`ScoreTable`]; no records are copied.
pub type EntityView<'a> = BTreeMap<&'a EntityId, &'a Entity>;

/// Entry id -> set of entity ids explicitly tagged on that entry.
///
/// The single canonical explicit-tag container: every source of explicit
/// tags is normalized into this shape at ingestion, so the filters never
/// branch on container kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExplicitTagIndex {
    entries: BTreeMap<EntryId, BTreeSet<EntityId>>,
}

impl ExplicitTagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `entity` is explicitly tagged on `entry`. Idempotent.
    pub fn insert(&mut self, entry: impl Into<EntryId>, entity: impl Into<EntityId>) {
        self.entries.entry(entry.into()).or_default().insert(entity.into());
    }

    /// Explicit entities on an entry, if the entry is known.
    pub fn tags(&self, entry: &str) -> Option<&BTreeSet<EntityId>> {
        self.entries.get(entry)
    }

    pub fn contains(&self, entry: &str, entity: &str) -> bool {
        self.entries
            .get(entry)
            .map(|tags| tags.contains(entity))
            .unwrap_or(false)
    }

    /// True if the entry has at least one explicit tag.
    pub fn has_tags(&self, entry: &str) -> bool {
        self.entries
            .get(entry)
            .map(|tags| !tags.is_empty())
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntryId, &BTreeSet<EntityId>)> {
        self.entries.iter()
    }

    /// Number of entries (including entries with an empty tag set).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E, T, I> FromIterator<(E, I)> for ExplicitTagIndex
where
    E: Into<EntryId>,
    T: Into<EntityId>,
    I: IntoIterator<Item = T>,
{
    fn from_iter<It: IntoIterator<Item = (E, I)>>(iter: It) -> Self {
        let mut index = ExplicitTagIndex::new();
        for (entry, entities) in iter {
            let set = index.entries.entry(entry.into()).or_default();
            set.extend(entities.into_iter().map(Into::into));
        }
        index
    }
}

/// An inferred (entity, entry) association with its resolved score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTag {
    pub entity: EntityId,
    pub entry_id: EntryId,
    pub score: f64,
}

impl CandidateTag {
    pub fn new(entity: impl Into<EntityId>, entry_id: impl Into<EntryId>, score: f64) -> Self {
        Self {
            entity: entity.into(),
            entry_id: entry_id.into(),
            score,
        }
    }

    /// Content key used to compare tags across runs.
    pub fn key(&self) -> (&str, &str) {
        (&self.entity, &self.entry_id)
    }
}

/// Provenance of a co-occurrence edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    /// Every contributing co-occurrence had both sides explicit.
    Explicit,
    /// Every contributing co-occurrence had both sides implicit-only.
    Implicit,
    /// Contributions of both kinds, possibly on different entries.
    Mixed,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Explicit => "explicit",
            EdgeType::Implicit => "implicit",
            EdgeType::Mixed => "mixed",
        }
    }
}

/// Undirected co-occurrence edge with `source < target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: EntityId,
    pub target: EntityId,
    /// Number of distinct entries on which both endpoints co-occur.
    pub weight: usize,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub entry_ids: Vec<EntryId>,
}

impl Edge {
    pub fn key(&self) -> (&str, &str) {
        (&self.source, &self.target)
    }

    pub fn touches(&self, entity: &str) -> bool {
        &*self.source == entity || &*self.target == entity
    }
}

/// User-chosen pipeline settings.
///
/// The pipeline accepts any values; [`Settings::validate`] is applied at the
/// configuration boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub calibration_percentile: CalibrationPercentile,
    /// Entities below this specificity are dropped before threshold lookup.
    pub min_specificity: f64,
    /// Per-entry margin below the best candidate score (0 disables).
    pub confidence_margin: f64,
    /// Drop implicit tags on entries with no corroborating tag.
    pub must_bridge: bool,
    /// Edges lighter than this are dropped from the result.
    pub min_edge_weight: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calibration_percentile: CalibrationPercentile::P25,
            min_specificity: 0.0,
            confidence_margin: 0.0,
            must_bridge: false,
            min_edge_weight: 2,
        }
    }
}

impl Settings {
    /// Check ranges the collaborator's controls guarantee.
    pub fn validate(&self) -> Result<()> {
        if !self.min_specificity.is_finite() || self.min_specificity < 0.0 {
            return Err(TaggingError::InvalidSettings(format!(
                "min specificity must be a finite value >= 0 (got {})",
                self.min_specificity
            )));
        }
        if !(0.0..=MAX_CONFIDENCE_MARGIN).contains(&self.confidence_margin) {
            return Err(TaggingError::InvalidSettings(format!(
                "confidence margin must be within [0, {}] (got {})",
                MAX_CONFIDENCE_MARGIN, self.confidence_margin
            )));
        }
        if self.min_edge_weight < 1 {
            return Err(TaggingError::InvalidSettings(
                "min edge weight must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Entities connected in the explicit-only graph, supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineConnectivity {
    entities: BTreeSet<EntityId>,
}

impl BaselineConnectivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.iter()
    }
}

impl<T: Into<EntityId>> FromIterator<T> for BaselineConnectivity {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Summary statistics returned with every pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceStats {
    /// Implicit tags surviving all filters.
    pub total_tags: usize,
    pub total_edges: usize,
    pub implicit_edges: usize,
    pub mixed_edges: usize,
    pub explicit_edges: usize,
    /// Connected entities absent from the baseline connectivity set.
    pub rescued_nodes: usize,
    /// Distinct entities appearing in any surviving edge.
    pub connected_entities: usize,
    /// Entities surviving the specificity filter.
    pub entities_considered: usize,
}

/// Result record handed back to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    pub implicit_tags: Vec<CandidateTag>,
    pub edges: Vec<Edge>,
    pub stats: InferenceStats,
}

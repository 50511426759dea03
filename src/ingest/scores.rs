//! Score export document.
//!
//! Shape:
//!
//! ```text
//! {
//!   "meta": { "model", "floor", "total_entries", "proto_thresholds": {two, three} },
//!   "entities": {
//!     "<entity>": {
//!       "specificity", "entries_above_floor", "prototypes",
//!       "calibration": { "mean", "std", "p10" .. "p50" },
//!       "scores": { "<entry>": [f64, ...] | f64 }
//!     }
//!   }
//! }
//! ```

use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::lenient;
use crate::error::Result;
use crate::types::{ScoreTable, ScoreValue};

/// Minimum explicit entries for multi-prototype references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtoThresholds {
    pub two: u32,
    pub three: u32,
}

/// Export metadata. Informational only; the pipeline never reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreMeta {
    #[serde(default)]
    pub model: Option<String>,
    /// Entries whose best prototype score was at or below this were not exported.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub floor: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub total_entries: Option<u64>,
    #[serde(default)]
    pub proto_thresholds: Option<ProtoThresholds>,
}

/// Parsed score export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ScoreMeta>,
    pub entities: ScoreTable,
}

impl ScoreDocument {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    /// Malformed optional entity fields are counted here, before the lenient
    /// deserializers erase them.
    fn from_value(value: Value) -> Result<Self> {
        let malformed_fields = value.get("entities").map_or(0, lenient::malformed_fields);
        let doc: ScoreDocument = serde_json::from_value(value)?;
        doc.report(malformed_fields);
        Ok(doc)
    }

    pub fn into_table(self) -> ScoreTable {
        self.entities
    }

    /// Number of score values that are neither a number nor a number list.
    pub fn malformed_scores(&self) -> usize {
        self.entities
            .values()
            .flat_map(|entity| entity.scores.values())
            .filter(|value| matches!(value, ScoreValue::Malformed(_)))
            .count()
    }

    fn report(&self, malformed_fields: usize) {
        if malformed_fields > 0 {
            warn!(malformed_fields, "optional entity fields with the wrong type read as absent");
        }
        let malformed = self.malformed_scores();
        if malformed > 0 {
            warn!(malformed, "score values are not numeric; resolving leniently");
        }
        let uncalibrated = self
            .entities
            .values()
            .filter(|entity| entity.calibration.is_none())
            .count();
        if uncalibrated > 0 {
            warn!(uncalibrated, "entities without a calibration block");
        }
        debug!(
            entities = self.entities.len(),
            model = self.meta.as_ref().and_then(|m| m.model.as_deref()).unwrap_or("unknown"),
            "loaded score document"
        );
    }
}

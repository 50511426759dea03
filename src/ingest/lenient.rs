//! Tolerant field deserializers for the score export.
//!
//! Optional numeric fields that hold the wrong kind of value resolve to
//! `None` (or an empty map) instead of failing the whole document. Numeric
//! strings are accepted. [`malformed_fields`] counts the fields that needed
//! this treatment so ingestion can report them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::{Calibration, EntryId, ScoreValue};

fn as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn as_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    as_f64(value).filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64).map(|v| v as u64)
}

pub(crate) fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(as_f64(&Value::deserialize(deserializer)?))
}

pub(crate) fn opt_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(as_count(&Value::deserialize(deserializer)?).and_then(|n| u32::try_from(n).ok()))
}

pub(crate) fn opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(as_count(&Value::deserialize(deserializer)?))
}

pub(crate) fn opt_calibration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Calibration>, D::Error> {
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

/// `null` or a non-object means "no scores".
pub(crate) fn scores<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<EntryId, ScoreValue>, D::Error> {
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value).unwrap_or_default()),
        _ => Ok(BTreeMap::new()),
    }
}

/// Optional entity fields present with a value of the wrong kind.
///
/// Numeric strings count: they are accepted, but not what the export
/// writes. `null` counts only for `scores` and `calibration`.
pub(crate) fn malformed_fields(entities: &Value) -> usize {
    let Some(entities) = entities.as_object() else {
        return 0;
    };
    let mut count = 0;
    for entity in entities.values().filter_map(Value::as_object) {
        count += entity
            .get("specificity")
            .map_or(0, |v| usize::from(!v.is_null() && !v.is_number()));
        for key in ["prototypes", "entries_above_floor"] {
            count += entity.get(key).map_or(0, |v| usize::from(!v.is_null() && !v.is_u64()));
        }
        for key in ["scores", "calibration"] {
            count += entity.get(key).map_or(0, |v| usize::from(!v.is_object()));
        }
        if let Some(calibration) = entity.get("calibration").and_then(Value::as_object) {
            for key in ["mean", "std"] {
                count += calibration.get(key).map_or(0, |v| usize::from(!v.is_null() && !v.is_number()));
            }
        }
    }
    count
}

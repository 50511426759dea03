//! Score resolution: collapse a raw similarity value to one number.
//!
//! Multi-prototype entities carry one similarity per reference vector; the
//! best-matching prototype decides relevance, so the effective score is the
//! maximum. Malformed values never fail: they resolve to 0 (or the number a
//! numeric string spells out), since score exports are exploratory data.

use crate::types::ScoreValue;

/// Effective score of a raw value.
///
/// - scalar: returned unchanged
/// - sequence: maximum element (`-inf` for an empty sequence, so it never
///   clears a threshold); non-numeric elements are skipped
/// - numeric string: parsed value; boolean: 1 or 0; anything else: 0
pub fn resolve_score(value: &ScoreValue) -> f64 {
    match value {
        ScoreValue::Single(score) => *score,
        ScoreValue::Prototypes(scores) => max_of(scores.iter().copied()),
        // A sequence with some non-numeric elements: skip those, keep the rest.
        ScoreValue::Malformed(serde_json::Value::Array(items)) => max_of(items.iter().filter_map(lenient_number)),
        ScoreValue::Malformed(raw) => lenient_number(raw).unwrap_or(0.0),
    }
}

fn max_of(scores: impl Iterator<Item = f64>) -> f64 {
    scores
        .filter(|s| !s.is_nan())
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Numbers, numeric strings (empty string = 0) and booleans; `None` for
/// anything else.
fn lenient_number(raw: &serde_json::Value) -> Option<f64> {
    let parsed = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

impl ScoreValue {
    /// Shorthand for [`resolve_score`].
    pub fn resolve(&self) -> f64 {
        resolve_score(self)
    }
}

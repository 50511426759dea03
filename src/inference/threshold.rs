//! Threshold resolution from precomputed calibration percentiles.
//!
//! Each entity's calibration table holds percentiles of the score
//! distribution over its explicitly tagged entries. Picking p10 gives a loose
//! cutoff (most known entries would clear it), p50 the median. Monotonicity
//! across percentiles is a property of the upstream export; it is not checked
//! here.
//!
//! A missing table or key is a hard failure: defaulting would hide a broken
//! export.

use crate::error::{MissingCalibrationReason, Result, TaggingError};
use crate::types::{CalibrationPercentile, Entity};

/// Score cutoff for `entity` at `percentile`.
pub fn effective_threshold(
    entity_id: &str,
    entity: &Entity,
    percentile: CalibrationPercentile,
) -> Result<f64> {
    let calibration = entity.calibration.as_ref().ok_or_else(|| {
        missing(entity_id, percentile, MissingCalibrationReason::NoCalibrationBlock)
    })?;

    calibration
        .threshold(percentile)
        .ok_or_else(|| missing(entity_id, percentile, MissingCalibrationReason::NoPercentileEntry))
}

fn missing(
    entity_id: &str,
    percentile: CalibrationPercentile,
    reason: MissingCalibrationReason,
) -> TaggingError {
    TaggingError::MissingCalibration {
        entity: entity_id.to_string(),
        percentile: percentile.value(),
        reason,
    }
}

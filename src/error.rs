//! Error types for implicit tag inference.
//!
//! The pipeline itself has exactly one failure mode: a surviving entity whose
//! calibration table cannot answer the requested percentile. Everything else
//! in here belongs to the boundaries around the pipeline (document parsing,
//! settings validation, config discovery).

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why a threshold lookup could not be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCalibrationReason {
    /// The entity record carries no `calibration` object at all.
    NoCalibrationBlock,
    /// The calibration object has no numeric value for the percentile key.
    NoPercentileEntry,
}

impl fmt::Display for MissingCalibrationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCalibrationBlock => write!(f, "entity has no calibration block"),
            Self::NoPercentileEntry => write!(f, "no calibration value for percentile"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TaggingError {
    #[error("missing calibration for entity '{entity}' at p{percentile}: {reason}")]
    MissingCalibration {
        entity: String,
        percentile: u8,
        reason: MissingCalibrationReason,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl TaggingError {
    /// True for the fatal upstream-data failure raised by threshold lookup.
    pub fn is_missing_calibration(&self) -> bool {
        matches!(self, TaggingError::MissingCalibration { .. })
    }
}

pub type Result<T> = std::result::Result<T, TaggingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_calibration_message() {
        let err = TaggingError::MissingCalibration {
            entity: "kaladin".into(),
            percentile: 25,
            reason: MissingCalibrationReason::NoPercentileEntry,
        };
        assert!(err.is_missing_calibration());
        assert_eq!(
            err.to_string(),
            "missing calibration for entity 'kaladin' at p25: no calibration value for percentile"
        );
    }

    #[test]
    fn test_parse_error_converts() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TaggingError = bad.into();
        assert!(!err.is_missing_calibration());
        assert!(err.to_string().starts_with("malformed document"));
    }
}

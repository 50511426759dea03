//! Settings exploration.
//!
//! The pipeline has five knobs and no ground truth, so tuning here means
//! looking at how the output moves:
//! 1. Grid sweep over the cartesian product of setting values
//! 2. One-at-a-time sensitivity (which settings actually move the graph?)

mod grid;
mod sensitivity;

pub use grid::{sweep, SettingsGrid, SweepPoint, SETTING_NAMES};
pub use sensitivity::{sensitivity, CurvePoint, SensitivityCurve, SensitivityReport};

//! implicit-tags - Implicit tag inference over calibrated similarity scores
//!
//! Curated entries carry explicit entity tags, but many entries discuss an
//! entity without being tagged with it. Given precomputed per-entity
//! similarity scores and calibration percentiles, this crate infers the
//! missing (implicit) tags and rebuilds the entity co-occurrence graph from
//! explicit and implicit tags together.
//!
//! # Architecture
//!
//! ```text
//! scores.json ─► Specificity ─► Candidates ─► Margin ─► Bridge ─► Edge Rebuild ─► Stats
//!      ↓            ↓              ↓            ↓         ↓            ↓            ↓
//!   ingest      drop hubs      per-entity    per-entry  entry needs  explicit ∪   rescued vs
//!   serde       (>= min)      pNN threshold  top score  corroboration implicit     baseline
//! ```
//!
//! Around the pipeline:
//! - [`graph`]: explicit-only baseline, petgraph view, before/after diff
//! - [`review`]: caller-owned confirm/reject ledger and its export record
//! - [`tuning`]: grid sweep and one-at-a-time sensitivity over settings
//! - [`config`]: settings discovery from `implicit-tags.toml` / `pyproject.toml`
//!
//! # Example
//!
//! ```no_run
//! use implicit_tags::{compute_implicit_tags, ExplicitTagIndex, ScoreDocument, Settings};
//!
//! # fn main() -> implicit_tags::Result<()> {
//! let scores = ScoreDocument::from_json_str(
//!     r#"{"entities": {"kaladin": {"specificity": 3.1, "calibration": {"p25": 0.68},
//!         "scores": {"1285": [0.71, 0.52]}}}}"#,
//! )?;
//! let explicit = ExplicitTagIndex::from_json_str(r#"{"1396": ["kaladin"]}"#)?;
//! let result = compute_implicit_tags(&scores.entities, &explicit, &Settings::default(), None)?;
//! println!("{} implicit tags, {} edges", result.stats.total_tags, result.stats.total_edges);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod inference;
pub mod ingest;
pub mod review;
pub mod tuning;
pub mod types;

// Re-export core types
pub use types::{
    BaselineConnectivity, Calibration, CalibrationPercentile, CandidateTag, Edge, EdgeType, Entity,
    EntityId, EntryId, ExplicitTagIndex, InferenceResult, InferenceStats, ScoreTable, ScoreValue,
    Settings,
};

pub use error::{MissingCalibrationReason, Result, TaggingError};

// Re-export pipeline entry points
pub use inference::{compute_implicit_tags, rebuild_edges, TaggingPipeline};

pub use config::Config;
pub use graph::{CooccurrenceGraph, GraphDiff};
pub use ingest::{ScoreDocument, TaggedEntry};
pub use review::{ReviewExport, ReviewLedger, ReviewStatus};

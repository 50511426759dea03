//! Ingestion - normalizing upstream documents into pipeline inputs.
//!
//! The score export and the tagged-entry dump arrive as JSON. Everything is
//! parsed into the ordered types in [`crate::types`] here, so the pipeline
//! never sees more than one container shape.

mod explicit;
pub(crate) mod lenient;
mod scores;

pub use explicit::{parse_tagged_entries, TaggedEntry};
pub use scores::{ProtoThresholds, ScoreDocument, ScoreMeta};

//! Inference pipeline - from calibrated scores to a rebuilt co-occurrence graph.
//!
//! ```text
//! ScoreTable ─► specificity ─► candidates ─► margin ─► bridge ─► edges
//!                  (>= min)    (score >= pNN,  (within    (entry has   (explicit ∪
//!                              not explicit)   margin of   explicit or  implicit per
//!                                              entry top)  >1 implicit) entry, weight)
//! ```
//!
//! Every stage is a pure function of its inputs. [`TaggingPipeline`] wires them
//! together; the individual stages are exported for callers that want to
//! inspect intermediate results.

mod bridge;
mod candidates;
mod edges;
mod margin;
mod pipeline;
mod score;
mod specificity;
mod threshold;

pub use bridge::apply_must_bridge_filter;
pub use candidates::CandidateGenerator;
pub use edges::{
    canonical_pair, classify, rebuild_edges, EdgeRebuilder, EdgeStats, RebuiltGraph,
    DEFAULT_MIN_EDGE_WEIGHT,
};
pub use margin::apply_margin_filter;
pub use pipeline::{compute_implicit_tags, TaggingPipeline};
pub use score::resolve_score;
pub use specificity::filter_by_specificity;
pub use threshold::effective_threshold;

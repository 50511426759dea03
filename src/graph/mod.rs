//! Graph views over edge lists - baseline, petgraph wrapper, and diffs.
//!
//! The inference pipeline hands back a flat edge list. These modules answer
//! the questions asked of it afterwards: what did the explicit-only graph
//! look like, how is the rebuilt graph connected, and what changed.

pub mod baseline;
mod cooccurrence;
mod diff;

pub use baseline::explicit_graph;
pub use cooccurrence::CooccurrenceGraph;
pub use diff::{EdgeChange, GraphDiff};

//! Confidence margin: per entry, keep only candidates close to the best one.
//!
//! The cutoff is relative to each entry's strongest candidate, not global.
//! An entry with several near-tied entities keeps them all; an entry with one
//! dominant match sheds competitors once they trail by more than the margin.

use std::collections::HashMap;

use crate::types::CandidateTag;

/// Keep candidates with `best_for_entry - score <= margin`.
///
/// A margin of zero or less is a pass-through copy. Input order is preserved.
pub fn apply_margin_filter(candidates: &[CandidateTag], margin: f64) -> Vec<CandidateTag> {
    if margin <= 0.0 {
        return candidates.to_vec();
    }

    let mut best: HashMap<&str, f64> = HashMap::new();
    for tag in candidates {
        let slot = best.entry(&*tag.entry_id).or_insert(f64::NEG_INFINITY);
        if tag.score > *slot {
            *slot = tag.score;
        }
    }

    candidates
        .iter()
        .filter(|tag| {
            let top = best.get(&*tag.entry_id).copied().unwrap_or(tag.score);
            top - tag.score <= margin
        })
        .cloned()
        .collect()
}

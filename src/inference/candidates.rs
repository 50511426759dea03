//! Candidate generation: scan each surviving entity's scores for entries
//! that clear its calibrated threshold.
//!
//! Thresholds are resolved up front, sequentially and in entity order, so a
//! broken calibration table fails the run before any scanning starts and the
//! reported entity is always the first broken one. Scanning then fans out per
//! entity (rayon, behind the `parallel` feature); results are concatenated in
//! entity order, so the output is identical with or without the feature.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use super::score::resolve_score;
use super::threshold::effective_threshold;
use crate::error::Result;
use crate::types::{CalibrationPercentile, CandidateTag, Entity, EntityId, EntityView, ExplicitTagIndex};

/// Emits implicit tag candidates for a set of entities.
///
/// A candidate is an (entity, entry) pair whose resolved score is at least
/// the entity's threshold and which is not already an explicit tag.
pub struct CandidateGenerator<'a> {
    explicit: &'a ExplicitTagIndex,
    percentile: CalibrationPercentile,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(explicit: &'a ExplicitTagIndex, percentile: CalibrationPercentile) -> Self {
        Self { explicit, percentile }
    }

    /// Generate candidates for every entity in the view.
    ///
    /// Output is grouped by entity (ascending id), then entry (ascending id).
    pub fn generate(&self, entities: &EntityView<'_>) -> Result<Vec<CandidateTag>> {
        let plans = entities
            .iter()
            .map(|(&id, &entity)| Ok((id, entity, effective_threshold(id, entity, self.percentile)?)))
            .collect::<Result<Vec<(&EntityId, &Entity, f64)>>>()?;

        #[cfg(feature = "parallel")]
        let per_entity: Vec<Vec<CandidateTag>> = plans
            .par_iter()
            .map(|&(id, entity, threshold)| self.scan_entity(id, entity, threshold))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let per_entity: Vec<Vec<CandidateTag>> = plans
            .iter()
            .map(|&(id, entity, threshold)| self.scan_entity(id, entity, threshold))
            .collect();

        let candidates: Vec<CandidateTag> = per_entity.into_iter().flatten().collect();
        debug!(
            entities = plans.len(),
            candidates = candidates.len(),
            percentile = self.percentile.value(),
            "generated implicit tag candidates"
        );
        Ok(candidates)
    }

    /// Scan one entity's score map against an already-resolved threshold.
    pub fn scan_entity(&self, entity_id: &EntityId, entity: &Entity, threshold: f64) -> Vec<CandidateTag> {
        entity
            .scores
            .iter()
            .filter_map(|(entry_id, raw)| {
                let score = resolve_score(raw);
                if score < threshold {
                    return None;
                }
                if self.explicit.contains(entry_id, entity_id) {
                    return None;
                }
                Some(CandidateTag {
                    entity: Arc::clone(entity_id),
                    entry_id: Arc::clone(entry_id),
                    score,
                })
            })
            .collect()
    }
}

//! Human review of inferred tags.
//!
//! The ledger is owned by the caller and keyed by (entity, entry), so it
//! survives re-runs of the pipeline: a tag that disappears under stricter
//! settings and comes back later keeps its decision.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CandidateTag, EntityId, EntryId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
}

/// One implicit tag with its review decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedTag {
    pub entity: EntityId,
    pub entry_id: EntryId,
    pub score: f64,
    pub status: ReviewStatus,
}

/// Serializable snapshot of a review session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewExport {
    pub timestamp: DateTime<Utc>,
    pub total_tags: usize,
    pub reviews: Vec<ReviewedTag>,
}

impl ReviewExport {
    pub fn count(&self, status: ReviewStatus) -> usize {
        self.reviews.iter().filter(|r| r.status == status).count()
    }
}

/// Decisions keyed by (entity, entry). Undecided pairs are pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewLedger {
    decisions: BTreeMap<(EntityId, EntryId), ReviewStatus>,
}

impl ReviewLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, entity: &str, entry_id: &str) -> ReviewStatus {
        self.decisions
            .get(&(EntityId::from(entity), EntryId::from(entry_id)))
            .copied()
            .unwrap_or_default()
    }

    pub fn confirm(&mut self, entity: impl Into<EntityId>, entry_id: impl Into<EntryId>) {
        self.set(entity.into(), entry_id.into(), ReviewStatus::Confirmed);
    }

    pub fn reject(&mut self, entity: impl Into<EntityId>, entry_id: impl Into<EntryId>) {
        self.set(entity.into(), entry_id.into(), ReviewStatus::Rejected);
    }

    /// Back to pending.
    pub fn reset(&mut self, entity: impl Into<EntityId>, entry_id: impl Into<EntryId>) {
        self.decisions.remove(&(entity.into(), entry_id.into()));
    }

    fn set(&mut self, entity: EntityId, entry_id: EntryId, status: ReviewStatus) {
        self.decisions.insert((entity, entry_id), status);
    }

    /// Number of decided (non-pending) pairs.
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// One review row per tag, in tag order.
    pub fn export(&self, tags: &[CandidateTag], timestamp: DateTime<Utc>) -> ReviewExport {
        let reviews: Vec<ReviewedTag> = tags
            .iter()
            .map(|tag| ReviewedTag {
                entity: Arc::clone(&tag.entity),
                entry_id: Arc::clone(&tag.entry_id),
                score: tag.score,
                status: self.lookup(tag),
            })
            .collect();
        ReviewExport {
            timestamp,
            total_tags: tags.len(),
            reviews,
        }
    }

    /// Tags not rejected, in input order.
    pub fn retain_unrejected(&self, tags: &[CandidateTag]) -> Vec<CandidateTag> {
        tags.iter()
            .filter(|tag| self.lookup(tag) != ReviewStatus::Rejected)
            .cloned()
            .collect()
    }

    fn lookup(&self, tag: &CandidateTag) -> ReviewStatus {
        self.decisions
            .get(&(Arc::clone(&tag.entity), Arc::clone(&tag.entry_id)))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tags() -> Vec<CandidateTag> {
        vec![
            CandidateTag::new("kaladin", "1396", 0.78),
            CandidateTag::new("syl", "1396", 0.71),
            CandidateTag::new("hoid", "1285", 0.66),
        ]
    }

    #[test]
    fn test_decisions_overwrite() {
        let mut ledger = ReviewLedger::new();
        assert_eq!(ledger.status("kaladin", "1396"), ReviewStatus::Pending);

        ledger.confirm("kaladin", "1396");
        assert_eq!(ledger.status("kaladin", "1396"), ReviewStatus::Confirmed);
        ledger.reject("kaladin", "1396");
        assert_eq!(ledger.status("kaladin", "1396"), ReviewStatus::Rejected);
        assert_eq!(ledger.len(), 1);

        ledger.reset("kaladin", "1396");
        assert_eq!(ledger.status("kaladin", "1396"), ReviewStatus::Pending);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_export_shape() {
        let mut ledger = ReviewLedger::new();
        ledger.confirm("kaladin", "1396");
        ledger.reject("hoid", "1285");
        // Decisions for tags not in the current run are not exported.
        ledger.confirm("vin", "9999");

        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let export = ledger.export(&tags(), ts);
        assert_eq!(export.total_tags, 3);
        assert_eq!(export.count(ReviewStatus::Confirmed), 1);
        assert_eq!(export.count(ReviewStatus::Pending), 1);
        assert_eq!(export.count(ReviewStatus::Rejected), 1);

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["totalTags"], 3);
        assert_eq!(json["timestamp"], "2026-03-01T12:00:00Z");
        assert_eq!(json["reviews"][0]["entryId"], "1396");
        assert_eq!(json["reviews"][0]["status"], "confirmed");
        assert_eq!(json["reviews"][1]["status"], "pending");
    }

    #[test]
    fn test_retain_unrejected() {
        let mut ledger = ReviewLedger::new();
        ledger.reject("syl", "1396");
        let kept = ledger.retain_unrejected(&tags());
        let keys: Vec<(&str, &str)> = kept.iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec![("kaladin", "1396"), ("hoid", "1285")]);
    }
}

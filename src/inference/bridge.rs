//! Must-bridge filter: drop implicit tags with no corroborating context.
//!
//! An implicit tag alone on an entry would put an isolated entity in the
//! graph. It survives only if its entry already carries an explicit tag, or
//! another entity was also implicitly tagged there. This guarantees a
//! potential co-occurrence, not an edge: the minimum weight cutoff can still
//! remove it later.

use std::collections::{BTreeSet, HashMap};

use crate::types::{CandidateTag, ExplicitTagIndex};

/// Keep candidates whose entry has an explicit tag or another implicit entity.
///
/// Input order is preserved.
pub fn apply_must_bridge_filter(
    candidates: &[CandidateTag],
    explicit: &ExplicitTagIndex,
) -> Vec<CandidateTag> {
    let mut implicit_entities: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for tag in candidates {
        implicit_entities
            .entry(&*tag.entry_id)
            .or_default()
            .insert(&*tag.entity);
    }

    candidates
        .iter()
        .filter(|tag| {
            if explicit.has_tags(&tag.entry_id) {
                return true;
            }
            let distinct = implicit_entities
                .get(&*tag.entry_id)
                .map(|set| set.len())
                .unwrap_or(0);
            distinct > 1
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lone_implicit_tag_removed() {
        let input = vec![CandidateTag::new("kaladin", "e1", 0.9)];
        let explicit = ExplicitTagIndex::new();
        assert!(apply_must_bridge_filter(&input, &explicit).is_empty());
    }

    #[test]
    fn test_explicit_tag_bridges() {
        let input = vec![CandidateTag::new("kaladin", "e1", 0.9)];
        let explicit: ExplicitTagIndex = vec![("e1", vec!["syl"])].into_iter().collect();
        assert_eq!(apply_must_bridge_filter(&input, &explicit), input);
    }

    #[test]
    fn test_empty_explicit_set_does_not_bridge() {
        let input = vec![CandidateTag::new("kaladin", "e1", 0.9)];
        let explicit: ExplicitTagIndex = vec![("e1", Vec::<&str>::new())].into_iter().collect();
        assert!(apply_must_bridge_filter(&input, &explicit).is_empty());
    }

    #[test]
    fn test_other_implicit_entity_bridges() {
        let input = vec![
            CandidateTag::new("kaladin", "e1", 0.9),
            CandidateTag::new("syl", "e1", 0.8),
            CandidateTag::new("hoid", "e2", 0.8),
        ];
        let kept = apply_must_bridge_filter(&input, &ExplicitTagIndex::new());
        assert_eq!(kept, input[..2].to_vec());
    }

    #[test]
    fn test_duplicate_entity_does_not_bridge_itself() {
        let input = vec![
            CandidateTag::new("kaladin", "e1", 0.9),
            CandidateTag::new("kaladin", "e1", 0.85),
        ];
        assert!(apply_must_bridge_filter(&input, &ExplicitTagIndex::new()).is_empty());
    }
}

//! Specificity filter: drop hub entities before any threshold lookup.
//!
//! Specificity is log(total entries / entries scoring above the export
//! floor). Hubs like "allomancy" score near zero because half the corpus
//! looks vaguely similar to them, and their implicit tags are mostly noise.

use crate::types::{EntityView, ScoreTable};

/// Entities with `specificity >= min_specificity` (inclusive).
///
/// Returns a borrowed view over the same records. Entities with no
/// specificity value never pass.
pub fn filter_by_specificity(entities: &ScoreTable, min_specificity: f64) -> EntityView<'_> {
    entities
        .iter()
        .filter(|(_, entity)| {
            entity
                .specificity
                .map(|s| s >= min_specificity)
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entity, EntityId};
    use std::sync::Arc;

    fn table() -> ScoreTable {
        let mut t = ScoreTable::new();
        t.insert(Arc::from("allomancy"), Entity::new(0.4));
        t.insert(Arc::from("kaladin"), Entity::new(4.2));
        t.insert(Arc::from("hoid"), Entity::new(2.0));
        t.insert(Arc::from("unscored"), Entity::default());
        t
    }

    #[test]
    fn test_drops_hubs() {
        let t = table();
        let view = filter_by_specificity(&t, 1.0);
        let names: Vec<String> = view.keys().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["hoid", "kaladin"]);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let t = table();
        let view = filter_by_specificity(&t, 2.0);
        assert!(view.contains_key(&EntityId::from("hoid")));
    }

    #[test]
    fn test_view_shares_records() {
        let t = table();
        let view = filter_by_specificity(&t, 0.0);
        assert_eq!(view.len(), 3);
        let key = EntityId::from("kaladin");
        let kaladin = view.get(&key).unwrap();
        assert!(std::ptr::eq(*kaladin, t.get("kaladin").unwrap()));
    }

    #[test]
    fn test_above_everything_is_empty() {
        let t = table();
        assert!(filter_by_specificity(&t, 10.0).is_empty());
    }
}

//! Explicit tag ingestion.
//!
//! Curated entries carry free-form tags, most of which are not entities
//! (book names, meta tags). Only tags in the entity vocabulary become
//! explicit tags; entries left with none are dropped from the index.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{EntityId, EntryId, ExplicitTagIndex};

/// A curated entry and its raw tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedEntry {
    /// Numeric ids in the dump are normalized to their decimal string.
    #[serde(deserialize_with = "entry_id")]
    pub id: EntryId,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TaggedEntry {
    pub fn new(id: impl Into<EntryId>, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

fn entry_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<EntryId, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => Arc::from(n.to_string()),
        RawId::Text(s) => Arc::from(s),
    })
}

/// Parse a JSON array of tagged entries.
pub fn parse_tagged_entries(json: &str) -> Result<Vec<TaggedEntry>> {
    Ok(serde_json::from_str(json)?)
}

impl ExplicitTagIndex {
    /// Parse the `{ "<entry>": ["<entity>", ...] }` shape.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build an index from raw entries, keeping only vocabulary tags.
    pub fn from_tagged_entries<'a>(
        entries: impl IntoIterator<Item = &'a TaggedEntry>,
        vocabulary: &BTreeSet<EntityId>,
    ) -> Self {
        let mut index = ExplicitTagIndex::new();
        let mut seen = 0usize;
        let mut dropped_entries = 0usize;
        let mut dropped_tags = 0usize;

        for entry in entries {
            seen += 1;
            let mut kept = 0usize;
            for tag in &entry.tags {
                match vocabulary.get(tag.as_str()) {
                    Some(entity) => {
                        index.insert(Arc::clone(&entry.id), Arc::clone(entity));
                        kept += 1;
                    }
                    None => dropped_tags += 1,
                }
            }
            if kept == 0 {
                dropped_entries += 1;
            }
        }

        if dropped_entries > 0 {
            warn!(dropped_entries, seen, "entries without entity tags dropped");
        }
        debug!(entries = index.len(), dropped_tags, "built explicit tag index");
        index
    }
}

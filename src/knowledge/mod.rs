//! Learned knowledge: item aliases, abbreviation token mappings, and the
//! search-learning hit log.
//!
//! Read during scoring/expansion; written only by the feedback loop in
//! [`learning`]. Entries are created on first confirmed correction, updated
//! on repeats, and never auto-deleted.

pub mod alias_store;
pub mod learning;
pub mod search_log;
pub mod token_store;

use serde::{Deserialize, Serialize};

use crate::types::errors::ResolveError;

pub use alias_store::{AliasKind, AliasRow, AliasSignal, AliasSignalKind, ItemAliasStore};
pub use learning::{learn_from_confirmation, ConfirmedSelection, TrainingExample, TrainingLog};
pub use search_log::{SearchHitRow, SearchLearningLog};
pub use token_store::{ExpandedQuery, TokenMapping, TokenMappingStore, TokenType};

/// Serialized form exchanged with the knowledge-store collaborator.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    #[serde(default)]
    pub aliases: Vec<AliasRow>,
    #[serde(default)]
    pub token_mappings: Vec<TokenMapping>,
    #[serde(default)]
    pub search_hits: Vec<SearchHitRow>,
}

/// All learned knowledge behind one handle.
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    pub aliases: ItemAliasStore,
    pub tokens: TokenMappingStore,
    pub search_log: SearchLearningLog,
    pub training: TrainingLog,
}

impl KnowledgeStore {
    pub fn from_snapshot(snapshot: KnowledgeSnapshot) -> Self {
        Self {
            aliases: ItemAliasStore::new(snapshot.aliases),
            tokens: TokenMappingStore::new(snapshot.token_mappings),
            search_log: SearchLearningLog::new(snapshot.search_hits),
            training: TrainingLog::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ResolveError> {
        let snapshot: KnowledgeSnapshot = serde_json::from_str(json)
            .map_err(|e| ResolveError::Knowledge(format!("invalid knowledge snapshot: {e}")))?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Serialize the current stores for the persistence collaborator.
    pub fn snapshot(&self) -> KnowledgeSnapshot {
        KnowledgeSnapshot {
            aliases: self.aliases.rows(),
            token_mappings: self.tokens.rows().to_vec(),
            search_hits: self.search_log.rows(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let json = r#"{
            "aliases": [{"alias": "무똥", "item_code": "W010", "kind": "producer", "count": 2}],
            "token_mappings": [{"token": "ch", "mapped_text": "Charles Heidsieck",
                                "token_type": "producer", "confidence": 0.9, "learned_count": 4}],
            "search_hits": [{"query": "무똥까데", "item_code": "W010", "hits": 3}]
        }"#;
        let store = KnowledgeStore::from_json(json).expect("snapshot parses");
        assert_eq!(store.aliases.len(), 1);
        assert_eq!(store.tokens.len(), 1);
        assert_eq!(store.search_log.hits("무똥까데", "W010"), 3);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.aliases.len(), 1);
        assert_eq!(snapshot.search_hits[0].hits, 3);
    }
}

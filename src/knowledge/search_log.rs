//! Raw-query → item hit-count log.
//!
//! Independent of alias specificity: every confirmed pick of an item for a
//! query bumps the pair's hit count, and repeated hits earn a logarithmic
//! bonus during ranking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::text::normalizer;

const BONUS_FLOOR: f32 = 0.10;
const BONUS_LN_SCALE: f32 = 0.08;
const BONUS_CAP: f32 = 0.35;

/// One persisted hit row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHitRow {
    pub query: String,
    pub item_code: String,
    pub hits: u32,
}

/// In-memory hit-count log keyed by (tight query, item code).
#[derive(Debug, Default)]
pub struct SearchLearningLog {
    hits: HashMap<(String, String), u32>,
}

impl SearchLearningLog {
    pub fn new(rows: Vec<SearchHitRow>) -> Self {
        let mut hits = HashMap::with_capacity(rows.len());
        for row in rows {
            let tight = normalizer::normalize_tight(&row.query);
            if tight.is_empty() || row.item_code.is_empty() {
                continue;
            }
            // Idempotent monotonic merge: keep the larger count on dupes.
            let slot = hits.entry((tight, row.item_code)).or_insert(0);
            *slot = (*slot).max(row.hits);
        }
        Self { hits }
    }

    /// Idempotent monotonic increment, at-least-once safe.
    pub fn record_hit(&mut self, query: &str, item_code: &str) {
        let tight = normalizer::normalize_tight(query);
        if tight.is_empty() || item_code.is_empty() {
            return;
        }
        let slot = self
            .hits
            .entry((tight, item_code.to_string()))
            .or_insert(0);
        *slot = slot.saturating_add(1);
    }

    pub fn hits(&self, query_tight: &str, item_code: &str) -> u32 {
        self.hits
            .get(&(query_tight.to_string(), item_code.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// min(0.35, 0.10 + ln(1 + hits) × 0.08); zero without any hit.
    pub fn bonus(&self, query_tight: &str, item_code: &str) -> f32 {
        let hits = self.hits(query_tight, item_code);
        if hits == 0 {
            return 0.0;
        }
        (BONUS_FLOOR + (1.0 + hits as f32).ln() * BONUS_LN_SCALE).min(BONUS_CAP)
    }

    /// Export rows for the knowledge-store collaborator.
    pub fn rows(&self) -> Vec<SearchHitRow> {
        let mut rows: Vec<SearchHitRow> = self
            .hits
            .iter()
            .map(|((query, item_code), &hits)| SearchHitRow {
                query: query.clone(),
                item_code: item_code.clone(),
                hits,
            })
            .collect();
        rows.sort_by(|a, b| a.query.cmp(&b.query).then_with(|| a.item_code.cmp(&b.item_code)));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_grows_with_hits_and_caps() {
        let mut log = SearchLearningLog::default();
        assert_eq!(log.bonus("무똥까데", "W010"), 0.0);

        log.record_hit("무똥까데", "W010");
        let one = log.bonus("무똥까데", "W010");
        assert!((one - (0.10 + 2.0_f32.ln() * 0.08)).abs() < 1e-6);

        for _ in 0..100 {
            log.record_hit("무똥까데", "W010");
        }
        assert_eq!(log.bonus("무똥까데", "W010"), 0.35);
    }

    #[test]
    fn test_hits_keyed_by_normalized_query() {
        let mut log = SearchLearningLog::default();
        log.record_hit("무똥 까데!", "W010");
        assert_eq!(log.hits("무똥까데", "W010"), 1);
        assert_eq!(log.hits("무똥까데", "W999"), 0);
    }
}

//! Learned item aliases: phrase → canonical item code.
//!
//! One flat store with two derived views, forward (alias → canonicals) and
//! reverse (canonical → shortest alias), rebuilt lazily whenever the store
//! changes, never maintained as duplicated storage.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::text::normalizer;

/// Specificity cutoffs: a specific alias pins down one item well enough to
/// earn full contains-credit.
const SPECIFIC_MIN_TOKENS: usize = 3;
const SPECIFIC_MIN_CHARS: usize = 12;

/// Exact-match bonus ladder by confirmation count.
const EXACT_BONUS_1: f32 = 0.20;
const EXACT_BONUS_2: f32 = 0.30;
const EXACT_BONUS_3: f32 = 0.40;

/// What an alias names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasKind {
    Producer,
    Varietal,
    Region,
    Vintage,
    FullName,
}

/// One persisted alias row, as exchanged with the knowledge-store
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasRow {
    pub alias: String,
    pub item_code: String,
    pub kind: AliasKind,
    pub count: u32,
}

#[derive(Debug, Clone)]
struct AliasEntry {
    raw: String,
    tight: String,
    token_count: usize,
    item_code: String,
    kind: AliasKind,
    count: u32,
}

impl AliasEntry {
    fn is_specific(&self) -> bool {
        self.token_count >= SPECIFIC_MIN_TOKENS
            || self.tight.chars().count() >= SPECIFIC_MIN_CHARS
    }
}

/// How the alias signal matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasSignalKind {
    Exact,
    ContainsSpecific,
    ContainsWeak,
    None,
}

/// Alias contribution for one (query, item) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AliasSignal {
    pub score: f32,
    pub count: u32,
    pub kind: AliasSignalKind,
}

impl AliasSignal {
    pub fn none() -> Self {
        Self {
            score: 0.0,
            count: 0,
            kind: AliasSignalKind::None,
        }
    }
}

#[derive(Debug, Default)]
struct AliasIndexes {
    /// tight alias → entry indices.
    forward: HashMap<String, Vec<usize>>,
    /// item code → entry indices.
    by_item: HashMap<String, Vec<usize>>,
    /// item code → index of its shortest alias.
    shortest: HashMap<String, usize>,
}

/// The mutable alias store.
#[derive(Debug, Default)]
pub struct ItemAliasStore {
    entries: Vec<AliasEntry>,
    indexes: OnceLock<AliasIndexes>,
}

impl ItemAliasStore {
    pub fn new(rows: Vec<AliasRow>) -> Self {
        let entries = rows
            .into_iter()
            .filter_map(|row| make_entry(&row.alias, &row.item_code, row.kind, row.count))
            .collect();
        Self {
            entries,
            indexes: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upsert an alias from a confirmed selection: count++ on repeats,
    /// created on first confirmation, never deleted.
    pub fn record_confirmation(&mut self, alias_text: &str, item_code: &str, kind: AliasKind) {
        let tight = normalizer::normalize_tight(alias_text);
        if tight.is_empty() {
            return;
        }

        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.tight == tight && entry.item_code == item_code)
        {
            entry.count = entry.count.saturating_add(1);
        } else if let Some(entry) = make_entry(alias_text, item_code, kind, 1) {
            self.entries.push(entry);
        }

        // Derived views are stale now; rebuilt on next read.
        self.indexes = OnceLock::new();
    }

    /// Alias contribution for a (tight query, item) pair.
    ///
    /// Exact match on the whole query wins; otherwise the best alias of the
    /// item contained in the query counts, with non-specific aliases earning
    /// half credit.
    pub fn signal(&self, query_tight: &str, item_code: &str) -> AliasSignal {
        if query_tight.is_empty() {
            return AliasSignal::none();
        }
        let indexes = self.indexes();

        if let Some(entry_indices) = indexes.forward.get(query_tight) {
            if let Some(entry) = entry_indices
                .iter()
                .map(|&index| &self.entries[index])
                .find(|entry| entry.item_code == item_code)
            {
                return AliasSignal {
                    score: count_scaled_bonus(entry.count),
                    count: entry.count,
                    kind: AliasSignalKind::Exact,
                };
            }
        }

        let mut best = AliasSignal::none();
        if let Some(entry_indices) = indexes.by_item.get(item_code) {
            for &index in entry_indices {
                let entry = &self.entries[index];
                if entry.tight.chars().count() < 2 || !query_tight.contains(&entry.tight) {
                    continue;
                }
                let (kind, score) = if entry.is_specific() {
                    (
                        AliasSignalKind::ContainsSpecific,
                        count_scaled_bonus(entry.count),
                    )
                } else {
                    (
                        AliasSignalKind::ContainsWeak,
                        count_scaled_bonus(entry.count) * 0.5,
                    )
                };
                if score > best.score {
                    best = AliasSignal {
                        score,
                        count: entry.count,
                        kind,
                    };
                }
            }
        }
        best
    }

    /// Shortest learned alias for an item (display/expansion helper).
    pub fn shortest_alias(&self, item_code: &str) -> Option<&str> {
        self.indexes()
            .shortest
            .get(item_code)
            .map(|&index| self.entries[index].raw.as_str())
    }

    /// Export rows for the knowledge-store collaborator.
    pub fn rows(&self) -> Vec<AliasRow> {
        self.entries
            .iter()
            .map(|entry| AliasRow {
                alias: entry.raw.clone(),
                item_code: entry.item_code.clone(),
                kind: entry.kind,
                count: entry.count,
            })
            .collect()
    }

    fn indexes(&self) -> &AliasIndexes {
        self.indexes.get_or_init(|| {
            let mut indexes = AliasIndexes::default();
            for (index, entry) in self.entries.iter().enumerate() {
                indexes
                    .forward
                    .entry(entry.tight.clone())
                    .or_default()
                    .push(index);
                indexes
                    .by_item
                    .entry(entry.item_code.clone())
                    .or_default()
                    .push(index);
                let shorter = match indexes.shortest.get(&entry.item_code) {
                    Some(&current) => {
                        entry.tight.chars().count()
                            < self.entries[current].tight.chars().count()
                    }
                    None => true,
                };
                if shorter {
                    indexes.shortest.insert(entry.item_code.clone(), index);
                }
            }
            indexes
        })
    }
}

fn make_entry(alias: &str, item_code: &str, kind: AliasKind, count: u32) -> Option<AliasEntry> {
    let tight = normalizer::normalize_tight(alias);
    if tight.is_empty() || item_code.is_empty() {
        return None;
    }
    Some(AliasEntry {
        raw: alias.to_string(),
        token_count: normalizer::tokenize(alias).len().max(1),
        tight,
        item_code: item_code.to_string(),
        kind,
        count: count.max(1),
    })
}

fn count_scaled_bonus(count: u32) -> f32 {
    match count {
        0 | 1 => EXACT_BONUS_1,
        2 => EXACT_BONUS_2,
        _ => EXACT_BONUS_3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_signal_scales_with_count() {
        let mut store = ItemAliasStore::default();
        store.record_confirmation("무똥", "W010", AliasKind::Producer);
        assert_eq!(
            store.signal("무똥", "W010"),
            AliasSignal {
                score: 0.20,
                count: 1,
                kind: AliasSignalKind::Exact
            }
        );

        store.record_confirmation("무똥", "W010", AliasKind::Producer);
        assert_eq!(store.signal("무똥", "W010").score, 0.30);

        store.record_confirmation("무똥", "W010", AliasKind::Producer);
        store.record_confirmation("무똥", "W010", AliasKind::Producer);
        let signal = store.signal("무똥", "W010");
        assert_eq!(signal.score, 0.40);
        assert_eq!(signal.count, 4);
    }

    #[test]
    fn test_contains_weak_is_half_credit() {
        let mut store = ItemAliasStore::default();
        // Two tokens, short: non-specific.
        store.record_confirmation("무똥 까데", "W010", AliasKind::FullName);
        let signal = store.signal("무똥까데2019빈티지추가주문", "W010");
        assert_eq!(signal.kind, AliasSignalKind::ContainsWeak);
        assert_eq!(signal.score, 0.10);
    }

    #[test]
    fn test_contains_specific_full_credit() {
        let mut store = ItemAliasStore::default();
        store.record_confirmation("샤토 무똥 로칠드 까베르네", "W011", AliasKind::FullName);
        let signal = store.signal("샤토무똥로칠드까베르네한박스요", "W011");
        assert_eq!(signal.kind, AliasSignalKind::ContainsSpecific);
        assert_eq!(signal.score, 0.20);
    }

    #[test]
    fn test_no_signal_for_other_item() {
        let mut store = ItemAliasStore::default();
        store.record_confirmation("무똥", "W010", AliasKind::Producer);
        assert_eq!(store.signal("무똥", "W999").kind, AliasSignalKind::None);
    }

    #[test]
    fn test_shortest_alias_reverse_index() {
        let mut store = ItemAliasStore::default();
        store.record_confirmation("샤토 무똥 로칠드", "W010", AliasKind::FullName);
        store.record_confirmation("무똥", "W010", AliasKind::Producer);
        assert_eq!(store.shortest_alias("W010"), Some("무똥"));
    }

    #[test]
    fn test_alias_lookup_is_normalized() {
        let mut store = ItemAliasStore::default();
        store.record_confirmation("Ch. Margaux!", "W020", AliasKind::FullName);
        let signal = store.signal(&normalizer::normalize_tight("ch margaux"), "W020");
        assert_eq!(signal.kind, AliasSignalKind::Exact);
    }
}

//! Process-wide read cache over catalog and client-history rows.
//!
//! An explicit handle passed into scoring, never a module-level singleton.
//! Refresh/invalidation is the collaborator's responsibility; the cache
//! pre-computes text profiles per item so per-call scoring never
//! re-normalizes catalog text.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::types::{CatalogItem, ClientItemHistory};
use crate::similarity::TextProfile;
use crate::text::normalizer;
use crate::types::errors::ResolveError;

/// Pre-computed matching surfaces for one catalog item.
#[derive(Debug, Clone)]
pub struct PreparedItem {
    pub local: TextProfile,
    pub foreign: Option<TextProfile>,
    pub producer_tight: Option<String>,
    /// Vintage from the dedicated column, else parsed out of the local name.
    pub vintage: Option<u16>,
}

/// The catalog cache: all known items plus per-client history snapshots.
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    items: Vec<CatalogItem>,
    prepared: Vec<PreparedItem>,
    by_code: HashMap<String, usize>,
    /// Deterministic postings: product line → item indices.
    product_lines: BTreeMap<String, Vec<usize>>,
    /// Normalized producer phrase → raw producer name (first seen).
    producers: BTreeMap<String, String>,
    histories: HashMap<String, Vec<ClientItemHistory>>,
}

impl CatalogCache {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut cache = Self::default();
        cache.refresh(items);
        cache
    }

    /// Load a catalog snapshot from a JSON array of rows.
    pub fn from_json(json: &str) -> Result<Self, ResolveError> {
        let items: Vec<CatalogItem> = serde_json::from_str(json)
            .map_err(|e| ResolveError::Catalog(format!("invalid catalog snapshot: {e}")))?;
        Ok(Self::new(items))
    }

    /// Replace the catalog snapshot and rebuild all derived structures.
    /// Client-history snapshots are kept; the collaborator refreshes them
    /// separately.
    pub fn refresh(&mut self, items: Vec<CatalogItem>) {
        let prepared: Vec<PreparedItem> = items
            .iter()
            .map(|item| PreparedItem {
                local: TextProfile::new(&item.name_local),
                foreign: item
                    .name_foreign
                    .as_deref()
                    .filter(|name| !name.trim().is_empty())
                    .map(TextProfile::new),
                producer_tight: item
                    .producer
                    .as_deref()
                    .map(normalizer::normalize_tight)
                    .filter(|tight| !tight.is_empty()),
                vintage: item
                    .vintage
                    .or_else(|| normalizer::extract_vintage_hint(&item.name_local)),
            })
            .collect();

        let mut by_code = HashMap::with_capacity(items.len());
        let mut product_lines: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut producers: BTreeMap<String, String> = BTreeMap::new();

        for (index, item) in items.iter().enumerate() {
            by_code.insert(item.item_code.clone(), index);
            if let Some(line) = item.product_line.as_deref().filter(|l| !l.is_empty()) {
                product_lines.entry(line.to_string()).or_default().push(index);
            }
            if let (Some(tight), Some(raw)) =
                (prepared[index].producer_tight.clone(), item.producer.clone())
            {
                producers.entry(tight).or_insert(raw);
            }
        }

        self.items = items;
        self.prepared = prepared;
        self.by_code = by_code;
        self.product_lines = product_lines;
        self.producers = producers;
    }

    /// Replace one client's history snapshot.
    pub fn load_client_history(&mut self, client_id: &str, rows: Vec<ClientItemHistory>) {
        self.histories.insert(client_id.to_string(), rows);
    }

    /// History rows for a client; `None` means the client is unknown to the
    /// snapshot (distinct from a known client with zero purchases).
    pub fn client_history(&self, client_id: &str) -> Option<&[ClientItemHistory]> {
        self.histories.get(client_id).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, index: usize) -> &CatalogItem {
        &self.items[index]
    }

    pub fn prepared(&self, index: usize) -> &PreparedItem {
        &self.prepared[index]
    }

    pub fn index_of(&self, item_code: &str) -> Option<usize> {
        self.by_code.get(item_code).copied()
    }

    pub fn get(&self, item_code: &str) -> Option<&CatalogItem> {
        self.index_of(item_code).map(|index| &self.items[index])
    }

    /// Item indices for a fallback scan, optionally scoped to an alternate
    /// catalog by product line. An unknown product line yields the full
    /// catalog rather than nothing.
    pub fn scan_indices(&self, product_line: Option<&str>) -> Vec<usize> {
        match product_line.and_then(|line| self.product_lines.get(line)) {
            Some(indices) => indices.clone(),
            None => (0..self.items.len()).collect(),
        }
    }

    /// Known producer phrases, normalized → raw.
    pub fn producers(&self) -> &BTreeMap<String, String> {
        &self.producers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(code: &str, local: &str, foreign: Option<&str>, producer: Option<&str>) -> CatalogItem {
        CatalogItem {
            item_code: code.to_string(),
            name_local: local.to_string(),
            name_foreign: foreign.map(str::to_string),
            producer: producer.map(str::to_string),
            varietals: Vec::new(),
            vintage: None,
            price: None,
            available: true,
            product_line: None,
        }
    }

    #[test]
    fn test_prepared_profiles_and_vintage() {
        let cache = CatalogCache::new(vec![item(
            "W001",
            "샤토 마고 2015",
            Some("Chateau Margaux 2015"),
            Some("Chateau Margaux"),
        )]);
        let prepared = cache.prepared(0);
        assert_eq!(prepared.local.tight, "샤토마고2015");
        assert_eq!(prepared.vintage, Some(2015));
        assert_eq!(prepared.producer_tight.as_deref(), Some("chateaumargaux"));
    }

    #[test]
    fn test_unknown_client_vs_empty_history() {
        let mut cache = CatalogCache::new(vec![item("W001", "샤토 마고", None, None)]);
        assert!(cache.client_history("C01").is_none());
        cache.load_client_history("C01", Vec::new());
        assert_eq!(cache.client_history("C01"), Some(&[][..]));
    }

    #[test]
    fn test_scan_indices_by_product_line() {
        let mut wine = item("W001", "샤토 마고", None, None);
        wine.product_line = Some("wine".to_string());
        let mut sake = item("S001", "닷사이 45", None, None);
        sake.product_line = Some("sake".to_string());
        let cache = CatalogCache::new(vec![wine, sake]);

        assert_eq!(cache.scan_indices(Some("wine")), vec![0]);
        assert_eq!(cache.scan_indices(None), vec![0, 1]);
        // Unknown line falls back to the whole catalog.
        assert_eq!(cache.scan_indices(Some("beer")), vec![0, 1]);
    }

    #[test]
    fn test_from_json_snapshot() {
        let json = r#"[
            {"item_code": "W001", "name_local": "샤토 마고 2015", "producer": "Chateau Margaux"},
            {"item_code": "W002", "name_local": "끌로 뒤 발 까베르네"}
        ]"#;
        let cache = CatalogCache::from_json(json).expect("snapshot parses");
        assert_eq!(cache.len(), 2);
        assert!(cache.get("W002").is_some());
    }
}

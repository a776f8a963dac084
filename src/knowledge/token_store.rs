//! Learned abbreviation substitutions: short token → canonical phrase.
//!
//! Distinct from item aliases: a token mapping expands a query *before*
//! scoring ("ch" → "Charles Heidsieck"), while an alias points at a catalog
//! item. Confidence only ever goes up.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::text::normalizer;

/// Confidence granted on first learn; each repeat adds `LEARN_STEP`.
const INITIAL_CONFIDENCE: f32 = 0.6;
const LEARN_STEP: f32 = 0.1;
const MAX_CONFIDENCE: f32 = 1.0;

/// What a mapped phrase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Producer,
    Varietal,
    Region,
}

/// One learned substitution row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMapping {
    /// Tight-normalized token as it appears in order lines.
    pub token: String,
    /// Canonical phrase the token abbreviates.
    pub mapped_text: String,
    pub token_type: TokenType,
    pub confidence: f32,
    pub learned_count: u32,
}

/// Query expansion variants produced by `expand_query`.
///
/// The scorer tries each and keeps the best, so a wrong expansion can never
/// hurt a line that already matched well unexpanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedQuery {
    pub original: String,
    pub expanded: String,
    pub producer_only: String,
    pub varietal_only: String,
}

impl ExpandedQuery {
    /// Distinct variants, original first.
    pub fn variants(&self) -> Vec<&str> {
        let mut variants = vec![self.original.as_str()];
        for variant in [
            self.expanded.as_str(),
            self.producer_only.as_str(),
            self.varietal_only.as_str(),
        ] {
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
        variants
    }
}

/// The mutable token-mapping store.
#[derive(Debug, Default)]
pub struct TokenMappingStore {
    rows: Vec<TokenMapping>,
    by_token: OnceLock<HashMap<String, Vec<usize>>>,
}

impl TokenMappingStore {
    pub fn new(rows: Vec<TokenMapping>) -> Self {
        let rows = rows
            .into_iter()
            .filter(|row| !row.token.is_empty() && !row.mapped_text.is_empty())
            .map(|mut row| {
                row.token = normalizer::normalize_tight(&row.token);
                row.confidence = row.confidence.clamp(0.0, MAX_CONFIDENCE);
                row
            })
            .filter(|row| !row.token.is_empty())
            .collect();
        Self {
            rows,
            by_token: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest-confidence mapping for a token, if any.
    pub fn lookup(&self, token: &str) -> Option<&TokenMapping> {
        let tight = normalizer::normalize_tight(token);
        self.by_token()
            .get(&tight)?
            .iter()
            .map(|&index| &self.rows[index])
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Upsert a learned mapping: confidence +0.1 capped at 1.0 and
    /// learned_count++ on repeats; created at the initial confidence on
    /// first learn. Never decreases, never deletes.
    pub fn upsert(&mut self, token: &str, mapped_text: &str, token_type: TokenType) {
        let tight = normalizer::normalize_tight(token);
        if tight.is_empty() || mapped_text.trim().is_empty() {
            return;
        }

        if let Some(row) = self.rows.iter_mut().find(|row| {
            row.token == tight && row.mapped_text == mapped_text && row.token_type == token_type
        }) {
            row.confidence = (row.confidence + LEARN_STEP).min(MAX_CONFIDENCE);
            row.learned_count = row.learned_count.saturating_add(1);
        } else {
            self.rows.push(TokenMapping {
                token: tight,
                mapped_text: mapped_text.trim().to_string(),
                token_type,
                confidence: INITIAL_CONFIDENCE,
                learned_count: 1,
            });
        }

        self.by_token = OnceLock::new();
    }

    /// Substitute learned abbreviations at/above `min_confidence`.
    ///
    /// Returns the original, the fully-expanded, and the partial
    /// (producer-only / varietal-only) forms. Tokens without a qualifying
    /// mapping pass through verbatim.
    pub fn expand_query(&self, text: &str, min_confidence: f32) -> ExpandedQuery {
        let mut expanded = Vec::new();
        let mut producer_only = Vec::new();
        let mut varietal_only = Vec::new();

        for token in text.split_whitespace() {
            let mapping = self
                .lookup(token)
                .filter(|mapping| mapping.confidence >= min_confidence);

            match mapping {
                Some(mapping) => {
                    expanded.push(mapping.mapped_text.as_str());
                    if mapping.token_type == TokenType::Producer {
                        producer_only.push(mapping.mapped_text.as_str());
                    } else {
                        producer_only.push(token);
                    }
                    if mapping.token_type == TokenType::Varietal {
                        varietal_only.push(mapping.mapped_text.as_str());
                    } else {
                        varietal_only.push(token);
                    }
                }
                None => {
                    expanded.push(token);
                    producer_only.push(token);
                    varietal_only.push(token);
                }
            }
        }

        ExpandedQuery {
            original: text.to_string(),
            expanded: expanded.join(" "),
            producer_only: producer_only.join(" "),
            varietal_only: varietal_only.join(" "),
        }
    }

    /// Export rows for the knowledge-store collaborator.
    pub fn rows(&self) -> &[TokenMapping] {
        &self.rows
    }

    fn by_token(&self) -> &HashMap<String, Vec<usize>> {
        self.by_token.get_or_init(|| {
            let mut index: HashMap<String, Vec<usize>> = HashMap::new();
            for (row_index, row) in self.rows.iter().enumerate() {
                index.entry(row.token.clone()).or_default().push(row_index);
            }
            index
        })
    }
}

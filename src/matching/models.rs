//! Domain types for the resolution pipeline.
//!
//! Contains: OrderLine, MatchStatus, ResolveMethod, CandidateSource,
//! MatchedBy, Signal, Candidate, ResolutionResult.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::knowledge::AliasSignalKind;
use crate::text::normalizer;

/// A parsed order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub raw: String,
    pub quantity: Option<u32>,
    /// Text after quantity-stripping.
    pub stripped: String,
    /// Tight-normalized stripped text (alias/search-log key).
    pub normalized: String,
    pub tokens: Vec<String>,
    /// Explicit vintage year found in the raw line.
    pub vintage_hint: Option<u16>,
}

impl OrderLine {
    pub fn parse(raw: &str) -> Self {
        let vintage_hint = normalizer::extract_vintage_hint(raw);
        let (stripped, quantity) = normalizer::strip_quantity_and_unit(raw);
        Self {
            raw: raw.to_string(),
            quantity,
            normalized: normalizer::normalize_tight(&stripped),
            tokens: normalizer::tokenize(&stripped),
            stripped,
            vintage_hint,
        }
    }

    /// No usable tokens: "no match possible", not an error.
    pub fn is_unmatchable(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Resolution status for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Accepted automatically with high confidence.
    Resolved,
    /// Requires manual review (ranked candidates returned).
    NeedsReview,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Resolved => write!(f, "Resolved"),
            MatchStatus::NeedsReview => write!(f, "NeedsReview"),
        }
    }
}

/// How the outcome was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMethod {
    /// Strict auto-confirm over client history.
    HistoryAuto,
    /// Relaxed force-mode confirm over client history.
    HistoryForced,
    /// Review list from history and/or catalog-wide fallback.
    Review,
    /// Line had no usable tokens.
    EmptyInput,
    /// Catalog cache was empty.
    CatalogUnavailable,
}

impl std::fmt::Display for ResolveMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveMethod::HistoryAuto => write!(f, "history_auto"),
            ResolveMethod::HistoryForced => write!(f, "history_forced"),
            ResolveMethod::Review => write!(f, "review"),
            ResolveMethod::EmptyInput => write!(f, "empty_input"),
            ResolveMethod::CatalogUnavailable => write!(f, "catalog_unavailable"),
        }
    }
}

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Client's purchase history.
    History,
    /// Catalog-wide fallback (new-item search).
    Catalog,
}

/// Which name matched when local/foreign scores diverge meaningfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    Local,
    Foreign,
}

/// Structured per-signal breakdown explaining a candidate's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Signal {
    /// Multi-level textual similarity, best expansion variant.
    BaseText { score: f32, weighted: f32, variant: usize },
    /// Learned alias signal.
    LearnedAlias {
        kind: AliasSignalKind,
        count: u32,
        weighted: f32,
    },
    /// Days since the client last bought this item.
    RecentPurchase { days: i64, weighted: f32 },
    /// Lifetime purchase count for (client, item).
    PurchaseFrequency { count: u32, weighted: f32 },
    /// Vintage hint agreement or vintage recency.
    Vintage {
        hint: Option<u16>,
        vintage: Option<u16>,
        weighted: f32,
    },
    /// Raw-query hit-count bonus.
    SearchLearning { hits: u32, weighted: f32 },
}

/// A scored candidate item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub item_code: String,
    pub display_name: String,
    /// Raw multi-level textual similarity in [0, 1].
    pub base_score: f32,
    /// Unnormalized weighted sum of all signals.
    pub final_score: f32,
    pub signals: Vec<Signal>,
    pub source: CandidateSource,
    pub matched_by: Option<MatchedBy>,
    /// Last purchase date for deterministic tie-breaking.
    pub last_purchase: Option<NaiveDate>,
}

impl Candidate {
    /// Final score mapped onto the 0-1 confidence scale used by the
    /// acceptance gates (final / base weight; ranking never uses this).
    pub fn confidence(&self, base_score_weight: f32) -> f32 {
        if base_score_weight <= 0.0 {
            return 0.0;
        }
        self.final_score / base_score_weight
    }
}

/// Result contract for one order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub status: MatchStatus,
    pub method: ResolveMethod,
    /// Chosen item when resolved.
    pub chosen: Option<Candidate>,
    /// Ranked candidates (review list, or context for an auto-confirm).
    pub candidates: Vec<Candidate>,
    pub line: OrderLine,
}

impl ResolutionResult {
    pub fn empty_input(line: OrderLine) -> Self {
        Self {
            status: MatchStatus::NeedsReview,
            method: ResolveMethod::EmptyInput,
            chosen: None,
            candidates: Vec::new(),
            line,
        }
    }

    pub fn catalog_unavailable(line: OrderLine) -> Self {
        Self {
            status: MatchStatus::NeedsReview,
            method: ResolveMethod::CatalogUnavailable,
            chosen: None,
            candidates: Vec::new(),
            line,
        }
    }
}

/// Sort candidates deterministically: final_score desc → more recent
/// purchase first → item_code asc.
pub fn sort_candidates_deterministic(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.last_purchase.cmp(&a.last_purchase))
            .then_with(|| a.item_code.cmp(&b.item_code))
    });
}

#[cfg(test)]
#[path = "tests/models_tests.rs"]
mod tests;

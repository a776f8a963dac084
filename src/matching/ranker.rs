//! Weighted candidate scoring.
//!
//! Five signals, each multiplied by its configured weight, summed without
//! renormalization: a dominant textual match must never be diluted by many
//! small bonuses. History bonuses are bounded so a ≥ 0.15 base-score gap
//! always outranks them.

use chrono::{Datelike, NaiveDate};

use crate::catalog::{CatalogItem, ClientItemHistory, PreparedItem};
use crate::config::ResolverConfig;
use crate::knowledge::{AliasSignalKind, KnowledgeStore};
use crate::matching::models::{Candidate, CandidateSource, MatchedBy, Signal};
use crate::similarity::{multi_level_score, TextProfile};

// ── Signal buckets ───────────────────────────────────────────────────

const RECENCY_7D: f32 = 0.20;
const RECENCY_30D: f32 = 0.15;
const RECENCY_90D: f32 = 0.10;
const RECENCY_OLDER: f32 = 0.05;

const FREQUENCY_10: f32 = 0.15;
const FREQUENCY_5: f32 = 0.10;
const FREQUENCY_2: f32 = 0.05;
const FREQUENCY_1: f32 = 0.02;

const VINTAGE_HINT_MATCH: f32 = 0.08;
const VINTAGE_HINT_MISMATCH: f32 = -0.18;
const VINTAGE_CURRENT: f32 = 0.20;
const VINTAGE_1Y: f32 = 0.15;
const VINTAGE_2Y: f32 = 0.10;
const VINTAGE_OLDER: f32 = 0.05;

/// Per-call scoring inputs shared across the candidate pool.
#[derive(Debug)]
pub(crate) struct RankContext<'a> {
    /// Profiles of every expansion variant, original first.
    pub variants: Vec<TextProfile>,
    /// Tight original query, used as the alias/search-log key.
    pub query_tight: String,
    pub vintage_hint: Option<u16>,
    pub today: NaiveDate,
    pub knowledge: &'a KnowledgeStore,
    pub config: &'a ResolverConfig,
}

/// Score one catalog item against the query, with optional history row.
pub(crate) fn score_candidate(
    ctx: &RankContext<'_>,
    item: &CatalogItem,
    prepared: &PreparedItem,
    history: Option<&ClientItemHistory>,
    source: CandidateSource,
) -> Candidate {
    let config = ctx.config;
    let mut signals = Vec::with_capacity(6);

    let (base_score, variant, matched_by) = best_base_score(ctx, prepared);
    let base_weighted = base_score * config.base_score_weight;
    signals.push(Signal::BaseText {
        score: base_score,
        weighted: base_weighted,
        variant,
    });
    let mut final_score = base_weighted;

    let alias = ctx.knowledge.aliases.signal(&ctx.query_tight, &item.item_code);
    if alias.kind != AliasSignalKind::None {
        let weighted = alias.score * config.alias_weight;
        signals.push(Signal::LearnedAlias {
            kind: alias.kind,
            count: alias.count,
            weighted,
        });
        final_score += weighted;
    }

    let last_purchase = history.and_then(|row| row.last_purchase_date);
    if let Some(date) = last_purchase {
        let days = (ctx.today - date).num_days();
        let weighted = recency_score(days) * config.recency_weight;
        signals.push(Signal::RecentPurchase { days, weighted });
        final_score += weighted;
    }

    if let Some(count) = history.map(|row| row.purchase_count).filter(|&c| c > 0) {
        let weighted = frequency_score(count) * config.frequency_weight;
        signals.push(Signal::PurchaseFrequency { count, weighted });
        final_score += weighted;
    }

    let vintage = vintage_score(ctx.vintage_hint, prepared.vintage, ctx.today.year());
    if vintage != 0.0 {
        let weighted = vintage * config.vintage_weight;
        signals.push(Signal::Vintage {
            hint: ctx.vintage_hint,
            vintage: prepared.vintage,
            weighted,
        });
        final_score += weighted;
    }

    let hits = ctx
        .knowledge
        .search_log
        .hits(&ctx.query_tight, &item.item_code);
    if hits > 0 {
        let weighted = ctx
            .knowledge
            .search_log
            .bonus(&ctx.query_tight, &item.item_code);
        signals.push(Signal::SearchLearning { hits, weighted });
        final_score += weighted;
    }

    let display_name = history
        .and_then(|row| row.display_name.clone())
        .unwrap_or_else(|| item.name_local.clone());

    Candidate {
        item_code: item.item_code.clone(),
        display_name,
        base_score,
        final_score,
        signals,
        source,
        matched_by,
        last_purchase,
    }
}

/// Best textual score across expansion variants and both language names.
///
/// Returns (score, winning variant index, matched-by tag when the two
/// language scores diverge meaningfully).
fn best_base_score(
    ctx: &RankContext<'_>,
    prepared: &PreparedItem,
) -> (f32, usize, Option<MatchedBy>) {
    let mut best = 0.0_f32;
    let mut best_variant = 0;
    let mut best_local = 0.0_f32;
    let mut best_foreign = 0.0_f32;

    for (index, variant) in ctx.variants.iter().enumerate() {
        let local = multi_level_score(variant, &prepared.local);
        let foreign = prepared
            .foreign
            .as_ref()
            .map(|profile| multi_level_score(variant, profile))
            .unwrap_or(0.0);
        let combined = local.max(foreign);
        if combined > best {
            best = combined;
            best_variant = index;
            best_local = local;
            best_foreign = foreign;
        }
    }

    let matched_by = if (best_local - best_foreign).abs() >= ctx.config.language_divergence {
        if best_local >= best_foreign {
            Some(MatchedBy::Local)
        } else {
            Some(MatchedBy::Foreign)
        }
    } else {
        None
    };

    (best, best_variant, matched_by)
}

pub(crate) fn recency_score(days_since: i64) -> f32 {
    if days_since <= 7 {
        RECENCY_7D
    } else if days_since <= 30 {
        RECENCY_30D
    } else if days_since <= 90 {
        RECENCY_90D
    } else {
        RECENCY_OLDER
    }
}

pub(crate) fn frequency_score(count: u32) -> f32 {
    if count >= 10 {
        FREQUENCY_10
    } else if count >= 5 {
        FREQUENCY_5
    } else if count >= 2 {
        FREQUENCY_2
    } else {
        FREQUENCY_1
    }
}

/// Explicit hint agreement, else a decaying recency-of-vintage bonus.
pub(crate) fn vintage_score(hint: Option<u16>, vintage: Option<u16>, current_year: i32) -> f32 {
    let Some(vintage) = vintage else {
        return 0.0;
    };
    if let Some(hint) = hint {
        return if hint == vintage {
            VINTAGE_HINT_MATCH
        } else {
            VINTAGE_HINT_MISMATCH
        };
    }
    let age = current_year - i32::from(vintage);
    if age <= 0 {
        VINTAGE_CURRENT
    } else if age == 1 {
        VINTAGE_1Y
    } else if age == 2 {
        VINTAGE_2Y
    } else {
        VINTAGE_OLDER
    }
}

#[cfg(test)]
#[path = "tests/ranker_tests.rs"]
mod tests;

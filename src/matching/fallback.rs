//! Catalog-wide fallback matcher (new-item search).
//!
//! Fires when the client-scoped pool is weak. Scores the full catalog
//! (never history-scoped) against both language names, with an optional
//! producer pre-filter and alternate catalogs selected by product line.

use rayon::prelude::*;

use crate::catalog::CatalogCache;
use crate::matching::models::{sort_candidates_deterministic, Candidate, CandidateSource};
use crate::matching::ranker::{score_candidate, RankContext};

/// Detect a known producer named by the query.
///
/// Full-phrase containment first; failing that, the first query token must
/// be a prefix of a producer's leading word.
pub(crate) fn detect_producer(
    query_tight: &str,
    first_token: Option<&str>,
    catalog: &CatalogCache,
) -> Option<String> {
    for (producer_tight, _) in catalog.producers() {
        if producer_tight.chars().count() >= 2 && query_tight.contains(producer_tight.as_str()) {
            return Some(producer_tight.clone());
        }
    }

    let token = first_token?;
    if token.chars().count() < 2 {
        return None;
    }
    catalog
        .producers()
        .keys()
        .find(|producer_tight| producer_tight.starts_with(token))
        .cloned()
}

/// Score the catalog for a query, returning the ranked top-K.
///
/// `product_line` selects an alternate catalog; client history never
/// influences the pool.
pub(crate) fn search_catalog(
    ctx: &RankContext<'_>,
    catalog: &CatalogCache,
    product_line: Option<&str>,
) -> Vec<Candidate> {
    let mut indices = catalog.scan_indices(product_line);
    if indices.is_empty() {
        return Vec::new();
    }

    let first_token = ctx
        .variants
        .first()
        .and_then(|profile| profile.tokens.first())
        .map(String::as_str);
    if let Some(producer) = detect_producer(&ctx.query_tight, first_token, catalog) {
        let filtered: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&index| {
                let prepared = catalog.prepared(index);
                prepared.local.tight.contains(&producer)
                    || prepared
                        .foreign
                        .as_ref()
                        .is_some_and(|profile| profile.tight.contains(&producer))
            })
            .collect();
        if filtered.is_empty() {
            log::debug!("producer pre-filter '{producer}' matched nothing, scanning unfiltered");
        } else {
            indices = filtered;
        }
    }

    let mut candidates: Vec<Candidate> = indices
        .par_iter()
        .map(|&index| {
            score_candidate(
                ctx,
                catalog.item(index),
                catalog.prepared(index),
                None,
                CandidateSource::Catalog,
            )
        })
        .filter(|candidate| candidate.base_score > 0.0)
        .collect();

    sort_candidates_deterministic(&mut candidates);
    candidates.truncate(ctx.config.fallback_top_k);
    candidates
}

#[cfg(test)]
#[path = "tests/fallback_tests.rs"]
mod tests;

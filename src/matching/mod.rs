//! Order-line resolution pipeline.
//!
//! Client-scoped scoring first, auto-confirm gates on top, catalog-wide
//! fallback when the client pool is weak, and suggestion composition for
//! everything that needs review.

pub mod acceptance;
pub mod fallback;
pub mod models;
pub mod ranker;

use chrono::{NaiveDate, Utc};

use crate::catalog::CatalogCache;
use crate::config::ResolverConfig;
use crate::knowledge::KnowledgeStore;
use crate::similarity::TextProfile;
use crate::types::errors::{ResolveError, ResolveResult};

pub use models::{
    Candidate, CandidateSource, MatchedBy, MatchStatus, OrderLine, ResolutionResult,
    ResolveMethod, Signal,
};

pub(crate) use models::sort_candidates_deterministic;

use acceptance::{compose_suggestions, passes_accept_gate};
use ranker::{score_candidate, RankContext};

/// Per-call options.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Relaxed force-resolve thresholds.
    pub force: bool,
    /// Explicit vintage hint; otherwise parsed from the line.
    pub vintage_hint: Option<u16>,
    /// Reference date for recency/vintage scoring.
    pub today: NaiveDate,
    /// Alternate catalog selector for the fallback scan.
    pub product_line: Option<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            force: false,
            vintage_hint: None,
            today: Utc::now().date_naive(),
            product_line: None,
        }
    }
}

/// The order-line resolution engine.
///
/// Borrows read-only catalog and knowledge handles; all scoring is
/// synchronous and pure. Learning happens separately via
/// [`crate::knowledge::learn_from_confirmation`].
pub struct OrderLineResolver<'a> {
    catalog: &'a CatalogCache,
    knowledge: &'a KnowledgeStore,
    config: ResolverConfig,
}

impl<'a> OrderLineResolver<'a> {
    pub fn new(catalog: &'a CatalogCache, knowledge: &'a KnowledgeStore) -> Self {
        Self::with_config(catalog, knowledge, ResolverConfig::default())
    }

    pub fn with_config(
        catalog: &'a CatalogCache,
        knowledge: &'a KnowledgeStore,
        config: ResolverConfig,
    ) -> Self {
        Self {
            catalog,
            knowledge,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve one order line against a client's purchase history.
    ///
    /// An unknown client id is the only structured failure; everything else
    /// degrades to a `NeedsReview` result.
    pub fn resolve_line(
        &self,
        raw_text: &str,
        client_id: &str,
        options: &ResolveOptions,
    ) -> ResolveResult<ResolutionResult> {
        let line = OrderLine::parse(raw_text);

        if line.is_unmatchable() {
            return Ok(ResolutionResult::empty_input(line));
        }
        if self.catalog.is_empty() {
            log::warn!("catalog cache is empty, line '{raw_text}' needs review");
            return Ok(ResolutionResult::catalog_unavailable(line));
        }

        let history = self
            .catalog
            .client_history(client_id)
            .ok_or_else(|| ResolveError::UnknownClient(client_id.to_string()))?;

        let ctx = self.rank_context(&line, options);

        // Client-scoped pool, bounded.
        let mut existing: Vec<Candidate> = history
            .iter()
            .take(self.config.history_pool_limit)
            .filter_map(|row| {
                let index = self.catalog.index_of(&row.item_code)?;
                Some(score_candidate(
                    &ctx,
                    self.catalog.item(index),
                    self.catalog.prepared(index),
                    Some(row),
                    CandidateSource::History,
                ))
            })
            .collect();
        sort_candidates_deterministic(&mut existing);

        let gate = self.config.accept_gate(options.force);
        if passes_accept_gate(&existing, gate, &self.config) {
            let method = if options.force {
                ResolveMethod::HistoryForced
            } else {
                ResolveMethod::HistoryAuto
            };
            let mut candidates = existing;
            candidates.truncate(self.config.clamped_top_n());
            return Ok(ResolutionResult {
                status: MatchStatus::Resolved,
                method,
                chosen: candidates.first().cloned(),
                candidates,
                line,
            });
        }

        // Catalog-wide fallback fires iff the best client-scoped confidence
        // is under the new-item threshold (or nothing scored at all).
        let best_confidence = existing
            .first()
            .map(|candidate| candidate.confidence(self.config.base_score_weight))
            .unwrap_or(0.0);
        let fresh = if best_confidence < self.config.new_item_threshold {
            fallback::search_catalog(&ctx, self.catalog, options.product_line.as_deref())
        } else {
            Vec::new()
        };

        let candidates = compose_suggestions(existing, fresh, &self.config);
        Ok(ResolutionResult {
            status: MatchStatus::NeedsReview,
            method: ResolveMethod::Review,
            chosen: None,
            candidates,
            line,
        })
    }

    fn rank_context(&self, line: &OrderLine, options: &ResolveOptions) -> RankContext<'_> {
        let expanded = self
            .knowledge
            .tokens
            .expand_query(&line.stripped, self.config.expand_min_confidence);
        let variants: Vec<TextProfile> = expanded
            .variants()
            .into_iter()
            .map(TextProfile::new)
            .collect();

        RankContext {
            variants,
            query_tight: line.normalized.clone(),
            vintage_hint: options.vintage_hint.or(line.vintage_hint),
            today: options.today,
            knowledge: self.knowledge,
            config: &self.config,
        }
    }
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod pipeline_tests;

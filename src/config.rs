//! Resolver configuration: every weight and threshold in one immutable value.
//!
//! Scores are an unnormalized weighted sum (a dominant textual match must
//! never be diluted by many small bonuses), so acceptance thresholds read on
//! a 0-1 confidence scale obtained by dividing the final score by
//! `base_score_weight`. Ranking itself never renormalizes.

use serde::{Deserialize, Serialize};

/// Immutable weight/threshold table for order-line and client resolution.
///
/// Overridable per call via `OrderLineResolver::with_config`; call sites
/// never carry literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    // Signal weights (summed without renormalization).
    pub base_score_weight: f32,
    pub alias_weight: f32,
    pub recency_weight: f32,
    pub frequency_weight: f32,
    pub vintage_weight: f32,

    // Auto-confirm gates, on the 0-1 confidence scale.
    pub auto_min_score: f32,
    pub auto_min_gap: f32,
    /// Relaxed "force" mode gates.
    pub force_min_score: f32,
    pub force_min_gap: f32,

    /// Catalog-wide fallback fires when the best client-scoped confidence
    /// is below this.
    pub new_item_threshold: f32,

    /// Needs-review list length when only history candidates exist.
    pub review_top_n: usize,
    /// Existing/new mix size when the fallback contributed candidates.
    pub suggestion_slots: usize,

    /// Minimum token-mapping confidence used by query expansion.
    pub expand_min_confidence: f32,

    /// Fallback scan result size.
    pub fallback_top_k: usize,
    /// Local/foreign score divergence that earns a matched-by tag.
    pub language_divergence: f32,

    /// Bound on the client-scoped candidate pool.
    pub history_pool_limit: usize,

    // Client name resolution gates.
    pub client_min_score: f32,
    pub client_min_gap: f32,
    pub client_force_min_score: f32,
    pub client_force_min_gap: f32,
    pub client_top_n: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_score_weight: 5.0,
            alias_weight: 3.0,
            recency_weight: 2.0,
            frequency_weight: 1.5,
            vintage_weight: 1.0,

            auto_min_score: 0.70,
            auto_min_gap: 0.30,
            force_min_score: 0.55,
            force_min_gap: 0.10,

            new_item_threshold: 0.70,

            review_top_n: 5,
            suggestion_slots: 4,

            expand_min_confidence: 0.5,

            fallback_top_k: 8,
            language_divergence: 0.15,

            history_pool_limit: 400,

            client_min_score: 0.85,
            client_min_gap: 0.10,
            client_force_min_score: 0.70,
            client_force_min_gap: 0.05,
            client_top_n: 5,
        }
    }
}

/// Threshold pair used by the acceptance gates.
#[derive(Debug, Clone, Copy)]
pub struct AcceptGate {
    pub min_score: f32,
    pub min_gap: f32,
}

impl ResolverConfig {
    /// Gate for order-line auto-confirm, strict or relaxed.
    pub fn accept_gate(&self, force: bool) -> AcceptGate {
        if force {
            AcceptGate {
                min_score: self.force_min_score,
                min_gap: self.force_min_gap,
            }
        } else {
            AcceptGate {
                min_score: self.auto_min_score,
                min_gap: self.auto_min_gap,
            }
        }
    }

    /// Gate for client-name auto-confirm, strict or relaxed.
    pub fn client_gate(&self, force: bool) -> AcceptGate {
        if force {
            AcceptGate {
                min_score: self.client_force_min_score,
                min_gap: self.client_force_min_gap,
            }
        } else {
            AcceptGate {
                min_score: self.client_min_score,
                min_gap: self.client_min_gap,
            }
        }
    }

    /// Review list length, clamped to a sane band.
    pub fn clamped_top_n(&self) -> usize {
        self.review_top_n.clamp(3, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gates() {
        let config = ResolverConfig::default();
        let strict = config.accept_gate(false);
        let forced = config.accept_gate(true);
        assert!(forced.min_score < strict.min_score);
        assert!(forced.min_gap < strict.min_gap);
    }

    #[test]
    fn test_top_n_clamped() {
        let mut config = ResolverConfig::default();
        config.review_top_n = 50;
        assert_eq!(config.clamped_top_n(), 8);
        config.review_top_n = 1;
        assert_eq!(config.clamped_top_n(), 3);
    }
}

//! Auto-confirm gates and needs-review suggestion composition.
//!
//! Gates read on the 0-1 confidence scale (final score / base weight);
//! ranking stays on the raw unnormalized sum.

use crate::config::{AcceptGate, ResolverConfig};
use crate::matching::models::{sort_candidates_deterministic, Candidate};

#[cfg(feature = "debug_resolver")]
use log::debug;

/// Existing/new mix rules for the 4-slot suggestion list.
const COMPOSE_GAP_ALL_EXISTING: f32 = 0.50;
const COMPOSE_GAP_MOSTLY_EXISTING: f32 = 0.30;
const COMPOSE_GAP_BALANCED: f32 = 0.15;
const COMPOSE_NEW_DOMINANT_RATIO: f32 = 1.2;
const COMPOSE_NEW_FAR_BEHIND_RATIO: f32 = 0.8;

/// Check the auto-confirm gate over a sorted candidate list.
///
/// Passes when the top confidence clears `min_score` and either no
/// runner-up exists or the confidence gap clears `min_gap`.
pub(crate) fn passes_accept_gate(
    candidates: &[Candidate],
    gate: AcceptGate,
    config: &ResolverConfig,
) -> bool {
    let Some(best) = candidates.first() else {
        return false;
    };
    let best_confidence = best.confidence(config.base_score_weight);
    if best_confidence < gate.min_score {
        #[cfg(feature = "debug_resolver")]
        debug!(
            "[RESOLVER_CALIBRATION] accept_gate: threshold_not_met | best={best_confidence:.3} min={:.3}",
            gate.min_score
        );
        return false;
    }

    let Some(second) = candidates.get(1) else {
        return true;
    };
    let gap = best_confidence - second.confidence(config.base_score_weight);
    if gap < gate.min_gap {
        #[cfg(feature = "debug_resolver")]
        debug!(
            "[RESOLVER_CALIBRATION] accept_gate: gap_insufficient | best={best_confidence:.3} gap={gap:.3} min_gap={:.3}",
            gate.min_gap
        );
        return false;
    }
    true
}

/// Compose the needs-review list from existing (history) and new (catalog
/// fallback) candidates.
///
/// The mix over `suggestion_slots` follows the confidence gap between the
/// best existing and best new candidate: a strong existing lead keeps the
/// list history-only, while a weak top match implies the client-scoped pool
/// likely lacks the right item and the list leans on new items.
pub(crate) fn compose_suggestions(
    mut existing: Vec<Candidate>,
    mut fresh: Vec<Candidate>,
    config: &ResolverConfig,
) -> Vec<Candidate> {
    sort_candidates_deterministic(&mut existing);
    sort_candidates_deterministic(&mut fresh);

    // Fallback may rediscover items the history already scored.
    fresh.retain(|candidate| {
        !existing
            .iter()
            .any(|kept| kept.item_code == candidate.item_code)
    });

    if fresh.is_empty() {
        existing.truncate(config.clamped_top_n());
        return existing;
    }
    let slots = config.suggestion_slots.max(1);
    if existing.is_empty() {
        fresh.truncate(slots);
        return fresh;
    }

    let existing_best = existing[0].confidence(config.base_score_weight);
    let fresh_best = fresh[0].confidence(config.base_score_weight);
    let gap = existing_best - fresh_best;

    let existing_slots = if gap >= COMPOSE_GAP_ALL_EXISTING
        && fresh_best <= existing_best * COMPOSE_NEW_FAR_BEHIND_RATIO
    {
        slots
    } else if fresh_best >= existing_best * COMPOSE_NEW_DOMINANT_RATIO {
        1
    } else if gap >= COMPOSE_GAP_MOSTLY_EXISTING {
        slots.saturating_sub(1)
    } else if gap >= COMPOSE_GAP_BALANCED {
        slots / 2
    } else {
        // Weak existing lead: the right item is probably not in history.
        1
    };

    #[cfg(feature = "debug_resolver")]
    debug!(
        "[RESOLVER_CALIBRATION] compose: existing_best={existing_best:.3} fresh_best={fresh_best:.3} gap={gap:.3} existing_slots={existing_slots}"
    );

    let mut composed: Vec<Candidate> = existing.iter().take(existing_slots).cloned().collect();
    composed.extend(fresh.iter().take(slots - composed.len()).cloned());

    // Backfill from whichever side still has ranked candidates.
    if composed.len() < slots {
        for candidate in existing.iter().skip(existing_slots) {
            if composed.len() >= slots {
                break;
            }
            composed.push(candidate.clone());
        }
    }

    sort_candidates_deterministic(&mut composed);
    composed
}

#[cfg(test)]
#[path = "tests/acceptance_tests.rs"]
mod tests;

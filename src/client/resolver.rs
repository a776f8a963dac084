//! Client (vendor) name resolution.
//!
//! Same two-tier policy as order-line resolution: exact normalized match
//! first, then fuzzy character-overlap scoring with a small learned-weight
//! bonus, gated by strict or force thresholds.

use serde::{Deserialize, Serialize};

use crate::config::ResolverConfig;
use crate::matching::models::MatchStatus;
use crate::similarity::ngram;
use crate::text::normalizer;

#[cfg(feature = "debug_resolver")]
use log::debug;

/// Blend of set-overlap and edit-distance metrics for client names.
const CHAR_F1_BLEND: f32 = 0.5;
const JARO_BLEND: f32 = 0.5;

/// Learned-weight bonus: per-confirmation step and cap.
const WEIGHT_BONUS_STEP: f32 = 0.02;
const WEIGHT_BONUS_CAP: f32 = 0.10;

/// One client alias row from the knowledge-store collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAliasRow {
    pub alias: String,
    pub client_code: String,
    pub client_name: String,
    /// Learned weight, bumped on each confirmed use.
    #[serde(default)]
    pub weight: f32,
}

#[derive(Debug, Clone)]
struct ClientAliasEntry {
    row: ClientAliasRow,
    tight: String,
}

/// The client-alias directory.
#[derive(Debug, Default)]
pub struct ClientDirectory {
    entries: Vec<ClientAliasEntry>,
}

impl ClientDirectory {
    pub fn new(rows: Vec<ClientAliasRow>) -> Self {
        let entries = rows
            .into_iter()
            .filter_map(|row| {
                let tight = normalizer::normalize_tight(&row.alias);
                if tight.is_empty() || row.client_code.is_empty() {
                    return None;
                }
                Some(ClientAliasEntry { row, tight })
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bump an alias's learned weight on a confirmed use; creates the alias
    /// on first confirmation.
    pub fn record_confirmation(&mut self, alias: &str, client_code: &str, client_name: &str) {
        let tight = normalizer::normalize_tight(alias);
        if tight.is_empty() {
            return;
        }
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.tight == tight && entry.row.client_code == client_code)
        {
            entry.row.weight += 1.0;
        } else {
            self.entries.push(ClientAliasEntry {
                row: ClientAliasRow {
                    alias: alias.to_string(),
                    client_code: client_code.to_string(),
                    client_name: client_name.to_string(),
                    weight: 1.0,
                },
                tight,
            });
        }
    }

    /// Export rows for the knowledge-store collaborator.
    pub fn rows(&self) -> Vec<ClientAliasRow> {
        self.entries.iter().map(|entry| entry.row.clone()).collect()
    }
}

/// How a client resolution was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMethod {
    Exact,
    Fuzzy,
    Forced,
    Review,
    Empty,
}

/// A scored client candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCandidate {
    pub client_code: String,
    pub client_name: String,
    pub alias: String,
    pub score: f32,
}

/// Result contract for client resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientResolutionResult {
    pub status: MatchStatus,
    pub client_code: Option<String>,
    pub client_name: Option<String>,
    pub method: ClientMethod,
    pub candidates: Vec<ClientCandidate>,
}

impl ClientResolutionResult {
    fn needs_review(method: ClientMethod, candidates: Vec<ClientCandidate>) -> Self {
        Self {
            status: MatchStatus::NeedsReview,
            client_code: None,
            client_name: None,
            method,
            candidates,
        }
    }
}

/// Resolve a free-text client name against the alias directory.
pub fn resolve_client(
    text: &str,
    directory: &ClientDirectory,
    config: &ResolverConfig,
    force: bool,
) -> ClientResolutionResult {
    let query_tight = normalizer::normalize_tight(text);
    if query_tight.is_empty() {
        return ClientResolutionResult::needs_review(ClientMethod::Empty, Vec::new());
    }

    // Tier 1: exact normalized match; the heaviest learned weight wins.
    if let Some(entry) = directory
        .entries
        .iter()
        .filter(|entry| entry.tight == query_tight)
        .max_by(|a, b| {
            a.row
                .weight
                .partial_cmp(&b.row.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    {
        return ClientResolutionResult {
            status: MatchStatus::Resolved,
            client_code: Some(entry.row.client_code.clone()),
            client_name: Some(entry.row.client_name.clone()),
            method: ClientMethod::Exact,
            candidates: Vec::new(),
        };
    }

    // Tier 2: fuzzy character overlap, small learned-weight bonus.
    let mut candidates: Vec<ClientCandidate> = directory
        .entries
        .iter()
        .map(|entry| {
            let overlap = ngram::char_set_f1(&query_tight, &entry.tight);
            let edit = strsim::jaro_winkler(&query_tight, &entry.tight) as f32;
            let bonus = (entry.row.weight * WEIGHT_BONUS_STEP).min(WEIGHT_BONUS_CAP);
            ClientCandidate {
                client_code: entry.row.client_code.clone(),
                client_name: entry.row.client_name.clone(),
                alias: entry.row.alias.clone(),
                score: CHAR_F1_BLEND * overlap + JARO_BLEND * edit + bonus,
            }
        })
        .filter(|candidate| candidate.score > 0.0)
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.client_code.cmp(&b.client_code))
    });
    candidates.truncate(config.client_top_n);

    let gate = config.client_gate(force);
    let best_score = candidates.first().map(|c| c.score).unwrap_or(0.0);
    let second_score = candidates.get(1).map(|c| c.score).unwrap_or(0.0);

    #[cfg(feature = "debug_resolver")]
    debug!(
        "[RESOLVER_CALIBRATION] client_resolve: best={best_score:.3} second={second_score:.3} min={:.3} force={force}",
        gate.min_score
    );

    if best_score >= gate.min_score
        && (candidates.len() < 2 || best_score - second_score >= gate.min_gap)
    {
        let best = candidates.first().cloned().expect("non-empty after gate");
        return ClientResolutionResult {
            status: MatchStatus::Resolved,
            client_code: Some(best.client_code.clone()),
            client_name: Some(best.client_name.clone()),
            method: if force {
                ClientMethod::Forced
            } else {
                ClientMethod::Fuzzy
            },
            candidates,
        };
    }

    ClientResolutionResult::needs_review(ClientMethod::Review, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> ClientDirectory {
        ClientDirectory::new(vec![
            ClientAliasRow {
                alias: "그랜드 호텔".to_string(),
                client_code: "C100".to_string(),
                client_name: "그랜드 호텔 서울".to_string(),
                weight: 3.0,
            },
            ClientAliasRow {
                alias: "그랜드 하얏트".to_string(),
                client_code: "C200".to_string(),
                client_name: "그랜드 하얏트 인천".to_string(),
                weight: 1.0,
            },
            ClientAliasRow {
                alias: "비스트로 연남".to_string(),
                client_code: "C300".to_string(),
                client_name: "비스트로 연남".to_string(),
                weight: 0.0,
            },
        ])
    }

    #[test]
    fn test_exact_normalized_match() {
        let result = resolve_client("그랜드호텔!", &directory(), &ResolverConfig::default(), false);
        assert_eq!(result.status, MatchStatus::Resolved);
        assert_eq!(result.method, ClientMethod::Exact);
        assert_eq!(result.client_code.as_deref(), Some("C100"));
    }

    #[test]
    fn test_fuzzy_match_clear_winner() {
        let result = resolve_client(
            "비스트로 연남점",
            &directory(),
            &ResolverConfig::default(),
            false,
        );
        assert_eq!(result.status, MatchStatus::Resolved);
        assert_eq!(result.method, ClientMethod::Fuzzy);
        assert_eq!(result.client_code.as_deref(), Some("C300"));
    }

    #[test]
    fn test_ambiguous_needs_review_then_force_resolves() {
        let config = ResolverConfig::default();
        // "그랜드" alone is ambiguous between the two 그랜드 clients.
        let strict = resolve_client("그랜드", &directory(), &config, false);
        assert_eq!(strict.status, MatchStatus::NeedsReview);
        assert_eq!(strict.method, ClientMethod::Review);
        assert!(!strict.candidates.is_empty());

        let forced = resolve_client("그랜드", &directory(), &config, true);
        assert_eq!(forced.status, MatchStatus::Resolved);
        assert_eq!(forced.method, ClientMethod::Forced);
        assert_eq!(forced.client_code.as_deref(), Some("C100"));
    }

    #[test]
    fn test_learned_weight_breaks_near_ties() {
        let mut directory = directory();
        // Same alias text confirmed for C100 many times.
        for _ in 0..5 {
            directory.record_confirmation("그호", "C100", "그랜드 호텔 서울");
        }
        let result = resolve_client("그호", &directory, &ResolverConfig::default(), false);
        assert_eq!(result.method, ClientMethod::Exact);
        assert_eq!(result.client_code.as_deref(), Some("C100"));
    }

    #[test]
    fn test_empty_input_needs_review() {
        let result = resolve_client("  ", &directory(), &ResolverConfig::default(), false);
        assert_eq!(result.status, MatchStatus::NeedsReview);
        assert_eq!(result.method, ClientMethod::Empty);
        assert!(result.candidates.is_empty());
    }
}

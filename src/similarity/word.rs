//! Word-level recall with compound-token partial matching.
//!
//! A single query token may match by concatenating consecutive target
//! tokens ("산타루치아" against ["산타", "루치아"]), which is how spaced
//! catalog names meet run-together order-line spellings.

/// Credit tiers for a single query token.
const CREDIT_EXACT: f32 = 1.0;
const CREDIT_CONTAINED: f32 = 0.8;
const CREDIT_REVERSE: f32 = 0.5;

/// Longest run of consecutive target tokens considered for concatenation.
const MAX_CONCAT_RUN: usize = 4;

/// Word-level recall of query tokens against target tokens, banded.
///
/// Per query token, the best credit wins:
/// - exact match of a target token or a concatenation of consecutive
///   target tokens → 1.0
/// - query token contained in a target token or concatenation run
///   (query side ≥ 2 chars) → 0.8
/// - a target token (≥ 3 chars) contained in the query token → 0.5
///
/// Recall = matched credit / query token count, then mapped through bands
/// so near-complete coverage is not punished for one weak token.
pub fn word_recall_score(query_tokens: &[String], target_tokens: &[String]) -> f32 {
    if query_tokens.is_empty() || target_tokens.is_empty() {
        return 0.0;
    }

    let credit: f32 = query_tokens
        .iter()
        .map(|token| token_credit(token, target_tokens))
        .sum();

    band(credit / query_tokens.len() as f32)
}

fn token_credit(query_token: &str, target_tokens: &[String]) -> f32 {
    let query_len = query_token.chars().count();
    let mut best = 0.0_f32;

    for token in target_tokens {
        if token == query_token {
            return CREDIT_EXACT;
        }
        if query_len >= 2 && token.contains(query_token) {
            best = best.max(CREDIT_CONTAINED);
        }
        if token.chars().count() >= 3 && query_token.contains(token.as_str()) {
            best = best.max(CREDIT_REVERSE);
        }
    }

    // Compound runs: concatenate consecutive target tokens.
    for start in 0..target_tokens.len() {
        let mut concat = String::new();
        let end = (start + MAX_CONCAT_RUN).min(target_tokens.len());
        for token in &target_tokens[start..end] {
            concat.push_str(token);
            if concat == query_token {
                return CREDIT_EXACT;
            }
            if query_len >= 2 && concat.contains(query_token) {
                best = best.max(CREDIT_CONTAINED);
            }
            if concat.chars().count() > query_len + 8 {
                break;
            }
        }
    }

    best
}

/// Map raw recall into confidence bands.
fn band(recall: f32) -> f32 {
    if recall >= 0.95 {
        1.0
    } else if recall >= 0.85 {
        0.95
    } else if recall >= 0.75 {
        0.85
    } else if recall >= 0.65 {
        0.75
    } else {
        recall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_compound_token_full_credit() {
        // "산타루치아" matches the concatenation of consecutive target tokens.
        let query = tokens(&["산타루치아"]);
        let target = tokens(&["산타", "루치아", "하이랜즈"]);
        assert_eq!(word_recall_score(&query, &target), 1.0);
    }

    #[test]
    fn test_compound_beats_unrelated_single_token() {
        let query = tokens(&["산타루치아"]);
        let compound_target = tokens(&["산타", "루치아"]);
        let unrelated_target = tokens(&["피노누아"]);
        assert!(
            word_recall_score(&query, &compound_target)
                > word_recall_score(&query, &unrelated_target)
        );
    }

    #[test]
    fn test_containment_credit() {
        // Query token contained in a longer target token.
        let query = tokens(&["루치아"]);
        let target = tokens(&["산타루치아하이랜즈"]);
        // 0.8 credit lands in the 0.75 band.
        assert_eq!(word_recall_score(&query, &target), 0.85);

        // Target token contained in a longer query token.
        let query = tokens(&["산타루치아"]);
        let target = tokens(&["루치아"]);
        assert_eq!(word_recall_score(&query, &target), 0.5);
    }

    #[test]
    fn test_banding() {
        // 3 of 4 exact → recall 0.75 → band 0.85.
        let query = tokens(&["크루", "와이너리", "산타루치아", "몬테레이"]);
        let target = tokens(&["크루", "와이너리", "피노누아", "몬테레이"]);
        assert_eq!(word_recall_score(&query, &target), 0.85);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(word_recall_score(&[], &tokens(&["산타"])), 0.0);
        assert_eq!(word_recall_score(&tokens(&["산타"]), &[]), 0.0);
    }
}

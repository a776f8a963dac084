//! Auto-learning feedback loop.
//!
//! Runs on explicit user confirmation of a candidate: derives abbreviation
//! token mappings from the confirmed pair, records the full line as an item
//! alias, bumps the search-learning hit count, and appends a training
//! example. All writes are best-effort and must never fail the resolution
//! that triggered them.

use serde::{Deserialize, Serialize};

use crate::catalog::types::CatalogItem;
use crate::knowledge::alias_store::AliasKind;
use crate::knowledge::token_store::TokenType;
use crate::knowledge::KnowledgeStore;
use crate::text::normalizer;

/// Fixed varietal abbreviations seen in order lines (KR trade shorthand and
/// Latin initialisms).
const VARIETAL_ABBREVIATIONS: &[(&str, &str)] = &[
    ("까쇼", "카베르네 소비뇽"),
    ("카쇼", "카베르네 소비뇽"),
    ("cs", "cabernet sauvignon"),
    ("소블", "소비뇽 블랑"),
    ("sb", "sauvignon blanc"),
    ("피노", "피노 누아"),
    ("pn", "pinot noir"),
    ("샤도", "샤르도네"),
    ("chard", "chardonnay"),
    ("리슬", "리슬링"),
    ("네비", "네비올로"),
    ("산지", "산지오베제"),
    ("템프", "템프라니요"),
    ("모스", "모스카토"),
];

/// Compatibility-jamo initial consonants, indexed by Hangul syllable lead.
const CHOSEONG: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ',
    'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// A confirmed user selection for one order line.
#[derive(Debug, Clone)]
pub struct ConfirmedSelection<'a> {
    pub raw_text: &'a str,
    pub client_id: &'a str,
    pub selected: &'a CatalogItem,
    /// Item codes the user saw and did not pick.
    pub rejected: Vec<String>,
}

/// Append-only training record; no read path inside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub query: String,
    pub normalized_query: String,
    pub client_id: String,
    pub selected_item_code: String,
    pub rejected_item_codes: Vec<String>,
    pub quantity: Option<u32>,
    pub vintage_hint: Option<u16>,
}

/// Append-only log of confirmed corrections, exported wholesale by the
/// persistence collaborator.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TrainingLog {
    examples: Vec<TrainingExample>,
}

impl TrainingLog {
    pub fn append(&mut self, example: TrainingExample) {
        self.examples.push(example);
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// Learn from a confirmed selection. Best-effort: logs and swallows any
/// unusable input instead of surfacing an error.
pub fn learn_from_confirmation(knowledge: &mut KnowledgeStore, selection: &ConfirmedSelection) {
    let (stripped, quantity) = normalizer::strip_quantity_and_unit(selection.raw_text);
    let vintage_hint = normalizer::extract_vintage_hint(selection.raw_text);
    let query_tokens = normalizer::tokenize(&stripped);
    if query_tokens.is_empty() {
        log::debug!(
            "learning skipped: no usable tokens in '{}'",
            selection.raw_text
        );
        return;
    }

    let item = selection.selected;
    let name_tokens = normalizer::tokenize(&item.name_local);
    let producer_phrase = item
        .producer
        .clone()
        .or_else(|| name_tokens.first().cloned());
    let varietal_phrase = item
        .varietals
        .first()
        .cloned()
        .or_else(|| name_tokens.get(1).cloned());

    for token in &query_tokens {
        if let Some(producer) = producer_phrase.as_deref() {
            if plausibly_abbreviates(token, producer) {
                knowledge.tokens.upsert(token, producer, TokenType::Producer);
                log::debug!("learned producer mapping: '{token}' -> '{producer}'");
                continue;
            }
        }
        if let Some(varietal) = varietal_phrase.as_deref() {
            if plausibly_abbreviates(token, varietal)
                || matches_varietal_dictionary(token, varietal, &item.varietals)
            {
                knowledge.tokens.upsert(token, varietal, TokenType::Varietal);
                log::debug!("learned varietal mapping: '{token}' -> '{varietal}'");
            }
        }
    }

    knowledge
        .aliases
        .record_confirmation(&stripped, &item.item_code, AliasKind::FullName);
    knowledge.search_log.record_hit(&stripped, &item.item_code);
    knowledge.training.append(TrainingExample {
        query: selection.raw_text.to_string(),
        normalized_query: normalizer::normalize_tight(&stripped),
        client_id: selection.client_id.to_string(),
        selected_item_code: item.item_code.clone(),
        rejected_item_codes: selection.rejected.clone(),
        quantity,
        vintage_hint,
    });
}

/// Does `token` plausibly abbreviate `phrase`?
///
/// Tests, in order: initials of a multi-word name, Korean consonant
/// skeleton, substring containment (≥ 2 chars). Exact equality is not an
/// abbreviation and is ignored.
pub(crate) fn plausibly_abbreviates(token: &str, phrase: &str) -> bool {
    let token_tight = normalizer::normalize_tight(token);
    let phrase_tight = normalizer::normalize_tight(phrase);
    if token_tight.chars().count() < 2 || token_tight == phrase_tight {
        return false;
    }

    let words: Vec<String> = phrase
        .split_whitespace()
        .map(normalizer::normalize_tight)
        .filter(|word| !word.is_empty())
        .collect();
    if words.len() >= 2 {
        let initials: String = words
            .iter()
            .filter_map(|word| word.chars().next())
            .collect();
        if initials == token_tight {
            return true;
        }
    }

    let skeleton = consonant_skeleton(&phrase_tight);
    if skeleton.chars().count() >= 2
        && (token_tight == skeleton || skeleton.starts_with(&token_tight))
        && token_tight.chars().all(is_compat_jamo)
    {
        return true;
    }

    phrase_tight.contains(&token_tight)
}

fn matches_varietal_dictionary(token: &str, varietal_phrase: &str, varietals: &[String]) -> bool {
    let token_tight = normalizer::normalize_tight(token);
    let Some((_, expansion)) = VARIETAL_ABBREVIATIONS
        .iter()
        .find(|(abbrev, _)| *abbrev == token_tight)
    else {
        return false;
    };

    let expansion_tight = normalizer::normalize_tight(expansion);
    let mut targets = vec![normalizer::normalize_tight(varietal_phrase)];
    targets.extend(varietals.iter().map(|v| normalizer::normalize_tight(v)));
    targets.iter().any(|target| {
        !target.is_empty()
            && (target.contains(&expansion_tight) || expansion_tight.contains(target.as_str()))
    })
}

/// Initial-consonant skeleton of Hangul text ("무똥까데" → "ㅁㄸㄲㄷ").
/// Non-Hangul characters are passed through unchanged.
pub(crate) fn consonant_skeleton(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\u{AC00}'..='\u{D7A3}' => {
                let offset = ch as u32 - 0xAC00;
                CHOSEONG[(offset / 588) as usize]
            }
            other => other,
        })
        .collect()
}

fn is_compat_jamo(ch: char) -> bool {
    matches!(ch, '\u{3130}'..='\u{318F}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeStore;

    fn wine(code: &str, local: &str, producer: Option<&str>, varietals: &[&str]) -> CatalogItem {
        CatalogItem {
            item_code: code.to_string(),
            name_local: local.to_string(),
            name_foreign: None,
            producer: producer.map(str::to_string),
            varietals: varietals.iter().map(|v| v.to_string()).collect(),
            vintage: None,
            price: None,
            available: true,
            product_line: None,
        }
    }

    #[test]
    fn test_initials_abbreviation() {
        assert!(plausibly_abbreviates("ch", "Charles Heidsieck"));
        assert!(!plausibly_abbreviates("xy", "Charles Heidsieck"));
    }

    #[test]
    fn test_consonant_skeleton() {
        assert_eq!(consonant_skeleton("무똥까데"), "ㅁㄸㄲㄷ");
        assert_eq!(consonant_skeleton("산타"), "ㅅㅌ");
    }

    #[test]
    fn test_skeleton_abbreviation() {
        assert!(plausibly_abbreviates("ㅁㄸ", "무똥까데"));
        assert!(plausibly_abbreviates("ㅁㄸㄲㄷ", "무똥까데"));
        assert!(!plausibly_abbreviates("ㄱㄴ", "무똥까데"));
    }

    #[test]
    fn test_substring_abbreviation() {
        assert!(plausibly_abbreviates("무똥", "무똥까데"));
        // Equality is not an abbreviation.
        assert!(!plausibly_abbreviates("무똥까데", "무똥까데"));
        // Single char is never enough.
        assert!(!plausibly_abbreviates("무", "무똥까데"));
    }

    #[test]
    fn test_learn_upserts_mappings_and_alias() {
        let mut knowledge = KnowledgeStore::default();
        let item = wine(
            "W010",
            "샤토 무똥까데 카베르네 소비뇽",
            Some("무똥까데"),
            &["카베르네 소비뇽"],
        );
        let selection = ConfirmedSelection {
            raw_text: "무똥 까쇼 2병",
            client_id: "C01",
            selected: &item,
            rejected: vec!["W999".to_string()],
        };

        learn_from_confirmation(&mut knowledge, &selection);

        // "무똥" abbreviates the producer, "까쇼" hits the varietal dictionary.
        let producer = knowledge.tokens.lookup("무똥").expect("producer mapping");
        assert_eq!(producer.mapped_text, "무똥까데");
        assert_eq!(producer.token_type, TokenType::Producer);

        let varietal = knowledge.tokens.lookup("까쇼").expect("varietal mapping");
        assert_eq!(varietal.token_type, TokenType::Varietal);

        // Full stripped line became an alias, hit count recorded, example logged.
        assert_eq!(knowledge.aliases.len(), 1);
        assert_eq!(knowledge.search_log.hits("무똥까쇼", "W010"), 1);
        assert_eq!(knowledge.training.len(), 1);
    }

    #[test]
    fn test_repeat_confirmations_are_monotonic() {
        let mut knowledge = KnowledgeStore::default();
        let item = wine("W010", "무똥까데 카베르네", Some("무똥까데"), &[]);
        let selection = ConfirmedSelection {
            raw_text: "무똥 1병",
            client_id: "C01",
            selected: &item,
            rejected: Vec::new(),
        };

        learn_from_confirmation(&mut knowledge, &selection);
        let first = knowledge.tokens.lookup("무똥").expect("mapping").confidence;
        learn_from_confirmation(&mut knowledge, &selection);
        let second = knowledge.tokens.lookup("무똥").expect("mapping").confidence;

        assert!(second >= first);
        assert_eq!(knowledge.tokens.lookup("무똥").expect("mapping").learned_count, 2);
        assert_eq!(knowledge.training.len(), 2);
    }
}

//! Text normalization for order lines and catalog names.
//! Handles quantity/unit stripping, tight normalization, and tokenization.

use regex::Regex;
use std::sync::LazyLock;

/// Trailing "<number> <unit>" (KR and EN unit spellings). The number may be
/// glued to the unit ("2병").
static RE_TRAILING_QTY_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(\d{1,4})\s*(병|박스|케이스|개|btls?|bts?|bottles?|box(?:es)?|cases?|cs|ea)\s*$")
        .expect("Invalid regex")
});

/// Trailing bare number. Requires preceding whitespace so digits embedded in
/// code-like fragments ("1234/12") survive.
static RE_TRAILING_BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(\d{1,4})\s*$").expect("Invalid regex"));

/// Four-digit vintage year anywhere in a line.
static RE_VINTAGE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\d/])((?:19[6-9]|20[0-5])\d)(?:[^\d/]|$)").expect("Invalid regex"));

/// Strip trailing quantity/unit tokens and bare trailing numbers.
///
/// Returns the stripped text and the extracted quantity (first quantity
/// found scanning from the end; a unit-bearing quantity wins over a bare
/// number). Digits that are part of code-like fragments are left alone.
pub fn strip_quantity_and_unit(text: &str) -> (String, Option<u32>) {
    let mut current = text.trim().to_string();
    let mut quantity: Option<u32> = None;

    loop {
        if let Some(caps) = RE_TRAILING_QTY_UNIT.captures(&current) {
            let full = caps.get(0).expect("capture 0").start();
            let parsed = caps[1].parse::<u32>().ok();
            quantity = quantity.or(parsed);
            current.truncate(full);
            current = current.trim_end().to_string();
            continue;
        }
        if let Some(caps) = RE_TRAILING_BARE_NUMBER.captures(&current) {
            let full = caps.get(0).expect("capture 0").start();
            let parsed = caps[1].parse::<u32>().ok();
            quantity = quantity.or(parsed);
            current.truncate(full);
            current = current.trim_end().to_string();
            continue;
        }
        break;
    }

    (current, quantity)
}

/// Lowercase, fold Latin accents, and drop all whitespace/punctuation.
///
/// Hangul and other CJK text passes through untouched so Korean queries are
/// matched natively; accented Latin ("Château") folds to ASCII. Idempotent.
pub fn normalize_tight(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() {
            if ch.is_ascii_alphanumeric() {
                out.push(ch.to_ascii_lowercase());
            }
            continue;
        }
        if is_cjk(ch) {
            if ch.is_alphanumeric() {
                out.push(ch);
            }
            continue;
        }
        let folded = deunicode::deunicode_char(ch).unwrap_or("");
        for folded_ch in folded.chars() {
            if folded_ch.is_ascii_alphanumeric() {
                out.push(folded_ch.to_ascii_lowercase());
            }
        }
    }
    out
}

/// Split into normalized tokens, dropping anything shorter than 2 chars or
/// purely numeric. Run after quantity-stripping.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(normalize_tight)
        .filter(|token| keep_token(token))
        .collect()
}

/// Pull an explicit vintage year (1960-2059) out of a line, ignoring digits
/// inside code-like fragments.
pub fn extract_vintage_hint(text: &str) -> Option<u16> {
    RE_VINTAGE_YEAR
        .captures(text)
        .and_then(|caps| caps[1].parse::<u16>().ok())
}

fn keep_token(token: &str) -> bool {
    if token.chars().count() < 2 {
        return false;
    }
    !token.chars().all(|ch| ch.is_ascii_digit())
}

/// Check if a character is in CJK Unicode ranges (Hangul syllables and jamo
/// included, so consonant-skeleton tokens like "ㅋㄹ" survive normalization).
pub(crate) fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'   // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}' // CJK Extension A
        | '\u{3040}'..='\u{309F}' // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{AC00}'..='\u{D7AF}' // Hangul Syllables
        | '\u{1100}'..='\u{11FF}' // Hangul Jamo
        | '\u{3130}'..='\u{318F}' // Hangul Compatibility Jamo
        | '\u{F900}'..='\u{FAFF}' // CJK Compatibility Ideographs
    )
}

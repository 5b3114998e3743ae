//! Sanitizer: untrusted text → Word
//!
//! Two policies. Strict is for bank and seed words (2-20 letters). Lenient
//! is for generated output (letter first, then letters, digits and at most
//! one interior hyphen, 1-25 chars).

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::Word;
use crate::{LENIENT_MAX_LEN, STRICT_MAX_LEN, STRICT_MIN_LEN};

lazy_static! {
    static ref RE_LENIENT_WORD: Regex = Regex::new(r"^[a-z][a-z0-9-]{0,24}$").unwrap();
}

/// Character/length policy applied by `sanitize`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizePolicy {
    Strict,
    Lenient,
}

/// Validate and normalize raw text into a word, or reject it
///
/// Total: any input yields a `Word` or `None`.
pub fn sanitize(raw: Option<&str>, policy: SanitizePolicy) -> Option<Word> {
    let token = raw?.split_whitespace().next()?.to_lowercase();

    let cleaned = match policy {
        SanitizePolicy::Strict => strict_clean(&token)?,
        SanitizePolicy::Lenient => lenient_clean(&token)?,
    };

    Some(Word::from_sanitized(cleaned))
}

/// Shorthand for strict sanitizing of a plain string
pub fn sanitize_strict(raw: &str) -> Option<Word> {
    sanitize(Some(raw), SanitizePolicy::Strict)
}

/// Every word form a previous-round word can take after sanitizing
///
/// "Car!" is both `car` (strict) and `car` (lenient); "X-Ray" is `xray`
/// and `x-ray`. Duplicates are dropped.
pub fn sanitized_forms(raw: &str) -> Vec<Word> {
    let mut forms = Vec::with_capacity(2);
    for policy in [SanitizePolicy::Strict, SanitizePolicy::Lenient] {
        if let Some(word) = sanitize(Some(raw), policy) {
            if !forms.contains(&word) {
                forms.push(word);
            }
        }
    }
    forms
}

fn strict_clean(token: &str) -> Option<String> {
    let cleaned: String = token.chars().filter(|c| c.is_ascii_lowercase()).collect();
    let len = cleaned.len();
    (STRICT_MIN_LEN..=STRICT_MAX_LEN).contains(&len).then_some(cleaned)
}

fn lenient_clean(token: &str) -> Option<String> {
    let kept: String = token
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();
    let cleaned = kept.trim_matches('-');

    if cleaned.is_empty() || cleaned.len() > LENIENT_MAX_LEN {
        return None;
    }
    if cleaned.matches('-').count() > 1 || !RE_LENIENT_WORD.is_match(cleaned) {
        return None;
    }
    Some(cleaned.to_string())
}

// =============================================================================
// TESTS
// =============================================================================

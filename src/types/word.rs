//! Words and the exclusion set

use serde::Serialize;
use std::collections::HashSet;

use crate::NO_GUESS;

/// A sanitized, lowercase word
///
/// Only the sanitizer builds these, so every `Word` a caller sees has
/// already passed a length/character policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Word(String);

impl Word {
    pub(crate) fn from_sanitized(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Word {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Word {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Is this the "no guess was made" sentinel?
pub fn is_no_guess(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(NO_GUESS)
}

/// Normalize a previous-round word: trim, lowercase, placeholder → empty
pub fn normalize_previous(raw: Option<&str>) -> String {
    match raw {
        Some(text) if !is_no_guess(text) => text.trim().to_lowercase(),
        _ => String::new(),
    }
}

/// Words that must never be offered again
///
/// Membership is case-insensitive. Iteration follows first-seen order so
/// prompts built from the set are reproducible.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl ExclusionSet {
    /// Create empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw caller input: lowercase, dedupe, drop blanks and the placeholder
    pub fn normalize_list<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for word in words {
            set.insert(word.as_ref());
        }
        set
    }

    /// Add a word; returns false if it was ignored or already present
    pub fn insert(&mut self, word: &str) -> bool {
        if is_no_guess(word) {
            return false;
        }
        let key = word.trim().to_lowercase();
        if key.is_empty() || self.members.contains(&key) {
            return false;
        }
        self.members.insert(key.clone());
        self.order.push(key);
        true
    }

    /// Case-insensitive membership
    pub fn contains(&self, word: &str) -> bool {
        self.members.contains(&word.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_list_dedupes_and_lowercases() {
        let set = ExclusionSet::normalize_list(["Car", "car ", "ROAD", "", "  "]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["car", "road"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_placeholder_never_enters_set() {
        let set = ExclusionSet::normalize_list(["(no guess)", "(No Guess)", "tree"]);
        assert_eq!(set.len(), 1);
        assert!(!set.contains(NO_GUESS));
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let set = ExclusionSet::normalize_list(["Highway"]);
        assert!(set.contains("highway"));
        assert!(set.contains("HIGHWAY"));
        assert!(!set.contains("high"));
    }

    #[test]
    fn test_insert_reports_growth() {
        let mut set = ExclusionSet::new();
        assert!(set.insert("sun"));
        assert!(!set.insert("SUN"));
        assert!(!set.insert(""));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_normalize_previous() {
        assert_eq!(normalize_previous(Some("  Car ")), "car");
        assert_eq!(normalize_previous(Some("(no guess)")), "");
        assert_eq!(normalize_previous(None), "");
    }
}

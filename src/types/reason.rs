//! Reason codes for selection outcomes

use serde::Serialize;

/// Why the engine returned what it returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(non_camel_case_types)]
pub enum SelectionReason {
    // =========================================================================
    // S001-S003: Primary outcomes
    // =========================================================================
    /// No previous pair, seed picked directly
    S001_SEED_FIRST_ROUND,
    /// Generative model proposed a valid word
    S002_GENERATED,
    /// Top word of the similarity ranking
    S003_RANKED,

    // =========================================================================
    // S004-S006: Degraded outcomes
    // =========================================================================
    /// Higher tiers unusable, seed picked
    S004_SEED_FALLBACK,
    /// Candidate failed the final guard, seed re-picked
    S005_GUARD_RETRY,
    /// Nothing eligible anywhere
    S006_EXHAUSTED,
}

impl SelectionReason {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::S001_SEED_FIRST_ROUND => "S001_SEED_FIRST_ROUND",
            Self::S002_GENERATED => "S002_GENERATED",
            Self::S003_RANKED => "S003_RANKED",
            Self::S004_SEED_FALLBACK => "S004_SEED_FALLBACK",
            Self::S005_GUARD_RETRY => "S005_GUARD_RETRY",
            Self::S006_EXHAUSTED => "S006_EXHAUSTED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::S001_SEED_FIRST_ROUND => "First round, neutral seed",
            Self::S002_GENERATED => "Generated connector",
            Self::S003_RANKED => "Best similarity match",
            Self::S004_SEED_FALLBACK => "Fell back to seed",
            Self::S005_GUARD_RETRY => "Guard rejected candidate, re-seeded",
            Self::S006_EXHAUSTED => "Vocabulary exhausted",
        }
    }
}

impl std::fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

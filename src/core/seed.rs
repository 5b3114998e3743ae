//! Seed picker: the floor of the fallback chain
//!
//! Neutral pool → full bank → fixed default. Randomness comes from an
//! injectable `RandomSource` so fallback choices are reproducible in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::core::sanitizer::sanitize_strict;
use crate::core::word_bank::WordBank;
use crate::types::{EngineError, ExclusionSet, Word};
use crate::{DEFAULT_SEED, SEED_POOL};

/// Uniform index source
pub trait RandomSource: Send {
    /// Index in `0..len`; `len` is never zero
    fn next_index(&mut self, len: usize) -> usize;
}

impl RandomSource for StdRng {
    fn next_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Seed picker
pub struct SeedPicker {
    pool: Vec<Word>,
    default_word: Word,
    rng: Mutex<Box<dyn RandomSource>>,
}

impl Default for SeedPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedPicker {
    /// Picker with entropy-seeded randomness
    pub fn new() -> Self {
        Self::with_source(StdRng::from_entropy())
    }

    /// Picker with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_source(StdRng::seed_from_u64(seed))
    }

    /// Picker with a caller-supplied source
    pub fn with_source(source: impl RandomSource + 'static) -> Self {
        let pool = SEED_POOL.iter().copied().filter_map(sanitize_strict).collect();
        Self {
            pool,
            default_word: Word::from_sanitized(DEFAULT_SEED.to_string()),
            rng: Mutex::new(Box::new(source)),
        }
    }

    /// Pick a word not in `exclude`
    pub fn pick_seed(&self, exclude: &ExclusionSet, bank: &WordBank) -> Result<Word, EngineError> {
        let eligible = |w: &&Word| !exclude.contains(w.as_str());

        let pool: Vec<&Word> = self.pool.iter().filter(eligible).collect();
        if let Some(word) = self.choose(&pool) {
            return Ok(word);
        }

        let bank_words: Vec<&Word> = bank.words().iter().filter(eligible).collect();
        if let Some(word) = self.choose(&bank_words) {
            return Ok(word);
        }

        if !exclude.contains(self.default_word.as_str()) {
            return Ok(self.default_word.clone());
        }
        Err(EngineError::ExhaustedVocabulary)
    }

    fn choose(&self, candidates: &[&Word]) -> Option<Word> {
        if candidates.is_empty() {
            return None;
        }
        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.next_index(candidates.len())
        };
        candidates.get(index).map(|w| (*w).clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================

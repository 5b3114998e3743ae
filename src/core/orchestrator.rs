//! Selection orchestrator: tiered fallback with a final guard
//!
//! Per call:
//! - Bootstrap: normalize previous words, fold them into the exclusion set
//! - First round (no previous pair) → seed
//! - Generative (if the deployment uses it) → similarity (if bank ready) → seed
//! - Final guard: re-sanitize and re-check; one seed retry, then give up
//!
//! No state survives between calls.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::embedding::Embedding;
use crate::core::generation::propose_via_generation;
use crate::core::llm::GenerativeProvider;
use crate::core::ranker::SimilarityRanker;
use crate::core::sanitizer::{sanitize, sanitized_forms, SanitizePolicy};
use crate::core::seed::SeedPicker;
use crate::core::word_bank::WordBank;
use crate::types::{
    normalize_previous, ExclusionSet, SelectionReason, SelectionRequest, SelectionResult,
    Strategy, Tier, Word,
};
use crate::GENERATION_TIMEOUT_SECS;

/// Composes the tiers into one decision
pub struct SelectionOrchestrator {
    bank: Arc<WordBank>,
    generator: Option<Arc<dyn GenerativeProvider>>,
    strategy: Strategy,
    ranker: SimilarityRanker,
    seeds: SeedPicker,
    generation_timeout: Duration,
}

impl SelectionOrchestrator {
    /// Create orchestrator over a (possibly still loading) bank
    pub fn new(bank: Arc<WordBank>, strategy: Strategy) -> Self {
        Self {
            bank,
            generator: None,
            strategy,
            ranker: SimilarityRanker::new(),
            seeds: SeedPicker::new(),
            generation_timeout: Duration::from_secs(GENERATION_TIMEOUT_SECS),
        }
    }

    /// Attach the generative provider
    pub fn with_generator(mut self, generator: Arc<dyn GenerativeProvider>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Replace the seed picker (deterministic randomness in tests)
    pub fn with_seed_picker(mut self, seeds: SeedPicker) -> Self {
        self.seeds = seeds;
        self
    }

    /// Budget for one generative call
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn bank(&self) -> &Arc<WordBank> {
        &self.bank
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Model answering the primary tier
    pub fn model_name(&self) -> &str {
        match (&self.generator, self.strategy) {
            (Some(generator), Strategy::Generative) => generator.model_name(),
            _ => self.bank.model_name(),
        }
    }

    /// Pick the next word
    pub async fn select(&self, request: &SelectionRequest) -> SelectionResult {
        let prev_human = normalize_previous(request.prev_human.as_deref());
        let prev_bot = normalize_previous(request.prev_bot.as_deref());

        let mut exclude = request.exclude.clone();
        for previous in [&prev_human, &prev_bot] {
            exclude.insert(previous);
            for form in sanitized_forms(previous) {
                exclude.insert(form.as_str());
            }
        }

        let candidate = if prev_human.is_empty() && prev_bot.is_empty() {
            self.seed(&exclude, SelectionReason::S001_SEED_FIRST_ROUND)
        } else {
            match self.primary(&prev_human, &prev_bot, &exclude, request).await {
                Some(result) => result,
                None => self.seed(&exclude, SelectionReason::S004_SEED_FALLBACK),
            }
        };

        let result = self.guard(candidate, &exclude);
        info!(
            tier = result.tier.as_str(),
            reason = result.reason.code(),
            choice = result.choice.as_ref().map(Word::as_str).unwrap_or("null"),
            "next word selected"
        );
        result
    }

    async fn primary(
        &self,
        prev_human: &str,
        prev_bot: &str,
        exclude: &ExclusionSet,
        request: &SelectionRequest,
    ) -> Option<SelectionResult> {
        if self.strategy == Strategy::Generative {
            if let Some(word) = self.generate(prev_human, prev_bot, exclude).await {
                return Some(SelectionResult::chosen(
                    word,
                    Tier::Generative,
                    SelectionReason::S002_GENERATED,
                ));
            }
        }
        self.rank(prev_human, prev_bot, exclude, request).await
    }

    async fn generate(
        &self,
        prev_human: &str,
        prev_bot: &str,
        exclude: &ExclusionSet,
    ) -> Option<Word> {
        let Some(generator) = &self.generator else {
            debug!(tier = "generative", "no generative provider configured");
            return None;
        };

        let proposal = propose_via_generation(generator.as_ref(), prev_human, prev_bot, exclude);
        match tokio::time::timeout(self.generation_timeout, proposal).await {
            Ok(word) => word,
            Err(_) => {
                warn!(
                    tier = "generative",
                    timeout_secs = self.generation_timeout.as_secs_f64(),
                    "generation timed out"
                );
                None
            }
        }
    }

    async fn rank(
        &self,
        prev_human: &str,
        prev_bot: &str,
        exclude: &ExclusionSet,
        request: &SelectionRequest,
    ) -> Option<SelectionResult> {
        if !self.bank.is_ready() {
            debug!(tier = "similarity", "word bank not ready");
            return None;
        }

        let human = self.embed_previous(prev_human).await;
        let bot = self.embed_previous(prev_bot).await;
        if human.is_none() && bot.is_none() {
            return None;
        }

        let ranking = match self.ranker.rank(
            &self.bank,
            exclude,
            human.as_deref(),
            bot.as_deref(),
            request.weights,
        ) {
            Ok(ranking) => ranking,
            Err(e) => {
                warn!(tier = "similarity", error = %e, "ranking failed");
                return None;
            }
        };

        let top = ranking.first()?.word.clone();
        let scores = ranking.into_iter().take(request.top_k).collect();
        Some(SelectionResult::ranked(top, scores))
    }

    async fn embed_previous(&self, word: &str) -> Option<Embedding> {
        if word.is_empty() {
            return None;
        }
        match self.bank.embed_one(word).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(tier = "similarity", error = %e, "embedding previous word failed");
                None
            }
        }
    }

    fn seed(&self, exclude: &ExclusionSet, reason: SelectionReason) -> SelectionResult {
        match self.seeds.pick_seed(exclude, &self.bank) {
            Ok(word) => SelectionResult::chosen(word, Tier::Seed, reason),
            Err(e) => {
                warn!(tier = "seed", error = %e, "seed picker found nothing");
                SelectionResult::exhausted()
            }
        }
    }

    /// Re-sanitize and re-check; one seed retry before giving up
    fn guard(&self, candidate: SelectionResult, exclude: &ExclusionSet) -> SelectionResult {
        let accepted = candidate
            .choice
            .as_ref()
            .map_or(true, |word| passes_guard(word, candidate.tier, exclude));
        if accepted {
            return candidate;
        }

        warn!(
            tier = candidate.tier.as_str(),
            word = candidate.choice.as_ref().map(Word::as_str).unwrap_or(""),
            "final guard rejected candidate"
        );
        let retry = self.seed(exclude, SelectionReason::S005_GUARD_RETRY);
        let retry_ok = retry
            .choice
            .as_ref()
            .map_or(true, |word| passes_guard(word, Tier::Seed, exclude));
        if retry_ok {
            retry
        } else {
            SelectionResult::exhausted()
        }
    }
}

fn passes_guard(word: &Word, tier: Tier, exclude: &ExclusionSet) -> bool {
    let policy = match tier {
        Tier::Generative => SanitizePolicy::Lenient,
        _ => SanitizePolicy::Strict,
    };
    sanitize(Some(word.as_str()), policy).as_ref() == Some(word) && !exclude.contains(word.as_str())
}

// =============================================================================
// TESTS
// =============================================================================
